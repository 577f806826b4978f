//! Engine configuration.
//!
//! Every key is optional; an empty document yields the defaults.

use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error as ThisError;

/// Attribute names that always fall back to stable naming: the system columns.
pub const SYSTEM_RESERVED_NAMES: [&str; 4] = ["id", "order", "created_on", "updated_on"];

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {message}")]
    Read { path: String, message: String },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// EngineConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub query: QueryConfig,
    pub search: SearchConfig,
    pub schema: SchemaConfig,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;

        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let QueryConfig {
            default_page_size,
            max_page_size,
        } = self.query;

        if default_page_size == 0 {
            return Err(ConfigError::Invalid(
                "query.default_page_size must be at least 1".to_string(),
            ));
        }
        if max_page_size < default_page_size {
            return Err(ConfigError::Invalid(format!(
                "query.max_page_size ({max_page_size}) cannot be lower than query.default_page_size ({default_page_size})"
            )));
        }

        Ok(())
    }

    /// Whether `name` is forced to stable naming in attribute mode.
    #[must_use]
    pub fn is_reserved_name(&self, name: &str) -> bool {
        SYSTEM_RESERVED_NAMES.contains(&name)
            || self.schema.reserved_names.iter().any(|reserved| reserved == name)
    }
}

///
/// QueryConfig
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 100,
            max_page_size: 200,
        }
    }
}

///
/// SearchConfig
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Also match rows whose id equals the trimmed search text.
    pub match_row_id: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { match_row_id: true }
    }
}

///
/// SchemaConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaConfig {
    pub reserved_names: Vec<String>,
}

///
/// TESTS
///
