use crate::{
    config::ConfigError,
    db::{RowError, query::QueryError},
    formula::FormulaError,
    model::CatalogError,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Every surface error converts into it; the public facade maps it further.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

impl From<QueryError> for InternalError {
    fn from(err: QueryError) -> Self {
        let class = match &err {
            QueryError::OrderByFieldNotFound { .. } | QueryError::FilterFieldNotFound { .. } => {
                ErrorClass::NotFound
            }
            QueryError::OrderByFieldNotPossible { .. }
            | QueryError::ViewFilterTypeDoesNotExist { .. }
            | QueryError::ViewFilterTypeNotAllowedForField { .. } => ErrorClass::Unsupported,
            QueryError::InvalidArgument(_) => ErrorClass::InvalidArgument,
        };

        Self::new(class, ErrorOrigin::Query, err.to_string())
    }
}

impl From<RowError> for InternalError {
    fn from(err: RowError) -> Self {
        let class = match &err {
            RowError::RowDoesNotExist { .. } | RowError::UnknownField { .. } => {
                ErrorClass::NotFound
            }
            RowError::InvalidValue { .. } | RowError::ReadOnlyField { .. } => {
                ErrorClass::InvalidArgument
            }
            RowError::TableMismatch { .. } => ErrorClass::Conflict,
            RowError::Store(_) => ErrorClass::Internal,
        };
        let origin = match &err {
            RowError::Store(_) => ErrorOrigin::Store,
            _ => ErrorOrigin::Row,
        };

        Self::new(class, origin, err.to_string())
    }
}

impl From<FormulaError> for InternalError {
    fn from(err: FormulaError) -> Self {
        Self::new(ErrorClass::InvalidArgument, ErrorOrigin::Formula, err.to_string())
    }
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::InvalidArgument, ErrorOrigin::Config, err.to_string())
    }
}

impl From<CatalogError> for InternalError {
    fn from(err: CatalogError) -> Self {
        let class = match &err {
            CatalogError::DuplicateFieldName { .. } => ErrorClass::Conflict,
            CatalogError::NotASelectField(_) => ErrorClass::Unsupported,
            _ => ErrorClass::NotFound,
        };

        Self::new(class, ErrorOrigin::Schema, err.to_string())
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorClass {
    NotFound,
    Unsupported,
    InvalidArgument,
    Conflict,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::Unsupported => "unsupported",
            Self::InvalidArgument => "invalid_argument",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Schema,
    Query,
    Row,
    Store,
    Response,
    Formula,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Schema => "schema",
            Self::Query => "query",
            Self::Row => "row",
            Self::Store => "store",
            Self::Response => "response",
            Self::Formula => "formula",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}
