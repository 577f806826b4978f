//! Module: db
//! Responsibility: row storage, row access with computed fields, and the
//! query builder over composed schemas.
//! Does not own: table and field metadata (model) or name derivation
//! (schema).

pub mod access;
pub mod clock;
mod hooks;
pub mod predicate;
pub mod query;
pub mod response;
pub mod row;
pub mod store;

#[cfg(test)]
mod tests;

use crate::{
    config::EngineConfig,
    model::Table,
    schema::{ComposeOptions, Schema},
    types::{RowId, TableId},
};
use std::{fmt, sync::Arc};
use thiserror::Error as ThisError;

// re-exports
pub use access::RowAccess;
pub use clock::{Clock, ManualClock, SystemClock};
pub use query::Query;
pub use response::{Page, Response, ResponseError};
pub use row::{CellKey, Record, RowInput};
pub use store::{MemoryStore, StoredRow};

///
/// RowError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RowError {
    #[error("row {row} does not exist in table {table}")]
    RowDoesNotExist { table: TableId, row: RowId },

    #[error("field '{name}' does not exist")]
    UnknownField { name: String },

    #[error("invalid value for field '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("field '{field}' is computed and cannot be written")]
    ReadOnlyField { field: String },

    #[error("row belongs to table {found}, expected table {expected}")]
    TableMismatch { expected: TableId, found: TableId },

    #[error("{0}")]
    Store(String),
}

///
/// Db
///
/// Engine handle: configuration, row storage, and the clock that stamps
/// row timestamps. Schemas are composed per call and borrowed by the row
/// and query handles.
///

pub struct Db {
    config: EngineConfig,
    store: MemoryStore,
    clock: Arc<dyn Clock>,
}

impl Db {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            store: MemoryStore::new(),
            clock,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &MemoryStore {
        &self.store
    }

    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Compose a schema, adding the configured reserved names.
    #[must_use]
    pub fn compose(&self, table: &Table, options: ComposeOptions) -> Schema {
        let mut reserved = options.reserved_names.clone();
        reserved.extend(self.config.schema.reserved_names.iter().cloned());

        Schema::compose(table, &options.reserved_names(reserved))
    }

    /// Row create / read / update / delete for one schema.
    #[must_use]
    pub const fn rows<'s>(&'s self, schema: &'s Schema) -> RowAccess<'s> {
        RowAccess::new(self, schema)
    }

    /// Start a query over one schema.
    #[must_use]
    pub fn query<'s>(&'s self, schema: &'s Schema) -> Query<'s> {
        Query::new(self, schema)
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl Default for Db {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
