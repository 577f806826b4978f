//! Table and field metadata: the inputs every schema is composed from.

pub mod catalog;
pub mod field;
pub mod select;
pub mod table;


use crate::types::{DatabaseId, RowId, TableId, WorkspaceId};
use serde::{Deserialize, Serialize};
use std::fmt;

// re-exports
pub use catalog::{Catalog, CatalogError, Database, Workspace};
pub use field::{
    AiConfig, DateConfig, DateFormat, Field, FieldKind, FieldTypeTag, FormulaConfig,
    FormulaResultType, NumberConfig, TimeFormat, UnknownFieldType,
};
pub use select::SelectOption;
pub use table::Table;

///
/// Node
///
/// One position in the structural hierarchy used for permission and audit
/// lookups: row → table → database → workspace.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Node {
    Workspace(WorkspaceId),
    Database(DatabaseId),
    Table(TableId),
    Row { table_id: TableId, row_id: RowId },
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workspace(id) => write!(f, "workspace:{id}"),
            Self::Database(id) => write!(f, "database:{id}"),
            Self::Table(id) => write!(f, "table:{id}"),
            Self::Row { table_id, row_id } => write!(f, "table:{table_id}/row:{row_id}"),
        }
    }
}
