//! Core runtime for Gridbase: table metadata, runtime schemas, the field type
//! registry, formulas, row storage, and the query builder.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod field_type;
pub mod formula;
pub mod model;
pub mod obs;
pub mod schema;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, stores, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{Db, Record, RowInput},
        model::{Catalog, FieldKind, FormulaResultType},
        schema::{ComposeOptions, Schema},
        types::{FieldId, RowId, TableId},
        value::Value,
    };
}
