//! ## Crate layout
//! - `core`: runtime table model, field types, formulas, rows, queries,
//!   and observability.
//! - `error`: the public error type with stable kind, origin, and codes.
//!
//! The `prelude` module mirrors the surface used by request handlers.

pub use gridbase_core as core;

pub mod error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// re-exports
pub use gridbase_core::{config, db, field_type, formula, model, obs, schema, types, value};
pub use error::Error;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        core::{
            db::{
                Page, Query, Response,
                query::{FilterObject, FilterValue},
            },
            prelude::*,
        },
        error::Error,
    };
}
