use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// QueryError
///
/// Failures while turning caller-supplied ordering and filter inputs into a
/// query. Execution itself never fails.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
pub enum QueryError {
    #[error("order by field '{name}' does not exist")]
    OrderByFieldNotFound { name: String },

    #[error("cannot order by field '{name}' of type {field_type}")]
    OrderByFieldNotPossible { name: String, field_type: String },

    #[error("filter field '{field}' does not exist")]
    FilterFieldNotFound { field: String },

    #[error("filter type '{op}' does not exist")]
    ViewFilterTypeDoesNotExist { op: String },

    #[error("filter type '{op}' is not allowed for field '{field}' of type {field_type}")]
    ViewFilterTypeNotAllowedForField {
        op: String,
        field: String,
        field_type: String,
    },

    #[error("{0}")]
    InvalidArgument(String),
}

impl QueryError {
    #[must_use]
    pub const fn kind(&self) -> QueryErrorKind {
        match self {
            Self::OrderByFieldNotFound { .. } | Self::FilterFieldNotFound { .. } => {
                QueryErrorKind::FieldResolution
            }
            Self::OrderByFieldNotPossible { .. } | Self::ViewFilterTypeNotAllowedForField { .. } => {
                QueryErrorKind::FieldCapability
            }
            Self::ViewFilterTypeDoesNotExist { .. } => QueryErrorKind::OperatorUnknown,
            Self::InvalidArgument(_) => QueryErrorKind::InvalidArgument,
        }
    }
}

///
/// QueryErrorKind
/// Coarse grouping callers branch on.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueryErrorKind {
    /// A referenced field is unknown or excluded.
    FieldResolution,
    /// The field exists but its type does not support the request.
    FieldCapability,
    OperatorUnknown,
    InvalidArgument,
}
