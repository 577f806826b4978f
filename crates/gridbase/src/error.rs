use derive_more::Display;
use gridbase_core::{
    db::{RowError, query::QueryError, response::ResponseError},
    error::{ErrorOrigin as CoreErrorOrigin, InternalError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// Machine-readable code for transport layers.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        Self::new(ErrorKind::Internal, err.origin.into(), err.message)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        let kind = match &err {
            QueryError::OrderByFieldNotFound { .. } => QueryErrorKind::OrderByFieldNotFound,
            QueryError::OrderByFieldNotPossible { .. } => QueryErrorKind::OrderByFieldNotPossible,
            QueryError::FilterFieldNotFound { .. } => QueryErrorKind::FilterFieldNotFound,
            QueryError::ViewFilterTypeDoesNotExist { .. } => {
                QueryErrorKind::FilterTypeDoesNotExist
            }
            QueryError::ViewFilterTypeNotAllowedForField { .. } => {
                QueryErrorKind::FilterTypeUnsupportedField
            }
            QueryError::InvalidArgument(_) => QueryErrorKind::InvalidArgument,
        };

        Self::new(ErrorKind::Query(kind), ErrorOrigin::Query, err.to_string())
    }
}

impl From<RowError> for Error {
    fn from(err: RowError) -> Self {
        let (kind, origin) = match &err {
            RowError::RowDoesNotExist { .. } => (RowErrorKind::NotFound, ErrorOrigin::Row),
            RowError::UnknownField { .. }
            | RowError::InvalidValue { .. }
            | RowError::ReadOnlyField { .. } => (RowErrorKind::InvalidValue, ErrorOrigin::Row),
            RowError::TableMismatch { .. } => (RowErrorKind::Conflict, ErrorOrigin::Row),
            RowError::Store(_) => {
                return Self::new(ErrorKind::Internal, ErrorOrigin::Store, err.to_string());
            }
        };

        Self::new(ErrorKind::Row(kind), origin, err.to_string())
    }
}

impl From<ResponseError> for Error {
    fn from(err: ResponseError) -> Self {
        let kind = match err {
            ResponseError::NotFound { .. } => ErrorKind::Row(RowErrorKind::NotFound),
            ResponseError::NotUnique { .. } => ErrorKind::Query(QueryErrorKind::NotUnique),
        };

        Self::new(kind, ErrorOrigin::Response, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers and transport layers.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Query(QueryErrorKind),
    Row(RowErrorKind),

    /// The caller cannot remediate this.
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Query(kind) => kind.code(),
            Self::Row(kind) => kind.code(),
            Self::Internal => ERROR_INTERNAL,
        }
    }
}

///
/// QueryErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum QueryErrorKind {
    OrderByFieldNotFound,

    /// The field exists but its type cannot be ordered.
    OrderByFieldNotPossible,

    FilterFieldNotFound,

    /// The filter operator name is unknown.
    FilterTypeDoesNotExist,

    /// The operator exists but the field's type does not accept it.
    FilterTypeUnsupportedField,

    InvalidArgument,

    /// Query expected one row but matched many.
    NotUnique,
}

impl QueryErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::OrderByFieldNotFound => ERROR_ORDER_BY_FIELD_NOT_FOUND,
            Self::OrderByFieldNotPossible => ERROR_ORDER_BY_FIELD_NOT_POSSIBLE,
            Self::FilterFieldNotFound => ERROR_FILTER_FIELD_NOT_FOUND,
            Self::FilterTypeDoesNotExist => ERROR_VIEW_FILTER_TYPE_DOES_NOT_EXIST,
            Self::FilterTypeUnsupportedField => ERROR_VIEW_FILTER_TYPE_UNSUPPORTED_FIELD,
            Self::InvalidArgument | Self::NotUnique => ERROR_INVALID_ARGUMENT,
        }
    }
}

///
/// RowErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RowErrorKind {
    NotFound,

    /// Unknown, computed, or badly typed cell in a write.
    InvalidValue,

    /// The row handle belongs to another table.
    Conflict,
}

impl RowErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotFound => ERROR_ROW_DOES_NOT_EXIST,
            Self::InvalidValue => ERROR_INVALID_ROW_VALUE,
            Self::Conflict => ERROR_INVALID_ARGUMENT,
        }
    }
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers and transport layers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Formula,
    Query,
    Response,
    Row,
    Schema,
    Store,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Config => Self::Config,
            CoreErrorOrigin::Formula => Self::Formula,
            CoreErrorOrigin::Query => Self::Query,
            CoreErrorOrigin::Response => Self::Response,
            CoreErrorOrigin::Row => Self::Row,
            CoreErrorOrigin::Schema => Self::Schema,
            CoreErrorOrigin::Store => Self::Store,
        }
    }
}

//
// Codes
//

pub const ERROR_ORDER_BY_FIELD_NOT_FOUND: &str = "ERROR_ORDER_BY_FIELD_NOT_FOUND";
pub const ERROR_ORDER_BY_FIELD_NOT_POSSIBLE: &str = "ERROR_ORDER_BY_FIELD_NOT_POSSIBLE";
pub const ERROR_FILTER_FIELD_NOT_FOUND: &str = "ERROR_FILTER_FIELD_NOT_FOUND";
pub const ERROR_VIEW_FILTER_TYPE_DOES_NOT_EXIST: &str = "ERROR_VIEW_FILTER_TYPE_DOES_NOT_EXIST";
pub const ERROR_VIEW_FILTER_TYPE_UNSUPPORTED_FIELD: &str =
    "ERROR_VIEW_FILTER_TYPE_UNSUPPORTED_FIELD";
pub const ERROR_INVALID_ARGUMENT: &str = "ERROR_INVALID_ARGUMENT";
pub const ERROR_ROW_DOES_NOT_EXIST: &str = "ERROR_ROW_DOES_NOT_EXIST";
pub const ERROR_INVALID_ROW_VALUE: &str = "ERROR_INVALID_ROW_VALUE";
pub const ERROR_INTERNAL: &str = "ERROR_INTERNAL";

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use gridbase_core::{
        error::ErrorClass,
        types::{RowId, TableId},
    };

    #[test]
    fn query_errors_keep_their_codes() {
        let cases = [
            (
                QueryError::OrderByFieldNotFound {
                    name: "field_9".to_string(),
                },
                ERROR_ORDER_BY_FIELD_NOT_FOUND,
            ),
            (
                QueryError::OrderByFieldNotPossible {
                    name: "field_9".to_string(),
                    field_type: "link_row".to_string(),
                },
                ERROR_ORDER_BY_FIELD_NOT_POSSIBLE,
            ),
            (
                QueryError::FilterFieldNotFound {
                    field: "9".to_string(),
                },
                ERROR_FILTER_FIELD_NOT_FOUND,
            ),
            (
                QueryError::ViewFilterTypeDoesNotExist {
                    op: "sounds_like".to_string(),
                },
                ERROR_VIEW_FILTER_TYPE_DOES_NOT_EXIST,
            ),
            (
                QueryError::ViewFilterTypeNotAllowedForField {
                    op: "boolean".to_string(),
                    field: "9".to_string(),
                    field_type: "text".to_string(),
                },
                ERROR_VIEW_FILTER_TYPE_UNSUPPORTED_FIELD,
            ),
            (
                QueryError::InvalidArgument("bad".to_string()),
                ERROR_INVALID_ARGUMENT,
            ),
        ];

        for (err, code) in cases {
            let message = err.to_string();
            let err = Error::from(err);

            assert_eq!(err.code(), code);
            assert_eq!(err.origin, ErrorOrigin::Query);
            assert_eq!(err.message, message);
        }
    }

    #[test]
    fn row_errors_map_to_row_codes() {
        let missing = Error::from(RowError::RowDoesNotExist {
            table: TableId::new(1),
            row: RowId::new(7),
        });
        assert_eq!(missing.code(), ERROR_ROW_DOES_NOT_EXIST);
        assert_eq!(missing.kind, ErrorKind::Row(RowErrorKind::NotFound));

        let read_only = Error::from(RowError::ReadOnlyField {
            field: "field_3".to_string(),
        });
        assert_eq!(read_only.code(), ERROR_INVALID_ROW_VALUE);

        let store = Error::from(RowError::Store("poisoned".to_string()));
        assert_eq!(store.code(), ERROR_INTERNAL);
        assert_eq!(store.origin, ErrorOrigin::Store);
    }

    #[test]
    fn response_errors_carry_response_origin() {
        let err = Error::from(ResponseError::NotFound {
            table: TableId::new(4),
        });

        assert_eq!(err.code(), ERROR_ROW_DOES_NOT_EXIST);
        assert_eq!(err.origin, ErrorOrigin::Response);
    }

    #[test]
    fn internal_errors_are_not_remediable() {
        let err = Error::from(InternalError::new(
            ErrorClass::InvalidArgument,
            CoreErrorOrigin::Formula,
            "unexpected token",
        ));

        assert_eq!(err.kind, ErrorKind::Internal);
        assert_eq!(err.origin, ErrorOrigin::Formula);
        assert_eq!(err.to_string(), "unexpected token");
    }

    #[test]
    fn errors_round_trip_through_json() {
        let err = Error::from(QueryError::FilterFieldNotFound {
            field: "12".to_string(),
        });

        let json = serde_json::to_string(&err).expect("serializes");
        let back: Error = serde_json::from_str(&json).expect("deserializes");

        assert_eq!(back, err);
        assert_eq!(back.origin.to_string(), "Query");
    }
}
