mod compare;
mod text;


use crate::types::{OptionId, RowId};
use rust_decimal::Decimal;
use time::{Date, OffsetDateTime};

// re-exports
pub use compare::SortKey;
pub use text::{casefold, format_decimal, round_decimal};

///
/// Value
///
/// One cell value as seen by the engine.
///
/// Null          → the cell holds no value (SQL NULL).
/// SelectOption  → reference to one option of a single-select field, by id.
/// SelectOptions → references to options of a multiple-select field, by id.
/// Links         → referenced rows of the linked table, by id.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Date(Date),
    DateTime(OffsetDateTime),
    Files(Vec<FileValue>),
    Links(Vec<RowId>),
    Number(Decimal),
    SelectOption(OptionId),
    SelectOptions(Vec<OptionId>),
    Text(String),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Null, empty text, or an empty collection.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.is_empty(),
            Self::Files(items) => items.is_empty(),
            Self::Links(items) => items.is_empty(),
            Self::SelectOptions(items) => items.is_empty(),
            _ => false,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_number(&self) -> Option<Decimal> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Short variant label used in validation messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Files(_) => "files",
            Self::Links(_) => "links",
            Self::Number(_) => "number",
            Self::SelectOption(_) => "select_option",
            Self::SelectOptions(_) => "select_options",
            Self::Text(_) => "text",
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(Decimal::from(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(Decimal::from(value))
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Self::Date(value)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(value: OffsetDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<OptionId> for Value {
    fn from(value: OptionId) -> Self {
        Self::SelectOption(value)
    }
}

impl From<Vec<OptionId>> for Value {
    fn from(value: Vec<OptionId>) -> Self {
        Self::SelectOptions(value)
    }
}

impl From<Vec<FileValue>> for Value {
    fn from(value: Vec<FileValue>) -> Self {
        Self::Files(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

///
/// FileValue
///
/// One attached file: the stored object name and the name shown to users.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileValue {
    pub name: String,
    pub visible_name: String,
}

impl FileValue {
    #[must_use]
    pub fn new(name: impl Into<String>, visible_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible_name: visible_name.into(),
        }
    }
}
