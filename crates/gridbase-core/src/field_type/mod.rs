//! Module: field_type
//! Responsibility: per-type capability lookup (storage shape, write
//! normalization, search rendering, ordering keys, filter operators).
//! Does not own: query composition or row persistence.
//! Boundary: query and row layers dispatch through `FieldType` only; they
//! never branch on concrete field types.

mod boolean;
mod date;
mod file;
mod formula;
mod link_row;
mod number;
mod select;
mod text;


use crate::{
    db::predicate::{FilterOp, ValueTest},
    model::{Field, FieldTypeTag},
    types::TableId,
    value::{SortKey, Value, casefold},
};
use std::fmt;

pub(crate) use date::{compile_date_test, parse_date_target};

///
/// PhysicalType
/// Storage shape of one column.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PhysicalType {
    Integer,
    Text { max_length: Option<u32> },
    Decimal { precision: u32, scale: u32 },
    Bool,
    Date,
    Timestamp,
    Json,
    /// Reference to one select option.
    OptionRef,
    /// Set of select option references.
    OptionSet,
    /// Set of row references into another table.
    RowLinks(TableId),
}

impl fmt::Display for PhysicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Text {
                max_length: Some(length),
            } => write!(f, "text({length})"),
            Self::Text { max_length: None } => write!(f, "text"),
            Self::Decimal { precision, scale } => write!(f, "decimal({precision}, {scale})"),
            Self::Bool => write!(f, "bool"),
            Self::Date => write!(f, "date"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::Json => write!(f, "json"),
            Self::OptionRef => write!(f, "option_ref"),
            Self::OptionSet => write!(f, "option_set"),
            Self::RowLinks(table) => write!(f, "row_links({table})"),
        }
    }
}

///
/// ColumnSpec
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnSpec {
    pub physical: PhysicalType,
    pub default: Value,
    pub nullable: bool,
}

impl ColumnSpec {
    #[must_use]
    pub const fn nullable(physical: PhysicalType) -> Self {
        Self {
            physical,
            default: Value::Null,
            nullable: true,
        }
    }

    #[must_use]
    pub const fn required(physical: PhysicalType, default: Value) -> Self {
        Self {
            physical,
            default,
            nullable: false,
        }
    }
}

///
/// FieldType
///
/// Capability set of one field type. Implementations are stateless; all
/// per-field configuration arrives through the `Field` argument.
///

pub trait FieldType: Send + Sync {
    fn tag(&self) -> FieldTypeTag;

    fn column_spec(&self, field: &Field) -> ColumnSpec;

    /// Validate and canonicalize a value before it is stored.
    fn normalize(&self, field: &Field, value: Value) -> Result<Value, String>;

    fn is_searchable(&self, _field: &Field) -> bool {
        true
    }

    /// Text a search query is matched against; `None` never matches.
    fn search_text(&self, field: &Field, value: &Value) -> Option<String>;

    fn can_order(&self, _field: &Field) -> bool {
        true
    }

    fn order_key(&self, field: &Field, value: &Value) -> SortKey;

    fn filter_ops(&self, field: &Field) -> &'static [FilterOp];

    /// Compile one operator with a non-blank argument. Only called for
    /// operators listed by `filter_ops`.
    fn compile_filter(&self, field: &Field, op: FilterOp, arg: &str) -> ValueTest;

    /// Values are computed by the engine and never accepted from callers.
    fn read_only(&self) -> bool {
        false
    }

    fn refresh_after_insert(&self, _field: &Field) -> bool {
        false
    }

    fn refresh_after_update(&self, _field: &Field) -> bool {
        false
    }
}

/// Capability set registered for a type tag.
#[must_use]
pub fn field_type(tag: FieldTypeTag) -> &'static dyn FieldType {
    match tag {
        FieldTypeTag::Text => &text::TEXT,
        FieldTypeTag::LongText => &text::LONG_TEXT,
        FieldTypeTag::PhoneNumber => &text::PHONE_NUMBER,
        FieldTypeTag::Ai => &text::AI,
        FieldTypeTag::Number => &number::NumberType,
        FieldTypeTag::Boolean => &boolean::BooleanType,
        FieldTypeTag::Date => &date::DateType,
        FieldTypeTag::File => &file::FileType,
        FieldTypeTag::SingleSelect => &select::SingleSelectType,
        FieldTypeTag::MultipleSelect => &select::MultipleSelectType,
        FieldTypeTag::LinkRow => &link_row::LinkRowType,
        FieldTypeTag::Formula => &formula::FormulaType,
    }
}

// Operators every type handles the same way: emptiness and containment over
// the column's search text.
fn common_test(op: FilterOp, arg: &str) -> Option<ValueTest> {
    match op {
        FilterOp::Empty => Some(ValueTest::Empty),
        FilterOp::NotEmpty => Some(ValueTest::NotEmpty),
        FilterOp::Contains => Some(ValueTest::Contains(casefold(arg))),
        FilterOp::ContainsNot => Some(ValueTest::ContainsNot(casefold(arg))),
        _ => None,
    }
}

fn unexpected(expected: &str, value: &Value) -> String {
    format!("expected {expected}, got {}", value.label())
}

/// Parse a boolean filter or input argument.
pub(crate) fn parse_flag(input: &str) -> Option<bool> {
    match casefold(input.trim()).as_str() {
        "1" | "true" | "yes" | "on" | "checked" => Some(true),
        "0" | "false" | "no" | "off" | "unchecked" => Some(false),
        _ => None,
    }
}
