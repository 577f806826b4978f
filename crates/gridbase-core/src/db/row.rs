use crate::{
    db::store::StoredRow,
    model::Node,
    schema::{Schema, SchemaColumn},
    types::{FieldId, RowId},
    value::Value,
};
use rust_decimal::Decimal;
use std::fmt;
use time::OffsetDateTime;

///
/// CellKey
/// How a write addresses a column.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CellKey {
    /// Name in the schema's active naming view.
    Name(String),
    Field(FieldId),
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Field(id) => write!(f, "{}", id.column_name()),
        }
    }
}

///
/// RowInput
/// Cell values for one create or update.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RowInput {
    pub(crate) cells: Vec<(CellKey, Value)>,
    pub(crate) order: Option<Decimal>,
}

impl RowInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell by its name in the schema's active naming view.
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.cells.push((CellKey::Name(name.into()), value.into()));
        self
    }

    #[must_use]
    pub fn set_field(mut self, field: FieldId, value: impl Into<Value>) -> Self {
        self.cells.push((CellKey::Field(field), value.into()));
        self
    }

    /// Explicit row order; new rows are appended when unset.
    #[must_use]
    pub const fn order(mut self, order: Decimal) -> Self {
        self.order = Some(order);
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.order.is_none()
    }
}

///
/// Record
///
/// One materialized row read through a schema. Field cells resolve through
/// either naming view; cells the row never stored read as column defaults.
///

#[derive(Clone, Debug)]
pub struct Record<'s> {
    schema: &'s Schema,
    row: StoredRow,
}

impl<'s> Record<'s> {
    pub(crate) const fn new(schema: &'s Schema, row: StoredRow) -> Self {
        Self { schema, row }
    }

    #[must_use]
    pub const fn id(&self) -> RowId {
        self.row.id
    }

    #[must_use]
    pub const fn order(&self) -> Decimal {
        self.row.order
    }

    #[must_use]
    pub const fn created_on(&self) -> OffsetDateTime {
        self.row.created_on
    }

    #[must_use]
    pub const fn updated_on(&self) -> OffsetDateTime {
        self.row.updated_on
    }

    #[must_use]
    pub const fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Cell addressed by its name in the schema's active naming view.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.resolve(name).map(|column| self.value_of(column))
    }

    /// Cell addressed by its stable `field_<id>` name.
    #[must_use]
    pub fn stable(&self, name: &str) -> Option<&Value> {
        self.schema
            .resolve_stable(name)
            .map(|column| self.value_of(column))
    }

    /// Cell addressed by its attribute name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.schema
            .resolve_attribute(name)
            .map(|column| self.value_of(column))
    }

    #[must_use]
    pub fn field(&self, id: FieldId) -> Option<&Value> {
        self.schema.column(id).map(|column| self.value_of(column))
    }

    /// Every field cell in field order, keyed by the active naming view.
    #[must_use]
    pub fn values(&self) -> Vec<(&str, &Value)> {
        self.schema
            .columns()
            .iter()
            .map(|column| (self.schema.key_of(column), self.value_of(column)))
            .collect()
    }

    /// Rendered primary value, or `unnamed row <id>` when the primary field
    /// is missing from the schema or empty.
    #[must_use]
    pub fn display(&self) -> String {
        self.schema
            .primary_column()
            .and_then(|column| {
                let value = self.value_of(column);
                match value {
                    Value::Bool(flag) => Some(flag.to_string()),
                    _ => column.field_type().search_text(&column.field, value),
                }
            })
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| format!("unnamed row {}", self.row.id))
    }

    /// Structural position of this row.
    #[must_use]
    pub const fn node(&self) -> Node {
        Node::Row {
            table_id: self.schema.table_id(),
            row_id: self.row.id,
        }
    }

    /// The row's parent: its table.
    #[must_use]
    pub const fn parent(&self) -> Node {
        Node::Table(self.schema.table_id())
    }

    #[must_use]
    pub const fn stored(&self) -> &StoredRow {
        &self.row
    }

    #[must_use]
    pub fn into_stored(self) -> StoredRow {
        self.row
    }

    pub(crate) fn value_of<'a>(&'a self, column: &'a SchemaColumn) -> &'a Value {
        self.row.cell(column.id()).unwrap_or(&column.spec.default)
    }
}

impl fmt::Display for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}
