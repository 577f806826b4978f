//! Module: db::response
//! Responsibility: materialized query results, pages, and their JSON shape.
//! Does not own: query execution or row storage.

use crate::{
    db::Record,
    error::{ErrorClass, ErrorOrigin, InternalError},
    schema::SchemaColumn,
    types::{RowId, TableId},
    value::Value,
};
use serde_json::{Map, Value as JsonValue, json};
use thiserror::Error as ThisError;
use time::format_description::well_known::Rfc3339;

///
/// ResponseError
/// Errors related to interpreting a materialized response.
///

#[derive(Debug, ThisError)]
pub enum ResponseError {
    #[error("expected exactly one row, found 0 (table {table})")]
    NotFound { table: TableId },

    #[error("expected exactly one row, found {count} (table {table})")]
    NotUnique { table: TableId, count: usize },
}

impl ResponseError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::NotUnique { .. } => ErrorClass::Conflict,
        }
    }
}

impl From<ResponseError> for InternalError {
    fn from(err: ResponseError) -> Self {
        Self::new(err.class(), ErrorOrigin::Response, err.to_string())
    }
}

///
/// Response
/// Materialized query result in query order.
///

#[derive(Clone, Debug)]
pub struct Response<'s> {
    table: TableId,
    records: Vec<Record<'s>>,
}

impl<'s> Response<'s> {
    pub(crate) const fn new(table: TableId, records: Vec<Record<'s>>) -> Self {
        Self { table, records }
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn count(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // ------------------------------------------------------------------
    // Cardinality enforcement
    // ------------------------------------------------------------------

    pub fn require_one(&self) -> Result<(), InternalError> {
        match self.count() {
            1 => Ok(()),
            0 => Err(ResponseError::NotFound { table: self.table }.into()),
            count => Err(ResponseError::NotUnique {
                table: self.table,
                count,
            }
            .into()),
        }
    }

    pub fn require_some(&self) -> Result<(), InternalError> {
        if self.is_empty() {
            Err(ResponseError::NotFound { table: self.table }.into())
        } else {
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------

    pub fn record(self) -> Result<Record<'s>, InternalError> {
        let table = self.table;

        self.try_record()?
            .ok_or_else(|| ResponseError::NotFound { table }.into())
    }

    pub fn try_record(self) -> Result<Option<Record<'s>>, InternalError> {
        match self.count() {
            0 | 1 => Ok(self.records.into_iter().next()),
            count => Err(ResponseError::NotUnique {
                table: self.table,
                count,
            }
            .into()),
        }
    }

    #[must_use]
    pub fn records(&self) -> &[Record<'s>] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<Record<'s>> {
        self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record<'s>> {
        self.records.iter()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<RowId> {
        self.records.iter().map(Record::id).collect()
    }

    /// Primary-field rendering of every record, in order.
    #[must_use]
    pub fn display_values(&self) -> Vec<String> {
        self.records.iter().map(Record::display).collect()
    }

    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Array(self.records.iter().map(Record::to_json).collect())
    }
}

impl<'s> IntoIterator for Response<'s> {
    type Item = Record<'s>;
    type IntoIter = std::vec::IntoIter<Record<'s>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a, 's> IntoIterator for &'a Response<'s> {
    type Item = &'a Record<'s>;
    type IntoIter = std::slice::Iter<'a, Record<'s>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

///
/// Page
///
/// One offset window over a query result, with the total match count.
///

#[derive(Clone, Debug)]
pub struct Page<'s> {
    pub response: Response<'s>,
    pub offset: usize,
    pub limit: usize,
    pub total: usize,
}

impl Page<'_> {
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.offset.saturating_add(self.response.count()) < self.total
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.offset > 0
    }

    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        json!({
            "count": self.total,
            "offset": self.offset,
            "limit": self.limit,
            "has_next": self.has_next(),
            "results": self.response.to_json(),
        })
    }
}

impl Record<'_> {
    /// JSON object keyed by the active naming view, plus `id` and `order`.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let mut object = Map::new();
        object.insert("id".to_string(), json!(self.id().get()));
        object.insert(
            "order".to_string(),
            JsonValue::String(self.order().to_string()),
        );

        for column in self.schema().columns() {
            let key = self.schema().key_of(column).to_string();
            object.insert(key, cell_json(column, self.value_of(column)));
        }

        JsonValue::Object(object)
    }
}

fn cell_json(column: &SchemaColumn, value: &Value) -> JsonValue {
    let option_json = |id| {
        column.field.option(id).map_or(JsonValue::Null, |option| {
            json!({ "id": option.id.get(), "value": option.value, "color": option.color })
        })
    };

    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(flag) => JsonValue::Bool(*flag),
        Value::Number(number) => JsonValue::String(number.to_string()),
        Value::Text(text) => JsonValue::String(text.clone()),
        Value::Date(day) => JsonValue::String(format!(
            "{:04}-{:02}-{:02}",
            day.year(),
            u8::from(day.month()),
            day.day()
        )),
        Value::DateTime(at) => at
            .format(&Rfc3339)
            .map_or(JsonValue::Null, JsonValue::String),
        Value::SelectOption(id) => option_json(*id),
        Value::SelectOptions(ids) => ids.iter().map(|id| option_json(*id)).collect(),
        Value::Files(files) => files
            .iter()
            .map(|file| json!({ "name": file.name, "visible_name": file.visible_name }))
            .collect(),
        Value::Links(ids) => ids.iter().map(|id| json!({ "id": id.get() })).collect(),
    }
}
