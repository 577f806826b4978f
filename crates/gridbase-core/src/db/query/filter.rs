//! Filter objects: `filter__field_<id|created_on|updated_on>__<op>` keys
//! mapped to one value or a list of values.

use crate::{
    db::{
        predicate::{ColumnKey, FilterOp, Predicate, ValueTest},
        query::QueryError,
    },
    field_type::compile_date_test,
    schema::{Schema, SystemColumn},
    types::FieldId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const KEY_PREFIX: &str = "filter__field_";

///
/// FilterObject
/// Filter keys in key order, which keeps compiled predicates deterministic.
///

pub type FilterObject = BTreeMap<String, FilterValue>;

///
/// FilterValue
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    One(FilterScalar),
    Many(Vec<FilterScalar>),
    /// Anything else (objects, nested lists, null) restricts nothing.
    Other(serde_json::Value),
}

impl FilterValue {
    fn args(&self) -> Vec<String> {
        match self {
            Self::One(scalar) => vec![scalar.to_arg()],
            Self::Many(scalars) => scalars.iter().map(FilterScalar::to_arg).collect(),
            Self::Other(_) => Vec::new(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::One(FilterScalar::Text(value.to_string()))
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::One(FilterScalar::Text(value))
    }
}

impl<T: Into<FilterScalar>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        Self::Many(values.into_iter().map(Into::into).collect())
    }
}

///
/// FilterScalar
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterScalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FilterScalar {
    fn to_arg(&self) -> String {
        match self {
            Self::Bool(flag) => flag.to_string(),
            Self::Int(number) => number.to_string(),
            Self::Float(number) => number.to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

impl From<&str> for FilterScalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterScalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

///
/// FilterType
/// How the restrictions of separate keys combine.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FilterType {
    And,
    Or,
}

impl FilterType {
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        match input {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            other => Err(QueryError::InvalidArgument(format!(
                "filter_type must be AND or OR, got '{other}'"
            ))),
        }
    }
}

///
/// FilterTarget
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum FilterTarget<'k> {
    Field(FieldId),
    /// Digits too large for a field id; no such field can exist.
    UnknownField(&'k str),
    System(SystemColumn),
}

/// Compile a filter object into a predicate.
///
/// Keys that are not filter keys are ignored. Within one key, list values
/// are alternatives (OR). Blank arguments restrict nothing; a key whose
/// arguments are all blank is dropped. An object with no effective keys
/// restricts nothing under either filter type.
pub(super) fn build(
    schema: &Schema,
    filters: &FilterObject,
    filter_type: &str,
    only: Option<&BTreeSet<FieldId>>,
) -> Result<Predicate, QueryError> {
    let filter_type = FilterType::parse(filter_type)?;

    let mut keys = Vec::new();
    for (key, value) in filters {
        let Some((target, op_name)) = parse_key(key) else {
            continue;
        };

        let (column, ops, field_label, type_label) = match target {
            FilterTarget::Field(id) => {
                let column = schema
                    .column(id)
                    .filter(|column| {
                        schema.is_queryable(column.id())
                            && only.is_none_or(|ids| ids.contains(&column.id()))
                    })
                    .ok_or_else(|| QueryError::FilterFieldNotFound {
                        field: id.to_string(),
                    })?;
                let field_type = column.field_type();

                (
                    ColumnKey::Field(id),
                    field_type.filter_ops(&column.field),
                    id.to_string(),
                    field_type.tag().to_string(),
                )
            }
            FilterTarget::UnknownField(field) => {
                return Err(QueryError::FilterFieldNotFound {
                    field: field.to_string(),
                });
            }
            FilterTarget::System(system) => (
                ColumnKey::System(system),
                system.filter_ops(),
                system.name().to_string(),
                system.name().to_string(),
            ),
        };

        let op: FilterOp = op_name
            .parse()
            .map_err(|_| QueryError::ViewFilterTypeDoesNotExist {
                op: op_name.to_string(),
            })?;
        if !ops.contains(&op) {
            return Err(QueryError::ViewFilterTypeNotAllowedForField {
                op: op.to_string(),
                field: field_label,
                field_type: type_label,
            });
        }

        let tests: Vec<Predicate> = compile_args(schema, column, op, &value.args())
            .into_iter()
            .map(|test| Predicate::Test { column, test })
            .collect();
        if !tests.is_empty() {
            keys.push(Predicate::any(tests));
        }
    }

    Ok(match filter_type {
        FilterType::And => Predicate::all(keys),
        FilterType::Or if keys.is_empty() => Predicate::True,
        FilterType::Or => Predicate::any(keys),
    })
}

fn compile_args(schema: &Schema, column: ColumnKey, op: FilterOp, args: &[String]) -> Vec<ValueTest> {
    if op.is_unary() {
        return compile_one(schema, column, op, "").into_iter().collect();
    }

    args.iter()
        .filter(|arg| !arg.trim().is_empty())
        .filter_map(|arg| compile_one(schema, column, op, arg))
        .collect()
}

fn compile_one(schema: &Schema, column: ColumnKey, op: FilterOp, arg: &str) -> Option<ValueTest> {
    match column {
        ColumnKey::Field(id) => schema
            .column(id)
            .map(|column| column.field_type().compile_filter(&column.field, op, arg)),
        ColumnKey::System(_) => Some(compile_date_test(op, arg).unwrap_or(ValueTest::Never)),
    }
}

// `filter__field_<target>__<op>`; anything else is not a filter key.
fn parse_key(key: &str) -> Option<(FilterTarget<'_>, &str)> {
    let rest = key.strip_prefix(KEY_PREFIX)?;
    let (target, op) = rest.split_once("__")?;

    if !op.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'_') {
        return None;
    }

    let target = if !target.is_empty() && target.bytes().all(|byte| byte.is_ascii_digit()) {
        target.parse().map_or(FilterTarget::UnknownField(target), |id| {
            FilterTarget::Field(FieldId::new(id))
        })
    } else {
        FilterTarget::System(SystemColumn::filterable(target)?)
    };

    Some((target, op))
}
