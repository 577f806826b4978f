use crate::{
    db::predicate::{FilterOp, ValueTest},
    field_type::{ColumnSpec, FieldType, PhysicalType, parse_flag, unexpected},
    model::{Field, FieldTypeTag},
    value::{SortKey, Value},
};

///
/// BooleanType
/// Never null: missing and null inputs store `false`.
///

pub(super) struct BooleanType;

impl FieldType for BooleanType {
    fn tag(&self) -> FieldTypeTag {
        FieldTypeTag::Boolean
    }

    fn column_spec(&self, _field: &Field) -> ColumnSpec {
        ColumnSpec::required(PhysicalType::Bool, Value::Bool(false))
    }

    fn normalize(&self, _field: &Field, value: Value) -> Result<Value, String> {
        match value {
            Value::Null => Ok(Value::Bool(false)),
            Value::Bool(flag) => Ok(Value::Bool(flag)),
            Value::Text(text) => parse_flag(&text)
                .map(Value::Bool)
                .ok_or_else(|| format!("'{text}' is not a boolean")),
            other => Err(unexpected("bool", &other)),
        }
    }

    fn is_searchable(&self, _field: &Field) -> bool {
        false
    }

    fn search_text(&self, _field: &Field, _value: &Value) -> Option<String> {
        None
    }

    fn order_key(&self, _field: &Field, value: &Value) -> SortKey {
        SortKey::Bool(value.as_bool().unwrap_or(false))
    }

    fn filter_ops(&self, _field: &Field) -> &'static [FilterOp] {
        &[FilterOp::Boolean]
    }

    fn compile_filter(&self, _field: &Field, op: FilterOp, arg: &str) -> ValueTest {
        match op {
            FilterOp::Boolean => parse_flag(arg).map_or(ValueTest::Never, ValueTest::Flag),
            _ => ValueTest::Never,
        }
    }
}
