use crate::{
    db::predicate::{FilterOp, ValueTest},
    field_type::{ColumnSpec, FieldType, PhysicalType, common_test, unexpected},
    model::{Field, FieldKind, FieldTypeTag, NumberConfig},
    value::{SortKey, Value, format_decimal, round_decimal},
};
use rust_decimal::Decimal;
use std::str::FromStr;

const NUMBER_OPS: &[FilterOp] = &[
    FilterOp::Equal,
    FilterOp::NotEqual,
    FilterOp::Contains,
    FilterOp::ContainsNot,
    FilterOp::HigherThan,
    FilterOp::LowerThan,
    FilterOp::Empty,
    FilterOp::NotEmpty,
];

/// Integer digits a number column can hold in addition to its decimals.
const NUMBER_MAX_DIGITS: u32 = 50;

///
/// NumberType
///

pub(super) struct NumberType;

fn config(field: &Field) -> NumberConfig {
    match &field.kind {
        FieldKind::Number(config) => *config,
        _ => NumberConfig::default(),
    }
}

fn parse_number(input: &str) -> Option<Decimal> {
    Decimal::from_str(input.trim()).ok()
}

impl FieldType for NumberType {
    fn tag(&self) -> FieldTypeTag {
        FieldTypeTag::Number
    }

    fn column_spec(&self, field: &Field) -> ColumnSpec {
        let scale = config(field).decimal_places;

        ColumnSpec::nullable(PhysicalType::Decimal {
            precision: NUMBER_MAX_DIGITS + scale,
            scale,
        })
    }

    fn normalize(&self, field: &Field, value: Value) -> Result<Value, String> {
        let config = config(field);
        let number = match value {
            Value::Null => return Ok(Value::Null),
            Value::Number(number) => number,
            Value::Text(text) => {
                parse_number(&text).ok_or_else(|| format!("'{text}' is not a number"))?
            }
            other => return Err(unexpected("number", &other)),
        };

        if number.is_sign_negative() && !number.is_zero() && !config.negative {
            return Err(format!("negative numbers are not allowed, got {number}"));
        }

        Ok(Value::Number(round_decimal(number, config.decimal_places)))
    }

    fn search_text(&self, field: &Field, value: &Value) -> Option<String> {
        value
            .as_number()
            .map(|number| format_decimal(number, config(field).decimal_places))
    }

    fn order_key(&self, _field: &Field, value: &Value) -> SortKey {
        value.as_number().map_or(SortKey::Null, SortKey::Number)
    }

    fn filter_ops(&self, _field: &Field) -> &'static [FilterOp] {
        NUMBER_OPS
    }

    fn compile_filter(&self, _field: &Field, op: FilterOp, arg: &str) -> ValueTest {
        let parsed = parse_number(arg);

        match op {
            FilterOp::Equal => parsed.map_or(ValueTest::Never, |number| {
                ValueTest::Equals(Value::Number(number))
            }),
            FilterOp::NotEqual => parsed.map_or(ValueTest::Never, |number| {
                ValueTest::NotEquals(Value::Number(number))
            }),
            FilterOp::HigherThan => parsed.map_or(ValueTest::Never, ValueTest::HigherThan),
            FilterOp::LowerThan => parsed.map_or(ValueTest::Never, ValueTest::LowerThan),
            _ => common_test(op, arg).unwrap_or(ValueTest::Never),
        }
    }
}
