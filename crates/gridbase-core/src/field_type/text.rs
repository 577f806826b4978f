use crate::{
    db::predicate::{FilterOp, ValueTest},
    field_type::{ColumnSpec, FieldType, PhysicalType, common_test, unexpected},
    model::{Field, FieldKind, FieldTypeTag},
    value::{SortKey, Value},
};

const TEXT_OPS: &[FilterOp] = &[
    FilterOp::Equal,
    FilterOp::NotEqual,
    FilterOp::Contains,
    FilterOp::ContainsNot,
    FilterOp::Empty,
    FilterOp::NotEmpty,
    FilterOp::LengthIsLowerThan,
];

const SHORT_TEXT_OPS: &[FilterOp] = &[
    FilterOp::Equal,
    FilterOp::NotEqual,
    FilterOp::Contains,
    FilterOp::ContainsNot,
    FilterOp::Empty,
    FilterOp::NotEmpty,
];

const PHONE_NUMBER_MAX_LENGTH: u32 = 100;

pub(super) static TEXT: TextType = TextType {
    tag: FieldTypeTag::Text,
    ops: TEXT_OPS,
    max_length: None,
};

pub(super) static LONG_TEXT: TextType = TextType {
    tag: FieldTypeTag::LongText,
    ops: TEXT_OPS,
    max_length: None,
};

pub(super) static PHONE_NUMBER: TextType = TextType {
    tag: FieldTypeTag::PhoneNumber,
    ops: SHORT_TEXT_OPS,
    max_length: Some(PHONE_NUMBER_MAX_LENGTH),
};

pub(super) static AI: TextType = TextType {
    tag: FieldTypeTag::Ai,
    ops: SHORT_TEXT_OPS,
    max_length: None,
};

///
/// TextType
/// Shared implementation for every type stored as plain text.
///

pub(super) struct TextType {
    tag: FieldTypeTag,
    ops: &'static [FilterOp],
    max_length: Option<u32>,
}

impl TextType {
    fn validate(&self, text: &str) -> Result<(), String> {
        if let Some(max) = self.max_length {
            let length = text.chars().count();
            if !u32::try_from(length).is_ok_and(|length| length <= max) {
                return Err(format!("text is longer than {max} characters"));
            }
        }

        if self.tag == FieldTypeTag::PhoneNumber && !is_phone_number(text) {
            return Err(format!("'{text}' is not a valid phone number"));
        }

        Ok(())
    }
}

impl FieldType for TextType {
    fn tag(&self) -> FieldTypeTag {
        self.tag
    }

    fn column_spec(&self, field: &Field) -> ColumnSpec {
        let mut spec = ColumnSpec::nullable(PhysicalType::Text {
            max_length: self.max_length,
        });
        if let FieldKind::Text {
            text_default: Some(default),
        } = &field.kind
        {
            spec.default = Value::Text(default.clone());
        }

        spec
    }

    fn normalize(&self, _field: &Field, value: Value) -> Result<Value, String> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Text(text) => {
                self.validate(&text)?;
                Ok(Value::Text(text))
            }
            other => Err(unexpected("text", &other)),
        }
    }

    fn search_text(&self, _field: &Field, value: &Value) -> Option<String> {
        value.as_text().map(ToString::to_string)
    }

    fn order_key(&self, _field: &Field, value: &Value) -> SortKey {
        value.as_text().map_or(SortKey::Null, SortKey::text)
    }

    fn filter_ops(&self, _field: &Field) -> &'static [FilterOp] {
        self.ops
    }

    fn compile_filter(&self, _field: &Field, op: FilterOp, arg: &str) -> ValueTest {
        match op {
            FilterOp::Equal => ValueTest::Equals(Value::from(arg)),
            FilterOp::NotEqual => ValueTest::NotEquals(Value::from(arg)),
            FilterOp::LengthIsLowerThan => arg
                .trim()
                .parse()
                .map_or(ValueTest::Never, ValueTest::LengthBelow),
            _ => common_test(op, arg).unwrap_or(ValueTest::Never),
        }
    }
}

fn is_phone_number(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_ascii_digit() || " +-().,#*/:xX".contains(c))
}
