use crate::{
    db::predicate::{FilterOp, ValueTest},
    field_type::{ColumnSpec, FieldType, PhysicalType, common_test, unexpected},
    model::{Field, FieldTypeTag},
    types::OptionId,
    value::{SortKey, Value},
};

const SINGLE_SELECT_OPS: &[FilterOp] = &[
    FilterOp::SingleSelectEqual,
    FilterOp::SingleSelectNotEqual,
    FilterOp::Contains,
    FilterOp::ContainsNot,
    FilterOp::Empty,
    FilterOp::NotEmpty,
];

const MULTIPLE_SELECT_OPS: &[FilterOp] = &[
    FilterOp::MultipleSelectHas,
    FilterOp::MultipleSelectHasNot,
    FilterOp::Contains,
    FilterOp::ContainsNot,
    FilterOp::Empty,
    FilterOp::NotEmpty,
];

fn check_option(field: &Field, id: OptionId) -> Result<OptionId, String> {
    field
        .option(id)
        .map(|option| option.id)
        .ok_or_else(|| format!("option {id} does not belong to field '{}'", field.name))
}

fn parse_option(arg: &str) -> Option<OptionId> {
    arg.trim().parse().ok()
}

fn option_value(field: &Field, id: OptionId) -> Option<&str> {
    field.option(id).map(|option| option.value.as_str())
}

///
/// SingleSelectType
///

pub(super) struct SingleSelectType;

impl FieldType for SingleSelectType {
    fn tag(&self) -> FieldTypeTag {
        FieldTypeTag::SingleSelect
    }

    fn column_spec(&self, _field: &Field) -> ColumnSpec {
        ColumnSpec::nullable(PhysicalType::OptionRef)
    }

    fn normalize(&self, field: &Field, value: Value) -> Result<Value, String> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::SelectOption(id) => check_option(field, id).map(Value::SelectOption),
            other => Err(unexpected("select option", &other)),
        }
    }

    fn search_text(&self, field: &Field, value: &Value) -> Option<String> {
        match value {
            Value::SelectOption(id) => option_value(field, *id).map(ToString::to_string),
            _ => None,
        }
    }

    fn order_key(&self, field: &Field, value: &Value) -> SortKey {
        match value {
            Value::SelectOption(id) => field
                .option_position(*id)
                .map_or(SortKey::Null, SortKey::Position),
            _ => SortKey::Null,
        }
    }

    fn filter_ops(&self, _field: &Field) -> &'static [FilterOp] {
        SINGLE_SELECT_OPS
    }

    fn compile_filter(&self, _field: &Field, op: FilterOp, arg: &str) -> ValueTest {
        match op {
            FilterOp::SingleSelectEqual => {
                parse_option(arg).map_or(ValueTest::Never, ValueTest::HasOption)
            }
            FilterOp::SingleSelectNotEqual => {
                parse_option(arg).map_or(ValueTest::Never, ValueTest::LacksOption)
            }
            _ => common_test(op, arg).unwrap_or(ValueTest::Never),
        }
    }
}

///
/// MultipleSelectType
///
/// Orders by the sorted ordinal positions of the chosen options, so the
/// option order configured on the field drives row order.
///

pub(super) struct MultipleSelectType;

impl FieldType for MultipleSelectType {
    fn tag(&self) -> FieldTypeTag {
        FieldTypeTag::MultipleSelect
    }

    fn column_spec(&self, _field: &Field) -> ColumnSpec {
        ColumnSpec::required(PhysicalType::OptionSet, Value::SelectOptions(Vec::new()))
    }

    fn normalize(&self, field: &Field, value: Value) -> Result<Value, String> {
        let ids = match value {
            Value::Null => Vec::new(),
            Value::SelectOption(id) => vec![id],
            Value::SelectOptions(ids) => ids,
            other => return Err(unexpected("select options", &other)),
        };

        let mut checked = Vec::with_capacity(ids.len());
        for id in ids {
            let id = check_option(field, id)?;
            if !checked.contains(&id) {
                checked.push(id);
            }
        }

        Ok(Value::SelectOptions(checked))
    }

    fn search_text(&self, field: &Field, value: &Value) -> Option<String> {
        let Value::SelectOptions(ids) = value else {
            return None;
        };
        let values: Vec<_> = ids
            .iter()
            .filter_map(|id| option_value(field, *id))
            .collect();

        (!values.is_empty()).then(|| values.join(" "))
    }

    fn order_key(&self, field: &Field, value: &Value) -> SortKey {
        let Value::SelectOptions(ids) = value else {
            return SortKey::Null;
        };
        let mut positions: Vec<_> = ids
            .iter()
            .filter_map(|id| field.option_position(*id))
            .collect();
        if positions.is_empty() {
            return SortKey::Null;
        }
        positions.sort_unstable();

        SortKey::Positions(positions)
    }

    fn filter_ops(&self, _field: &Field) -> &'static [FilterOp] {
        MULTIPLE_SELECT_OPS
    }

    fn compile_filter(&self, _field: &Field, op: FilterOp, arg: &str) -> ValueTest {
        match op {
            FilterOp::MultipleSelectHas => {
                parse_option(arg).map_or(ValueTest::Never, ValueTest::HasOption)
            }
            FilterOp::MultipleSelectHasNot => {
                parse_option(arg).map_or(ValueTest::Never, ValueTest::LacksOption)
            }
            _ => common_test(op, arg).unwrap_or(ValueTest::Never),
        }
    }
}
