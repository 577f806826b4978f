use crate::{
    db::predicate::{FilterOp, ValueTest},
    field_type::{ColumnSpec, FieldType, field_type},
    formula::Formula,
    model::{Field, FieldKind, FieldTypeTag, FormulaResultType, NumberConfig},
    value::{SortKey, Value},
};

///
/// FormulaType
///
/// Computed field. Every capability delegates to the type of the declared
/// result, applied to a shadow field carrying the result configuration.
///

pub(super) struct FormulaType;

/// Field of the formula's result type standing in for the formula field.
pub(crate) fn shadow_field(field: &Field) -> Field {
    let kind = match &field.kind {
        FieldKind::Formula(config) => match config.result {
            FormulaResultType::Text => FieldKind::text(),
            FormulaResultType::Number(number) => FieldKind::Number(NumberConfig {
                negative: true,
                ..number
            }),
            FormulaResultType::Boolean => FieldKind::Boolean,
            FormulaResultType::Date(date) => FieldKind::Date(date),
        },
        other => other.clone(),
    };

    Field {
        kind,
        ..field.clone()
    }
}

fn with_shadow<T>(field: &Field, f: impl FnOnce(&dyn FieldType, &Field) -> T) -> T {
    let shadow = shadow_field(field);

    f(field_type(shadow.tag()), &shadow)
}

fn source(field: &Field) -> Option<&str> {
    match &field.kind {
        FieldKind::Formula(config) => Some(config.formula.as_str()),
        _ => None,
    }
}

impl FieldType for FormulaType {
    fn tag(&self) -> FieldTypeTag {
        FieldTypeTag::Formula
    }

    fn column_spec(&self, field: &Field) -> ColumnSpec {
        let physical = with_shadow(field, |ty, shadow| ty.column_spec(shadow).physical);

        ColumnSpec::nullable(physical)
    }

    /// Coerces computed results into the declared result type.
    fn normalize(&self, field: &Field, value: Value) -> Result<Value, String> {
        with_shadow(field, |ty, shadow| ty.normalize(shadow, value))
    }

    fn is_searchable(&self, field: &Field) -> bool {
        with_shadow(field, |ty, shadow| ty.is_searchable(shadow))
    }

    fn search_text(&self, field: &Field, value: &Value) -> Option<String> {
        with_shadow(field, |ty, shadow| ty.search_text(shadow, value))
    }

    fn can_order(&self, field: &Field) -> bool {
        with_shadow(field, |ty, shadow| ty.can_order(shadow))
    }

    fn order_key(&self, field: &Field, value: &Value) -> SortKey {
        with_shadow(field, |ty, shadow| ty.order_key(shadow, value))
    }

    fn filter_ops(&self, field: &Field) -> &'static [FilterOp] {
        with_shadow(field, |ty, shadow| ty.filter_ops(shadow))
    }

    fn compile_filter(&self, field: &Field, op: FilterOp, arg: &str) -> ValueTest {
        with_shadow(field, |ty, shadow| ty.compile_filter(shadow, op, arg))
    }

    fn read_only(&self) -> bool {
        true
    }

    fn refresh_after_insert(&self, field: &Field) -> bool {
        source(field)
            .and_then(|source| Formula::parse(source).ok())
            .is_some_and(|formula| formula.references_row_id())
    }

    fn refresh_after_update(&self, _field: &Field) -> bool {
        true
    }
}
