use crate::{
    db::{
        predicate::{ColumnKey, Predicate, ValueTest},
        store::StoredRow,
    },
    schema::{Schema, SystemColumn},
    value::Value,
};
use rust_decimal::Decimal;

impl Predicate {
    /// Evaluate against one stored row of the schema's table.
    ///
    /// Columns missing from the schema never match a test; predicates are
    /// built from the same schema, so that only happens for hand-built trees.
    #[must_use]
    pub fn eval(&self, schema: &Schema, row: &StoredRow) -> bool {
        match self {
            Self::True => true,
            Self::False => false,
            Self::And(children) => children.iter().all(|child| child.eval(schema, row)),
            Self::Or(children) => children.iter().any(|child| child.eval(schema, row)),
            Self::Not(inner) => !inner.eval(schema, row),
            Self::Test { column, test } => eval_test(schema, row, *column, test),
            Self::RowIdEq(id) => row.id == *id,
        }
    }
}

fn eval_test(schema: &Schema, row: &StoredRow, column: ColumnKey, test: &ValueTest) -> bool {
    match column {
        ColumnKey::Field(id) => {
            let Some(column) = schema.column(id) else {
                return false;
            };
            let value = row.cell(id).unwrap_or(&column.spec.default);

            test.matches(value, || {
                column.field_type().search_text(&column.field, value)
            })
        }
        ColumnKey::System(system) => {
            let value = system_value(row, system);
            let rendered = || match &value {
                Value::Number(number) => Some(number.normalize().to_string()),
                _ => None,
            };

            test.matches(&value, rendered)
        }
    }
}

/// Value of a system column for one row.
pub(crate) fn system_value(row: &StoredRow, column: SystemColumn) -> Value {
    match column {
        SystemColumn::Id => Value::Number(Decimal::from(row.id.get())),
        SystemColumn::Order => Value::Number(row.order),
        SystemColumn::CreatedOn => Value::DateTime(row.created_on),
        SystemColumn::UpdatedOn => Value::DateTime(row.updated_on),
    }
}
