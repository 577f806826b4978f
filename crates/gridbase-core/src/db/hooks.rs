//! Computed-field hooks run inside row writes.

use crate::{
    formula::{EvalContext, Formula},
    model::FieldKind,
    schema::{Schema, SchemaColumn},
    types::{FieldId, RowId},
    value::Value,
};
use log::{trace, warn};
use std::collections::BTreeMap;

///
/// Refresh
/// Which computed columns a write recomputes.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Refresh {
    /// Every computed column: new rows and reconciliation.
    All,
    AfterUpdate,
}

impl Refresh {
    fn selects(self, column: &SchemaColumn) -> bool {
        match self {
            Self::All => column.field_type().read_only(),
            Self::AfterUpdate => column.field_type().refresh_after_update(&column.field),
        }
    }
}

///
/// RowContext
/// Formula view of one row mid-write.
///

struct RowContext<'a> {
    schema: &'a Schema,
    row_id: RowId,
    cells: &'a BTreeMap<FieldId, Value>,
}

impl EvalContext for RowContext<'_> {
    fn row_id(&self) -> RowId {
        self.row_id
    }

    fn field_value(&self, name: &str) -> Option<Value> {
        let column = self.schema.resolve_name(name)?;
        let value = self.cells.get(&column.id()).unwrap_or(&column.spec.default);

        Some(formula_scalar(column, value))
    }
}

// Formulas work on scalars: select options read as their text, collections
// as their rendered search text.
fn formula_scalar(column: &SchemaColumn, value: &Value) -> Value {
    match value {
        Value::SelectOption(id) => column
            .field
            .option(*id)
            .map_or(Value::Null, |option| Value::Text(option.value.clone())),
        Value::SelectOptions(_) | Value::Files(_) | Value::Links(_) => column
            .field_type()
            .search_text(&column.field, value)
            .map_or(Value::Null, Value::Text),
        other => other.clone(),
    }
}

/// Recompute the selected computed columns in field order, so later
/// formulas see the values of earlier ones. Returns how many were computed.
///
/// Evaluation failures store null; a broken formula never blocks a write.
pub(crate) fn compute(
    schema: &Schema,
    row_id: RowId,
    cells: &mut BTreeMap<FieldId, Value>,
    refresh: Refresh,
) -> u64 {
    let mut computed = 0;

    for column in schema.columns().iter().filter(|column| refresh.selects(column)) {
        let FieldKind::Formula(config) = &column.field.kind else {
            continue;
        };

        let result = Formula::parse(&config.formula).and_then(|formula| {
            let ctx = RowContext {
                schema,
                row_id,
                cells: &*cells,
            };
            formula.evaluate(&ctx, config.result)
        });

        let value = match result {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "formula field {} of table {} failed for row {row_id}: {err}",
                    column.stable_name,
                    schema.table_id()
                );
                Value::Null
            }
        };

        trace!(
            "computed {} for row {row_id} of table {}",
            column.stable_name,
            schema.table_id()
        );
        cells.insert(column.id(), value);
        computed += 1;
    }

    computed
}
