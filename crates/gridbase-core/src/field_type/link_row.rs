use crate::{
    db::predicate::{FilterOp, ValueTest},
    field_type::{ColumnSpec, FieldType, PhysicalType, unexpected},
    model::{Field, FieldKind, FieldTypeTag},
    types::{RowId, TableId},
    value::{SortKey, Value},
};

///
/// LinkRowType
///
/// References to rows of another table. Not searchable, orderable, or
/// filterable.
///

pub(super) struct LinkRowType;

impl FieldType for LinkRowType {
    fn tag(&self) -> FieldTypeTag {
        FieldTypeTag::LinkRow
    }

    fn column_spec(&self, field: &Field) -> ColumnSpec {
        let target = match &field.kind {
            FieldKind::LinkRow { link_table_id } => *link_table_id,
            _ => TableId::new(0),
        };

        ColumnSpec::required(PhysicalType::RowLinks(target), Value::Links(Vec::new()))
    }

    fn normalize(&self, _field: &Field, value: Value) -> Result<Value, String> {
        let ids = match value {
            Value::Null => Vec::new(),
            Value::Links(ids) => ids,
            other => return Err(unexpected("row links", &other)),
        };

        let mut unique: Vec<RowId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }

        Ok(Value::Links(unique))
    }

    fn is_searchable(&self, _field: &Field) -> bool {
        false
    }

    fn search_text(&self, _field: &Field, _value: &Value) -> Option<String> {
        None
    }

    fn can_order(&self, _field: &Field) -> bool {
        false
    }

    fn order_key(&self, _field: &Field, _value: &Value) -> SortKey {
        SortKey::Null
    }

    fn filter_ops(&self, _field: &Field) -> &'static [FilterOp] {
        &[]
    }

    fn compile_filter(&self, _field: &Field, _op: FilterOp, _arg: &str) -> ValueTest {
        ValueTest::Never
    }
}
