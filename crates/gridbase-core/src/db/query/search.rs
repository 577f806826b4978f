use crate::{
    db::predicate::{ColumnKey, Predicate, ValueTest},
    schema::Schema,
    types::RowId,
    value::casefold,
};

/// Build the search restriction: a row matches when any searchable column's
/// search text contains the case-folded query, or, when enabled, when its id
/// is exactly the trimmed query. A blank query restricts nothing.
pub(super) fn build(schema: &Schema, query: &str, match_row_id: bool) -> Predicate {
    if query.trim().is_empty() {
        return Predicate::True;
    }

    let needle = casefold(query);
    let mut any: Vec<Predicate> = schema
        .columns()
        .iter()
        .filter(|column| column.field_type().is_searchable(&column.field))
        .map(|column| Predicate::Test {
            column: ColumnKey::Field(column.id()),
            test: ValueTest::Contains(needle.clone()),
        })
        .collect();

    if match_row_id && let Some(id) = exact_row_id(query.trim()) {
        any.push(Predicate::RowIdEq(id));
    }

    Predicate::any(any)
}

// Only the canonical spelling counts: "07" never matches row 7.
fn exact_row_id(text: &str) -> Option<RowId> {
    text.parse::<u64>()
        .ok()
        .filter(|id| id.to_string() == text)
        .map(RowId::new)
}
