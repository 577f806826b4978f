use crate::{
    db::{
        predicate::fingerprint::{write_len_u32, write_tag},
        query::QueryError,
        store::StoredRow,
    },
    schema::{Schema, SchemaColumn},
    types::FieldId,
    value::SortKey,
};
use sha2::{Digest, Sha256};
use std::{cmp::Ordering, collections::BTreeSet};

///
/// OrderTerm
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OrderTerm {
    pub field: FieldId,
    pub descending: bool,
}

///
/// OrderSpec
///
/// Ordering parsed from an order string. Rows equal on every term fall back
/// to ascending row order, then ascending id.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OrderSpec {
    pub terms: Vec<OrderTerm>,
}

impl OrderSpec {
    /// Parse a comma-separated order string.
    ///
    /// Each term is a field reference optionally prefixed with `-` for
    /// descending. With stable naming a reference is `field_<id>` or the
    /// bare id. With attribute naming it is the exact field name or the
    /// attribute name, and a `+` prefix is accepted as a no-op.
    pub fn parse(
        schema: &Schema,
        order: &str,
        only: Option<&BTreeSet<FieldId>>,
    ) -> Result<Self, QueryError> {
        if order.is_empty() {
            return Err(QueryError::InvalidArgument(
                "order string cannot be empty".to_string(),
            ));
        }

        let terms = order
            .split(',')
            .map(|term| parse_term(schema, term, only))
            .collect::<Result<_, _>>()?;

        Ok(Self { terms })
    }

    pub(super) fn keys(&self, schema: &Schema, row: &StoredRow) -> Vec<SortKey> {
        self.terms
            .iter()
            .map(|term| {
                schema.column(term.field).map_or(SortKey::Null, |column| {
                    let value = row.cell(term.field).unwrap_or(&column.spec.default);
                    column.field_type().order_key(&column.field, value)
                })
            })
            .collect()
    }

    pub(super) fn compare(&self, left: &[SortKey], right: &[SortKey]) -> Ordering {
        self.terms
            .iter()
            .zip(left.iter().zip(right))
            .map(|(term, (left, right))| {
                let ordering = left.cmp(right);
                if term.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    pub(super) fn hash(&self, hasher: &mut Sha256) {
        write_tag(hasher, 0x71);
        write_len_u32(hasher, self.terms.len());
        for term in &self.terms {
            hasher.update(term.field.get().to_be_bytes());
            write_tag(hasher, u8::from(term.descending));
        }
    }
}

/// Fallback ordering shared by every query.
pub(super) fn compare_default(left: &StoredRow, right: &StoredRow) -> Ordering {
    left.order.cmp(&right.order).then(left.id.cmp(&right.id))
}

fn parse_term(
    schema: &Schema,
    term: &str,
    only: Option<&BTreeSet<FieldId>>,
) -> Result<OrderTerm, QueryError> {
    let (descending, reference) = match term.strip_prefix('-') {
        Some(rest) => (true, rest),
        None if schema.uses_attribute_names() => (false, term.strip_prefix('+').unwrap_or(term)),
        None => (false, term),
    };

    let not_found = || QueryError::OrderByFieldNotFound {
        name: reference.to_string(),
    };

    let column = resolve(schema, reference).ok_or_else(not_found)?;
    if !schema.is_queryable(column.id()) || only.is_some_and(|ids| !ids.contains(&column.id())) {
        return Err(not_found());
    }

    let field_type = column.field_type();
    if !field_type.can_order(&column.field) {
        return Err(QueryError::OrderByFieldNotPossible {
            name: reference.to_string(),
            field_type: field_type.tag().to_string(),
        });
    }

    Ok(OrderTerm {
        field: column.id(),
        descending,
    })
}

fn resolve<'a>(schema: &'a Schema, reference: &str) -> Option<&'a SchemaColumn> {
    if schema.uses_attribute_names() {
        return schema
            .resolve_name(reference)
            .or_else(|| schema.resolve_attribute(reference));
    }

    let digits = reference.strip_prefix("field_").unwrap_or(reference);
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    digits
        .parse::<u64>()
        .ok()
        .and_then(|id| schema.column(FieldId::new(id)))
}
