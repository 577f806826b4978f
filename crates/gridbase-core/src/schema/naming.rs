//! Attribute-name derivation for attribute-mode schemas.
//!
//! Rules, applied to the table's fields as one set:
//! - a name is lowercased and every run of non-alphanumeric characters
//!   becomes a single `_`; a leading digit gets a `field_` prefix
//! - empty, reserved, or stable-shaped (`field_<digits>`) results fall back
//!   to the stable name
//! - when several fields share a sanitized name, every one of them becomes
//!   `<name>_field_<id>`; creation and rename history play no part
//! - a generated name already taken by another field falls back to the
//!   stable name

use crate::{model::Field, types::FieldId};
use std::collections::{BTreeMap, BTreeSet};

/// Sanitize a user-facing field name into an attribute name.
#[must_use]
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert_str(0, "field_");
    }

    out
}

/// Whether `name` has the shape of a stable column name.
#[must_use]
pub fn is_stable_shape(name: &str) -> bool {
    name.strip_prefix("field_")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Attribute name per field id.
pub(crate) fn attribute_names(
    fields: &[Field],
    is_reserved: impl Fn(&str) -> bool,
) -> BTreeMap<FieldId, String> {
    let candidates: Vec<(FieldId, Option<String>)> = fields
        .iter()
        .map(|field| {
            let name = sanitize(&field.name);
            let usable = !name.is_empty() && !is_reserved(&name) && !is_stable_shape(&name);

            (field.id, usable.then_some(name))
        })
        .collect();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for name in candidates.iter().filter_map(|(_, name)| name.as_deref()) {
        *counts.entry(name).or_default() += 1;
    }
    let is_unique = |name: &str| counts.get(name).copied() == Some(1);

    // Unique names are claimed first so generated names never displace them.
    let mut taken: BTreeSet<String> = candidates
        .iter()
        .filter_map(|(_, name)| name.as_deref())
        .filter(|name| is_unique(name))
        .map(ToString::to_string)
        .collect();

    let mut names = BTreeMap::new();
    for (id, candidate) in &candidates {
        let name = match candidate.as_deref() {
            Some(name) if is_unique(name) => name.to_string(),
            Some(name) => {
                let generated = format!("{name}_field_{id}");
                if taken.insert(generated.clone()) {
                    generated
                } else {
                    id.column_name()
                }
            }
            None => id.column_name(),
        };
        names.insert(*id, name);
    }

    names
}
