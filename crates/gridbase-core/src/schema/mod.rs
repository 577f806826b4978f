//! Module: schema
//! Responsibility: compose the ephemeral row schema of one table from its
//! current field metadata, and resolve column names in both naming views.
//! Does not own: field metadata (catalog) or row storage.
//! Boundary: composition is a pure read; it never fails and never mutates
//! the table it reads.

mod naming;


use crate::{
    config::SYSTEM_RESERVED_NAMES,
    db::predicate::FilterOp,
    field_type::{ColumnSpec, FieldType, PhysicalType, field_type},
    model::{Field, Node, Table},
    types::{DatabaseId, FieldId, TableId},
    value::Value,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

pub use naming::{is_stable_shape, sanitize};

///
/// SystemColumn
/// Columns every schema carries in addition to its fields.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum SystemColumn {
    Id,
    Order,
    CreatedOn,
    UpdatedOn,
}

const TIMESTAMP_OPS: &[FilterOp] = &[
    FilterOp::DateEqual,
    FilterOp::DateNotEqual,
    FilterOp::DateBefore,
    FilterOp::DateAfter,
];

impl SystemColumn {
    pub const ALL: [Self; 4] = [Self::Id, Self::Order, Self::CreatedOn, Self::UpdatedOn];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => SYSTEM_RESERVED_NAMES[0],
            Self::Order => SYSTEM_RESERVED_NAMES[1],
            Self::CreatedOn => SYSTEM_RESERVED_NAMES[2],
            Self::UpdatedOn => SYSTEM_RESERVED_NAMES[3],
        }
    }

    #[must_use]
    pub const fn spec(self) -> ColumnSpec {
        match self {
            Self::Id => ColumnSpec::required(PhysicalType::Integer, Value::Null),
            Self::Order => ColumnSpec::required(
                PhysicalType::Decimal {
                    precision: 40,
                    scale: 20,
                },
                Value::Null,
            ),
            Self::CreatedOn | Self::UpdatedOn => {
                ColumnSpec::required(PhysicalType::Timestamp, Value::Null)
            }
        }
    }

    /// Filter operators accepted through `filter__field_<name>__<op>` keys.
    #[must_use]
    pub const fn filter_ops(self) -> &'static [FilterOp] {
        match self {
            Self::CreatedOn | Self::UpdatedOn => TIMESTAMP_OPS,
            Self::Id | Self::Order => &[],
        }
    }

    /// System column addressable from filter keys by name.
    #[must_use]
    pub fn filterable(name: &str) -> Option<Self> {
        match name {
            "created_on" => Some(Self::CreatedOn),
            "updated_on" => Some(Self::UpdatedOn),
            _ => None,
        }
    }

    pub(crate) const fn tag(self) -> u8 {
        match self {
            Self::Id => 1,
            Self::Order => 2,
            Self::CreatedOn => 3,
            Self::UpdatedOn => 4,
        }
    }
}

impl fmt::Display for SystemColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

///
/// ComposeOptions
///
/// `fields` restricts the schema to a subset of the table's fields.
/// `field_ids` is an allow-list: listed fields are always included, and
/// when present only listed fields are eligible for filtering and ordering.
/// With neither set, the schema covers every field.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ComposeOptions {
    pub fields: Option<Vec<FieldId>>,
    pub field_ids: Option<Vec<FieldId>>,
    pub attribute_names: bool,
    pub reserved_names: Vec<String>,
}

impl ComposeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn attribute_names(mut self, enabled: bool) -> Self {
        self.attribute_names = enabled;
        self
    }

    #[must_use]
    pub fn fields(mut self, ids: impl IntoIterator<Item = FieldId>) -> Self {
        self.fields = Some(ids.into_iter().collect());
        self
    }

    #[must_use]
    pub fn field_ids(mut self, ids: impl IntoIterator<Item = FieldId>) -> Self {
        self.field_ids = Some(ids.into_iter().collect());
        self
    }

    #[must_use]
    pub fn reserved_names(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.reserved_names = names.into_iter().collect();
        self
    }

    fn is_reserved(&self, name: &str) -> bool {
        SYSTEM_RESERVED_NAMES.contains(&name)
            || self.reserved_names.iter().any(|reserved| reserved == name)
    }
}

///
/// SchemaColumn
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SchemaColumn {
    pub field: Field,
    /// `field_<id>`; the storage column name.
    pub stable_name: String,
    /// Sanitized, collision-free attribute alias.
    pub attribute_name: String,
    pub spec: ColumnSpec,
}

impl SchemaColumn {
    #[must_use]
    pub fn field_type(&self) -> &'static dyn FieldType {
        field_type(self.field.tag())
    }

    #[must_use]
    pub const fn id(&self) -> FieldId {
        self.field.id
    }
}

///
/// Schema
///
/// Derived description of one table's row shape. Never persisted; composed
/// per call. Both naming views resolve to the same columns.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Schema {
    table_id: TableId,
    database_id: DatabaseId,
    table_name: String,
    storage_name: String,
    attribute_mode: bool,
    columns: Vec<SchemaColumn>,
    by_id: BTreeMap<FieldId, usize>,
    by_stable: BTreeMap<String, usize>,
    by_attribute: BTreeMap<String, usize>,
    by_name: BTreeMap<String, usize>,
    queryable: Option<BTreeSet<FieldId>>,
    table_fields: BTreeSet<FieldId>,
    /// Every field of the table when this schema exposes a subset.
    full: Option<Box<Self>>,
}

impl Schema {
    /// Compose the schema of `table` as it is right now.
    #[must_use]
    pub fn compose(table: &Table, options: &ComposeOptions) -> Self {
        let selected: Option<BTreeSet<FieldId>> = match (&options.fields, &options.field_ids) {
            (None, None) => None,
            (subset, allow) => Some(
                subset
                    .iter()
                    .chain(allow.iter())
                    .flatten()
                    .copied()
                    .collect(),
            ),
        };

        let full = selected.is_some().then(|| {
            let options = ComposeOptions {
                fields: None,
                field_ids: None,
                ..options.clone()
            };
            Box::new(Self::compose(table, &options))
        });

        let fields: Vec<Field> = table
            .fields()
            .iter()
            .filter(|field| selected.as_ref().is_none_or(|ids| ids.contains(&field.id)))
            .cloned()
            .collect();

        // Attribute names are derived from the whole table so that the name a
        // field gets never depends on which subset was requested.
        let attribute_names = naming::attribute_names(table.fields(), |name| {
            options.is_reserved(name)
        });

        let mut schema = Self {
            table_id: table.id,
            database_id: table.database_id,
            table_name: table.name.clone(),
            storage_name: table.storage_name(),
            attribute_mode: options.attribute_names,
            columns: Vec::with_capacity(fields.len()),
            by_id: BTreeMap::new(),
            by_stable: BTreeMap::new(),
            by_attribute: BTreeMap::new(),
            by_name: BTreeMap::new(),
            queryable: options
                .field_ids
                .as_ref()
                .map(|ids| ids.iter().copied().collect()),
            table_fields: table.fields().iter().map(|field| field.id).collect(),
            full,
        };

        for field in fields {
            let index = schema.columns.len();
            let stable_name = field.column_name();
            let attribute_name = attribute_names
                .get(&field.id)
                .cloned()
                .unwrap_or_else(|| stable_name.clone());
            let spec = field_type(field.tag()).column_spec(&field);

            schema.by_id.insert(field.id, index);
            schema.by_stable.insert(stable_name.clone(), index);
            schema.by_attribute.insert(attribute_name.clone(), index);
            schema.by_name.entry(field.name.clone()).or_insert(index);
            schema.columns.push(SchemaColumn {
                field,
                stable_name,
                attribute_name,
                spec,
            });
        }

        schema
    }

    #[must_use]
    pub const fn table_id(&self) -> TableId {
        self.table_id
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    #[must_use]
    pub fn storage_name(&self) -> &str {
        &self.storage_name
    }

    /// Structural parent of the schema's table.
    #[must_use]
    pub const fn parent(&self) -> Node {
        Node::Database(self.database_id)
    }

    #[must_use]
    pub const fn uses_attribute_names(&self) -> bool {
        self.attribute_mode
    }

    /// Field columns in field order.
    #[must_use]
    pub fn columns(&self) -> &[SchemaColumn] {
        &self.columns
    }

    #[must_use]
    pub const fn system_columns(&self) -> &'static [SystemColumn] {
        &SystemColumn::ALL
    }

    #[must_use]
    pub fn column(&self, id: FieldId) -> Option<&SchemaColumn> {
        self.by_id.get(&id).map(|index| &self.columns[*index])
    }

    /// Resolve a name in the schema's active naming view.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&SchemaColumn> {
        if self.attribute_mode {
            self.resolve_attribute(name)
        } else {
            self.resolve_stable(name)
        }
    }

    /// Resolve a stable column name (`field_<id>`).
    #[must_use]
    pub fn resolve_stable(&self, name: &str) -> Option<&SchemaColumn> {
        self.by_stable.get(name).map(|index| &self.columns[*index])
    }

    #[must_use]
    pub fn resolve_attribute(&self, name: &str) -> Option<&SchemaColumn> {
        self.by_attribute.get(name).map(|index| &self.columns[*index])
    }

    /// Resolve an exact user-facing field name.
    #[must_use]
    pub fn resolve_name(&self, name: &str) -> Option<&SchemaColumn> {
        self.by_name.get(name).map(|index| &self.columns[*index])
    }

    /// Name a column is addressed by in the active naming view.
    #[must_use]
    pub fn key_of<'a>(&self, column: &'a SchemaColumn) -> &'a str {
        if self.attribute_mode {
            &column.attribute_name
        } else {
            &column.stable_name
        }
    }

    /// Whether a field may be used for filtering and ordering.
    #[must_use]
    pub fn is_queryable(&self, id: FieldId) -> bool {
        self.by_id.contains_key(&id)
            && self
                .queryable
                .as_ref()
                .is_none_or(|allowed| allowed.contains(&id))
    }

    /// Whether `id` names a current field of the table, inside the schema
    /// or not.
    #[must_use]
    pub fn is_table_field(&self, id: FieldId) -> bool {
        self.table_fields.contains(&id)
    }

    /// The same table with every field in it, whatever subset this schema
    /// exposes. Writes default and compute cells against it.
    #[must_use]
    pub fn table_schema(&self) -> &Self {
        self.full.as_deref().unwrap_or(self)
    }

    /// Column of the primary (display) field, when it is part of the schema.
    #[must_use]
    pub fn primary_column(&self) -> Option<&SchemaColumn> {
        self.columns.iter().find(|column| column.field.primary)
    }
}
