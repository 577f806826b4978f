use crate::{
    model::{Node, field::Field},
    types::{DatabaseId, FieldId, TableId},
};
use serde::{Deserialize, Serialize};

///
/// Table
///
/// A user table: ordered field definitions plus its position among the
/// sibling tables of one database application.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Table {
    pub id: TableId,
    pub database_id: DatabaseId,
    pub name: String,
    pub order: u32,
    fields: Vec<Field>,
}

impl Table {
    #[must_use]
    pub const fn new(id: TableId, database_id: DatabaseId, name: String, order: u32) -> Self {
        Self {
            id,
            database_id,
            name,
            order,
            fields: Vec::new(),
        }
    }

    /// Physical storage location of the table's rows.
    #[must_use]
    pub fn storage_name(&self) -> String {
        format!("database_table_{}", self.id)
    }

    /// Fields in display order (`order`, then `id`).
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|field| field.id == id)
    }

    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    #[must_use]
    pub fn primary_field(&self) -> Option<&Field> {
        self.fields.iter().find(|field| field.primary)
    }

    #[must_use]
    pub const fn parent(&self) -> Node {
        Node::Database(self.database_id)
    }

    pub(crate) fn field_mut(&mut self, id: FieldId) -> Option<&mut Field> {
        self.fields.iter_mut().find(|field| field.id == id)
    }

    pub(crate) fn fields_mut(&mut self) -> impl Iterator<Item = &mut Field> {
        self.fields.iter_mut()
    }

    pub(crate) fn insert_field(&mut self, field: Field) {
        self.fields.push(field);
        self.fields.sort_by_key(|field| (field.order, field.id));
    }

    pub(crate) fn remove_field(&mut self, id: FieldId) -> Option<Field> {
        let index = self.fields.iter().position(|field| field.id == id)?;

        Some(self.fields.remove(index))
    }

    /// Order value for a field appended after every existing field.
    pub(crate) fn next_field_order(&self) -> u32 {
        self.fields
            .iter()
            .map(|field| field.order.saturating_add(1))
            .max()
            .unwrap_or(0)
    }
}
