//! Module: model::catalog
//! Responsibility: in-process metadata provider for workspaces, databases,
//! tables, fields, and select options.
//! Does not own: permission checks, physical migrations, or row data.
//! Boundary: schema composition pulls `Table` snapshots from here on demand.

use crate::{
    model::{
        Node,
        field::{Field, FieldKind},
        select::SelectOption,
        table::Table,
    },
    types::{DatabaseId, FieldId, OptionId, TableId, WorkspaceId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// CatalogError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum CatalogError {
    #[error("workspace {0} does not exist")]
    WorkspaceNotFound(WorkspaceId),

    #[error("database {0} does not exist")]
    DatabaseNotFound(DatabaseId),

    #[error("table {0} does not exist")]
    TableNotFound(TableId),

    #[error("field {0} does not exist")]
    FieldNotFound(FieldId),

    #[error("a field named '{name}' already exists in table {table}")]
    DuplicateFieldName { table: TableId, name: String },

    #[error("field {0} does not hold select options")]
    NotASelectField(FieldId),
}

///
/// Workspace
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
}

///
/// Database
/// A database application: the parent of a set of tables.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Database {
    pub id: DatabaseId,
    pub workspace_id: WorkspaceId,
    pub name: String,
}

///
/// Catalog
///
/// Field metadata provider. Callers re-read tables whenever they compose a
/// schema; nothing is pushed to existing schemas when metadata changes.
///

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    workspaces: BTreeMap<WorkspaceId, Workspace>,
    databases: BTreeMap<DatabaseId, Database>,
    tables: BTreeMap<TableId, Table>,
    field_tables: BTreeMap<FieldId, TableId>,
    next_id: u64,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Hierarchy
    // ------------------------------------------------------------------

    pub fn create_workspace(&mut self, name: impl Into<String>) -> WorkspaceId {
        let id = WorkspaceId::new(self.allocate());
        self.workspaces.insert(
            id,
            Workspace {
                id,
                name: name.into(),
            },
        );

        id
    }

    pub fn create_database(
        &mut self,
        workspace_id: WorkspaceId,
        name: impl Into<String>,
    ) -> Result<DatabaseId, CatalogError> {
        if !self.workspaces.contains_key(&workspace_id) {
            return Err(CatalogError::WorkspaceNotFound(workspace_id));
        }

        let id = DatabaseId::new(self.allocate());
        self.databases.insert(
            id,
            Database {
                id,
                workspace_id,
                name: name.into(),
            },
        );

        Ok(id)
    }

    /// Create a table positioned after every sibling table.
    pub fn create_table(
        &mut self,
        database_id: DatabaseId,
        name: impl Into<String>,
    ) -> Result<TableId, CatalogError> {
        let order = self.next_table_order(database_id);

        self.create_table_with_order(database_id, name, order)
    }

    pub fn create_table_with_order(
        &mut self,
        database_id: DatabaseId,
        name: impl Into<String>,
        order: u32,
    ) -> Result<TableId, CatalogError> {
        if !self.databases.contains_key(&database_id) {
            return Err(CatalogError::DatabaseNotFound(database_id));
        }

        let id = TableId::new(self.allocate());
        self.tables
            .insert(id, Table::new(id, database_id, name.into(), order));

        Ok(id)
    }

    /// Order value for a new last table of `database_id`.
    #[must_use]
    pub fn next_table_order(&self, database_id: DatabaseId) -> u32 {
        self.tables
            .values()
            .filter(|table| table.database_id == database_id)
            .map(|table| table.order)
            .max()
            .map_or(1, |order| order.saturating_add(1))
    }

    #[must_use]
    pub fn workspace(&self, id: WorkspaceId) -> Option<&Workspace> {
        self.workspaces.get(&id)
    }

    #[must_use]
    pub fn database(&self, id: DatabaseId) -> Option<&Database> {
        self.databases.get(&id)
    }

    #[must_use]
    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.get(&id)
    }

    /// Tables of one database, by `order` then `id`.
    #[must_use]
    pub fn tables(&self, database_id: DatabaseId) -> Vec<&Table> {
        let mut tables: Vec<_> = self
            .tables
            .values()
            .filter(|table| table.database_id == database_id)
            .collect();
        tables.sort_by_key(|table| (table.order, table.id));

        tables
    }

    /// Remove a table together with its field metadata.
    pub fn delete_table(&mut self, id: TableId) -> Result<Table, CatalogError> {
        let table = self
            .tables
            .remove(&id)
            .ok_or(CatalogError::TableNotFound(id))?;
        self.field_tables.retain(|_, table_id| *table_id != id);

        Ok(table)
    }

    /// Structural parent of a node; workspaces have none.
    #[must_use]
    pub fn parent(&self, node: Node) -> Option<Node> {
        match node {
            Node::Workspace(_) => None,
            Node::Database(id) => self
                .databases
                .get(&id)
                .map(|database| Node::Workspace(database.workspace_id)),
            Node::Table(id) => self.tables.get(&id).map(Table::parent),
            Node::Row { table_id, .. } => self
                .tables
                .contains_key(&table_id)
                .then_some(Node::Table(table_id)),
        }
    }

    /// Workspace at the top of a node's hierarchy.
    #[must_use]
    pub fn root(&self, node: Node) -> Option<Node> {
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }

        matches!(current, Node::Workspace(id) if self.workspaces.contains_key(&id))
            .then_some(current)
    }

    // ------------------------------------------------------------------
    // Fields
    // ------------------------------------------------------------------

    /// Append a field to a table.
    pub fn add_field(
        &mut self,
        table_id: TableId,
        name: impl Into<String>,
        kind: FieldKind,
    ) -> Result<FieldId, CatalogError> {
        let name = name.into();
        let table = self.table_ref(table_id)?;
        if table.field_by_name(&name).is_some() {
            return Err(CatalogError::DuplicateFieldName {
                table: table_id,
                name,
            });
        }
        let order = table.next_field_order();

        let id = FieldId::new(self.allocate());
        let table = self.table_mut(table_id)?;
        table.insert_field(Field {
            id,
            table_id,
            name,
            order,
            primary: false,
            kind,
        });
        self.field_tables.insert(id, table_id);

        Ok(id)
    }

    /// Mark one field as the table's primary (display) field.
    pub fn set_primary(&mut self, field_id: FieldId) -> Result<(), CatalogError> {
        let table_id = self.field_table(field_id)?;
        for field in self.table_mut(table_id)?.fields_mut() {
            field.primary = field.id == field_id;
        }

        Ok(())
    }

    pub fn rename_field(
        &mut self,
        field_id: FieldId,
        name: impl Into<String>,
    ) -> Result<(), CatalogError> {
        let name = name.into();
        let table_id = self.field_table(field_id)?;
        let table = self.table_ref(table_id)?;
        if table
            .field_by_name(&name)
            .is_some_and(|other| other.id != field_id)
        {
            return Err(CatalogError::DuplicateFieldName {
                table: table_id,
                name,
            });
        }

        self.field_mut(field_id)?.name = name;

        Ok(())
    }

    /// Replace the type and configuration of a field.
    pub fn change_field_kind(
        &mut self,
        field_id: FieldId,
        kind: FieldKind,
    ) -> Result<(), CatalogError> {
        self.field_mut(field_id)?.kind = kind;

        Ok(())
    }

    pub fn remove_field(&mut self, field_id: FieldId) -> Result<Field, CatalogError> {
        let table_id = self.field_table(field_id)?;
        let field = self
            .table_mut(table_id)?
            .remove_field(field_id)
            .ok_or(CatalogError::FieldNotFound(field_id))?;
        self.field_tables.remove(&field_id);

        Ok(field)
    }

    #[must_use]
    pub fn field(&self, field_id: FieldId) -> Option<&Field> {
        let table_id = self.field_tables.get(&field_id)?;

        self.tables.get(table_id)?.field(field_id)
    }

    /// Append an option to a single or multiple select field.
    pub fn add_select_option(
        &mut self,
        field_id: FieldId,
        value: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<OptionId, CatalogError> {
        let id = OptionId::new(self.next_id.saturating_add(1));
        let field = self.field_mut(field_id)?;
        let options = match &mut field.kind {
            FieldKind::SingleSelect { options } | FieldKind::MultipleSelect { options } => options,
            _ => return Err(CatalogError::NotASelectField(field_id)),
        };
        options.push(SelectOption::new(id, value, color));
        self.next_id = id.get();

        Ok(id)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    const fn allocate(&mut self) -> u64 {
        self.next_id = self.next_id.saturating_add(1);
        self.next_id
    }

    fn field_table(&self, field_id: FieldId) -> Result<TableId, CatalogError> {
        self.field_tables
            .get(&field_id)
            .copied()
            .ok_or(CatalogError::FieldNotFound(field_id))
    }

    fn table_ref(&self, table_id: TableId) -> Result<&Table, CatalogError> {
        self.tables
            .get(&table_id)
            .ok_or(CatalogError::TableNotFound(table_id))
    }

    fn table_mut(&mut self, table_id: TableId) -> Result<&mut Table, CatalogError> {
        self.tables
            .get_mut(&table_id)
            .ok_or(CatalogError::TableNotFound(table_id))
    }

    fn field_mut(&mut self, field_id: FieldId) -> Result<&mut Field, CatalogError> {
        let table_id = self.field_table(field_id)?;

        self.table_mut(table_id)?
            .field_mut(field_id)
            .ok_or(CatalogError::FieldNotFound(field_id))
    }
}
