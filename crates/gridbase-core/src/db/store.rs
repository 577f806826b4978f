//! Module: db::store
//! Responsibility: in-memory row storage keyed by table and row id.
//! Does not own: value validation, formula computation, or query semantics.
//! Boundary: the row access layer validates and computes before it writes;
//! every write replaces whole rows so readers never observe partial state.

use crate::{
    db::RowError,
    types::{FieldId, RowId, TableId},
    value::Value,
};
use rust_decimal::Decimal;
use std::{
    collections::BTreeMap,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use time::OffsetDateTime;

///
/// StoredRow
///
/// One persisted row. Cells absent from `cells` read as their column
/// default; that is how rows survive fields added after they were written.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoredRow {
    pub id: RowId,
    pub order: Decimal,
    pub created_on: OffsetDateTime,
    pub updated_on: OffsetDateTime,
    pub cells: BTreeMap<FieldId, Value>,
}

impl StoredRow {
    #[must_use]
    pub fn cell(&self, field: FieldId) -> Option<&Value> {
        self.cells.get(&field)
    }
}

///
/// TableData
///

#[derive(Debug, Default)]
pub(crate) struct TableData {
    last_id: u64,
    rows: BTreeMap<RowId, StoredRow>,
}

impl TableData {
    /// Allocate the next row id. Ids are never reused within a table.
    pub(crate) const fn allocate(&mut self) -> RowId {
        self.last_id += 1;

        RowId::new(self.last_id)
    }

    pub(crate) fn get(&self, id: RowId) -> Option<&StoredRow> {
        self.rows.get(&id)
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = &StoredRow> {
        self.rows.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    /// Order value for a row appended at the end of the table.
    pub(crate) fn next_order(&self) -> Decimal {
        self.rows
            .values()
            .map(|row| row.order)
            .max()
            .map_or(Decimal::ONE, |max| max + Decimal::ONE)
    }

    pub(crate) fn put(&mut self, row: StoredRow) {
        self.rows.insert(row.id, row);
    }

    pub(crate) fn remove(&mut self, id: RowId) -> Option<StoredRow> {
        self.rows.remove(&id)
    }
}

///
/// MemoryStore
///
/// Row storage shared by every schema composed over the same tables.
///

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<BTreeMap<TableId, TableData>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against one table's rows under the shared read lock.
    ///
    /// A poisoned lock is recovered: writers only ever swap in complete
    /// rows, so the data behind it is consistent.
    pub(crate) fn read<R>(&self, table: TableId, f: impl FnOnce(Option<&TableData>) -> R) -> R {
        let tables: RwLockReadGuard<'_, _> =
            self.tables.read().unwrap_or_else(PoisonError::into_inner);

        f(tables.get(&table))
    }

    /// Run `f` against one table's rows under the exclusive write lock.
    pub(crate) fn write<R>(
        &self,
        table: TableId,
        f: impl FnOnce(&mut TableData) -> Result<R, RowError>,
    ) -> Result<R, RowError> {
        let mut tables: RwLockWriteGuard<'_, _> = self
            .tables
            .write()
            .map_err(|_| RowError::Store("row store lock poisoned".to_string()))?;

        f(tables.entry(table).or_default())
    }

    /// Number of rows currently stored for `table`.
    #[must_use]
    pub fn row_count(&self, table: TableId) -> usize {
        self.read(table, |data| data.map_or(0, TableData::len))
    }

    /// Drop every row of `table`; returns how many were removed.
    pub fn drop_table(&self, table: TableId) -> Result<usize, RowError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| RowError::Store("row store lock poisoned".to_string()))?;

        Ok(tables.remove(&table).map_or(0, |data| data.len()))
    }
}
