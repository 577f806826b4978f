//! Module: db::access
//! Responsibility: row create, read, update, delete, and reconciliation
//! through one composed schema, including computed-field hooks.
//! Does not own: query composition (`db::query`) or storage layout.
//! Boundary: every write validates all cells before touching storage and
//! swaps in a complete row under the store's write lock.

use crate::{
    db::{
        Db, Query, Record, RowError, RowInput,
        hooks::{self, Refresh},
        row::CellKey,
        store::StoredRow,
    },
    obs::{MetricsEvent, WriteKind, sink},
    schema::Schema,
    types::{FieldId, RowId},
    value::Value,
};
use log::debug;
use std::collections::BTreeMap;

///
/// RowAccess
///

#[derive(Clone, Copy)]
pub struct RowAccess<'s> {
    db: &'s Db,
    schema: &'s Schema,
}

impl<'s> RowAccess<'s> {
    pub(crate) const fn new(db: &'s Db, schema: &'s Schema) -> Self {
        Self { db, schema }
    }

    #[must_use]
    pub const fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Insert a new row. Omitted cells take their column defaults; computed
    /// cells are evaluated once the row id is known.
    ///
    /// Defaults and computed cells cover every field of the table, including
    /// fields this schema does not expose.
    pub fn create(&self, input: RowInput) -> Result<Record<'s>, RowError> {
        let cells = self.resolve_input(input.cells)?;
        let now = self.db.clock().now();
        let schema = self.schema;
        let full = schema.table_schema();

        let (row, computed) = self.db.store().write(schema.table_id(), |data| {
            let id = data.allocate();
            let order = input.order.unwrap_or_else(|| data.next_order());

            let mut row = StoredRow {
                id,
                order,
                created_on: now,
                updated_on: now,
                cells: BTreeMap::new(),
            };
            for column in full.columns() {
                if !column.field_type().read_only() {
                    row.cells.insert(column.id(), column.spec.default.clone());
                }
            }
            row.cells.extend(cells);

            let computed = hooks::compute(full, id, &mut row.cells, Refresh::All);
            data.put(row.clone());

            Ok((row, computed))
        })?;

        debug!("created row {} in table {}", row.id, schema.table_id());
        sink::record(MetricsEvent::RowWrite {
            table: schema.table_id(),
            kind: WriteKind::Create,
            computed_fields: computed,
        });

        Ok(Record::new(schema, row))
    }

    pub fn get(&self, id: RowId) -> Result<Record<'s>, RowError> {
        let table = self.schema.table_id();
        let row = self
            .db
            .store()
            .read(table, |data| data.and_then(|data| data.get(id)).cloned())
            .ok_or(RowError::RowDoesNotExist { table, row: id })?;

        Ok(Record::new(self.schema, row))
    }

    /// Apply cell changes to an existing row and refresh computed cells.
    pub fn update(&self, id: RowId, input: RowInput) -> Result<Record<'s>, RowError> {
        let cells = self.resolve_input(input.cells)?;
        let now = self.db.clock().now();
        let schema = self.schema;
        let full = schema.table_schema();
        let table = schema.table_id();

        let (row, computed) = self.db.store().write(table, |data| {
            let mut row = data
                .get(id)
                .cloned()
                .ok_or(RowError::RowDoesNotExist { table, row: id })?;

            row.cells.extend(cells);
            if let Some(order) = input.order {
                row.order = order;
            }
            row.updated_on = now;

            let computed = hooks::compute(full, id, &mut row.cells, Refresh::AfterUpdate);
            data.put(row.clone());

            Ok((row, computed))
        })?;

        debug!("updated row {id} in table {table}");
        sink::record(MetricsEvent::RowWrite {
            table,
            kind: WriteKind::Update,
            computed_fields: computed,
        });

        Ok(Record::new(schema, row))
    }

    /// Update the row behind a record read earlier.
    pub fn update_record(
        &self,
        record: &Record<'_>,
        input: RowInput,
    ) -> Result<Record<'s>, RowError> {
        let expected = self.schema.table_id();
        let found = record.schema().table_id();
        if expected != found {
            return Err(RowError::TableMismatch { expected, found });
        }

        self.update(record.id(), input)
    }

    pub fn delete(&self, id: RowId) -> Result<(), RowError> {
        let table = self.schema.table_id();

        self.db.store().write(table, |data| {
            data.remove(id)
                .map(|_| ())
                .ok_or(RowError::RowDoesNotExist { table, row: id })
        })?;

        debug!("deleted row {id} in table {table}");
        sink::record(MetricsEvent::RowWrite {
            table,
            kind: WriteKind::Delete,
            computed_fields: 0,
        });

        Ok(())
    }

    /// Every row in default order.
    #[must_use]
    pub fn all(&self) -> Vec<Record<'s>> {
        self.query().execute().into_records()
    }

    #[must_use]
    pub fn query(&self) -> Query<'s> {
        self.db.query(self.schema)
    }

    /// Bring stored rows in line with the current fields: drop cells of
    /// removed fields and recompute every computed cell. Returns how many
    /// rows changed.
    pub fn reconcile(&self) -> Result<usize, RowError> {
        let full = self.schema.table_schema();
        let table = full.table_id();

        let computed = self.db.store().write(table, |data| {
            let mut changed = Vec::new();
            for row in data.rows() {
                let mut next = row.clone();
                next.cells.retain(|id, _| full.is_table_field(*id));
                let computed = hooks::compute(full, row.id, &mut next.cells, Refresh::All);
                if next != *row {
                    changed.push((next, computed));
                }
            }

            Ok(changed
                .into_iter()
                .map(|(row, computed)| {
                    data.put(row);
                    computed
                })
                .collect::<Vec<_>>())
        })?;

        // Sinks run after the write lock is released.
        for computed_fields in &computed {
            sink::record(MetricsEvent::RowWrite {
                table,
                kind: WriteKind::Reconcile,
                computed_fields: *computed_fields,
            });
        }
        debug!("reconciled {} rows in table {table}", computed.len());

        Ok(computed.len())
    }

    /// Stable names of computed fields that must be evaluated again once a
    /// new row exists, because they read the row's own id.
    #[must_use]
    pub fn fields_requiring_refresh_after_insert(&self) -> Vec<String> {
        self.schema
            .columns()
            .iter()
            .filter(|column| column.field_type().refresh_after_insert(&column.field))
            .map(|column| column.stable_name.clone())
            .collect()
    }

    /// Stable names of computed fields re-evaluated on every update.
    #[must_use]
    pub fn fields_requiring_refresh_after_update(&self) -> Vec<String> {
        self.schema
            .columns()
            .iter()
            .filter(|column| column.field_type().refresh_after_update(&column.field))
            .map(|column| column.stable_name.clone())
            .collect()
    }

    // Resolve, reject computed columns, and normalize every cell before any
    // storage is touched.
    fn resolve_input(
        &self,
        input: Vec<(CellKey, Value)>,
    ) -> Result<Vec<(FieldId, Value)>, RowError> {
        input
            .into_iter()
            .map(|(key, value)| {
                let column = match &key {
                    CellKey::Name(name) => self.schema.resolve(name),
                    CellKey::Field(id) => self.schema.column(*id),
                }
                .ok_or_else(|| RowError::UnknownField {
                    name: key.to_string(),
                })?;

                let field_type = column.field_type();
                if field_type.read_only() {
                    return Err(RowError::ReadOnlyField {
                        field: key.to_string(),
                    });
                }

                let value = field_type
                    .normalize(&column.field, value)
                    .map_err(|reason| RowError::InvalidValue {
                        field: key.to_string(),
                        reason,
                    })?;

                Ok((column.id(), value))
            })
            .collect()
    }
}
