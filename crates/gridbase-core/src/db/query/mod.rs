//! Module: db::query
//! Responsibility: the query builder: search, filter objects, order strings,
//! and execution into responses and pages.
//! Does not own: predicate evaluation semantics or row storage.
//! Boundary: every caller input is resolved against the schema while the
//! query is built; execution never fails.

mod error;
pub mod filter;
pub mod order;
mod search;


use crate::{
    db::{
        Db, Page, Record, Response,
        predicate::{Predicate, fingerprint},
        store::StoredRow,
    },
    obs::{MetricsEvent, sink},
    schema::Schema,
    types::FieldId,
    value::SortKey,
};
use log::debug;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

// re-exports
pub use error::{QueryError, QueryErrorKind};
pub use filter::{FilterObject, FilterScalar, FilterType, FilterValue};
pub use order::{OrderSpec, OrderTerm};

///
/// Query
///
/// Row query over one schema. Restrictions combine with AND in the order
/// they are added; the last ordering set wins.
///

#[derive(Clone, Debug)]
pub struct Query<'s> {
    db: &'s Db,
    schema: &'s Schema,
    predicate: Predicate,
    order: Option<OrderSpec>,
    only: Option<BTreeSet<FieldId>>,
}

impl<'s> Query<'s> {
    pub(crate) const fn new(db: &'s Db, schema: &'s Schema) -> Self {
        Self {
            db,
            schema,
            predicate: Predicate::True,
            order: None,
            only: None,
        }
    }

    /// Restrict to rows whose searchable cells contain `text`
    /// (case-insensitive), or whose id is exactly `text`.
    #[must_use]
    pub fn search(mut self, text: &str) -> Self {
        let search = search::build(self.schema, text, self.db.config().search.match_row_id);
        self.predicate = self.predicate.and(search);
        self
    }

    /// Add a hand-built restriction.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = self.predicate.and(predicate);
        self
    }

    /// Limit which fields later filter and order calls may reference.
    #[must_use]
    pub fn only_field_ids(mut self, ids: impl IntoIterator<Item = FieldId>) -> Self {
        self.only = Some(ids.into_iter().collect());
        self
    }

    /// Add the restriction described by a filter object. `filter_type` is
    /// `AND` or `OR` and decides how separate keys combine.
    pub fn filter_by_fields_object(
        mut self,
        filters: &FilterObject,
        filter_type: &str,
    ) -> Result<Self, QueryError> {
        let predicate = filter::build(self.schema, filters, filter_type, self.only.as_ref())?;
        debug!(
            "filter on table {}: {} keys, filter_type={filter_type}",
            self.schema.table_id(),
            filters.len()
        );

        self.predicate = self.predicate.and(predicate);
        Ok(self)
    }

    /// Order by a comma-separated list of field references.
    pub fn order_by_fields_string(mut self, order: &str) -> Result<Self, QueryError> {
        let spec = OrderSpec::parse(self.schema, order, self.only.as_ref())?;
        debug!("order on table {}: '{order}'", self.schema.table_id());

        self.order = Some(spec);
        Ok(self)
    }

    #[must_use]
    pub const fn schema(&self) -> &'s Schema {
        self.schema
    }

    #[must_use]
    pub const fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    #[must_use]
    pub const fn order(&self) -> Option<&OrderSpec> {
        self.order.as_ref()
    }

    /// Stable hex digest of table, predicate, and ordering; identical inputs
    /// over the same schema always yield the same digest.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.schema.table_id().get().to_be_bytes());
        fingerprint::hash_predicate(&mut hasher, &self.predicate);
        match &self.order {
            Some(order) => order.hash(&mut hasher),
            None => fingerprint::write_tag(&mut hasher, 0x70),
        }

        fingerprint::to_hex(&hasher.finalize())
    }

    /// Every matching row in query order.
    #[must_use]
    pub fn execute(&self) -> Response<'s> {
        let rows = self.matching_rows();

        Response::new(
            self.schema.table_id(),
            rows.into_iter()
                .map(|row| Record::new(self.schema, row))
                .collect(),
        )
    }

    /// One window of the result. `limit` defaults to the configured page
    /// size and is clamped to `1..=max_page_size`.
    #[must_use]
    pub fn page(&self, offset: usize, limit: Option<u32>) -> Page<'s> {
        let config = self.db.config().query;
        let limit = limit
            .unwrap_or(config.default_page_size)
            .clamp(1, config.max_page_size);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        let rows = self.matching_rows();
        let total = rows.len();
        let records = rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| Record::new(self.schema, row))
            .collect();

        Page {
            response: Response::new(self.schema.table_id(), records),
            offset,
            limit,
            total,
        }
    }

    /// Number of matching rows.
    #[must_use]
    pub fn count(&self) -> usize {
        let table = self.schema.table_id();

        self.db.store().read(table, |data| {
            data.map_or(0, |data| {
                data.rows()
                    .filter(|row| self.predicate.eval(self.schema, row))
                    .count()
            })
        })
    }

    // Scan, restrict, and sort under one read lock.
    fn matching_rows(&self) -> Vec<StoredRow> {
        let table = self.schema.table_id();
        sink::record(MetricsEvent::QueryStart { table });

        let (scanned, mut rows) = self.db.store().read(table, |data| {
            let Some(data) = data else {
                return (0, Vec::new());
            };
            let rows: Vec<StoredRow> = data
                .rows()
                .filter(|row| self.predicate.eval(self.schema, row))
                .cloned()
                .collect();

            (data.len(), rows)
        });

        match &self.order {
            Some(order) => {
                let mut keyed: Vec<(Vec<SortKey>, StoredRow)> = rows
                    .into_iter()
                    .map(|row| (order.keys(self.schema, &row), row))
                    .collect();
                keyed.sort_by(|(left_keys, left), (right_keys, right)| {
                    order
                        .compare(left_keys, right_keys)
                        .then_with(|| order::compare_default(left, right))
                });
                rows = keyed.into_iter().map(|(_, row)| row).collect();
            }
            None => rows.sort_by(order::compare_default),
        }

        debug!(
            "query on table {table} matched {} of {scanned} rows",
            rows.len()
        );
        sink::record(MetricsEvent::QueryFinish {
            table,
            rows_scanned: u64::try_from(scanned).unwrap_or(u64::MAX),
            rows_matched: u64::try_from(rows.len()).unwrap_or(u64::MAX),
        });

        rows
    }
}
