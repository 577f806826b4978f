//! Metrics sink boundary.
//!
//! Engine code never touches `obs::metrics` directly. All instrumentation
//! flows through `MetricsEvent` and `MetricsSink`; sinks observe, they never
//! influence query or write results.

use crate::{obs::metrics, types::TableId};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// WriteKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WriteKind {
    Create,
    Update,
    Delete,
    Reconcile,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    QueryStart {
        table: TableId,
    },
    QueryFinish {
        table: TableId,
        rows_scanned: u64,
        rows_matched: u64,
    },
    RowWrite {
        table: TableId,
        kind: WriteKind,
        computed_fields: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default process-local sink that writes into the metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::QueryStart { table } => metrics::with_state_mut(|m| {
                m.ops.queries = m.ops.queries.saturating_add(1);
                let entry = m.tables.entry(table).or_default();
                entry.queries = entry.queries.saturating_add(1);
            }),

            MetricsEvent::QueryFinish {
                table,
                rows_scanned,
                rows_matched,
            } => metrics::with_state_mut(|m| {
                m.ops.rows_scanned = m.ops.rows_scanned.saturating_add(rows_scanned);
                m.ops.rows_matched = m.ops.rows_matched.saturating_add(rows_matched);
                let entry = m.tables.entry(table).or_default();
                entry.rows_scanned = entry.rows_scanned.saturating_add(rows_scanned);
                entry.rows_matched = entry.rows_matched.saturating_add(rows_matched);
            }),

            MetricsEvent::RowWrite {
                table,
                kind,
                computed_fields,
            } => metrics::with_state_mut(|m| {
                let counter = match kind {
                    WriteKind::Create => &mut m.ops.rows_created,
                    WriteKind::Update => &mut m.ops.rows_updated,
                    WriteKind::Delete => &mut m.ops.rows_deleted,
                    WriteKind::Reconcile => &mut m.ops.rows_reconciled,
                };
                *counter = counter.saturating_add(1);
                m.ops.computed_fields = m.ops.computed_fields.saturating_add(computed_fields);

                let entry = m.tables.entry(table).or_default();
                entry.rows_written = entry.rows_written.saturating_add(1);
            }),
        }
    }
}

pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GlobalMetricsSink.record(event),
    }
}

/// Snapshot the current metrics state.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset() {
    metrics::reset();
}

/// Run a closure with a temporary metrics sink override on this thread.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let previous = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = previous;
            });
        }
    }

    let previous = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(previous);

    f()
}
