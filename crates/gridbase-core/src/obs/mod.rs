//! Observability: runtime counters and the sink abstraction events flow
//! through.

pub(crate) mod metrics;
pub(crate) mod sink;


// re-exports
pub use metrics::{EventOps, EventReport, EventState, TableCounters};
pub use sink::{
    MetricsEvent, MetricsSink, WriteKind, metrics_report, metrics_reset, with_metrics_sink,
};
