//! Observability: cursor counters and sink abstractions.
//!
//! Logging goes through `tracing`; counters go through the sink so tests
//! can capture events without touching global state.

pub(crate) mod metrics;
pub(crate) mod sink;


// re-exports
pub use metrics::CursorMetricsReport;
pub use sink::{
    CursorEvent, CursorKind, MetricsSink, metrics_report, metrics_reset, with_metrics_sink,
};
