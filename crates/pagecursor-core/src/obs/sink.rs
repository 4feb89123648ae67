//! Metrics sink boundary.
//!
//! Codec and assembler code MUST NOT touch `obs::metrics` directly.
//! All instrumentation flows through `CursorEvent` and `MetricsSink`.

use crate::{error::ErrorClass, obs::metrics, query::PageDirection};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// CursorKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CursorKind {
    Prev,
    Next,
}

///
/// CursorEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CursorEvent {
    CursorMinted {
        kind: CursorKind,
    },
    CursorVerified,
    CursorRejected {
        class: ErrorClass,
    },
    PageAssembled {
        direction: PageDirection,
        records: u64,
        reached_end: bool,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: CursorEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into the process-wide counters.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: CursorEvent) {
        let counters = metrics::counters();

        match event {
            CursorEvent::CursorMinted { kind } => match kind {
                CursorKind::Prev => metrics::bump(&counters.prev_cursors_minted, 1),
                CursorKind::Next => metrics::bump(&counters.next_cursors_minted, 1),
            },

            CursorEvent::CursorVerified => metrics::bump(&counters.cursors_verified, 1),

            CursorEvent::CursorRejected { class } => match class {
                ErrorClass::CursorSignature => {
                    metrics::bump(&counters.signature_rejections, 1);
                }
                _ => metrics::bump(&counters.malformed_rejections, 1),
            },

            CursorEvent::PageAssembled {
                direction,
                records,
                reached_end,
            } => {
                match direction {
                    PageDirection::First => metrics::bump(&counters.first_pages, 1),
                    PageDirection::Forward => metrics::bump(&counters.forward_pages, 1),
                    PageDirection::Backward => metrics::bump(&counters.backward_pages, 1),
                }
                metrics::bump(&counters.records_paged, records);
                if reached_end {
                    metrics::bump(&counters.pages_at_end, 1);
                }
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: CursorEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the process-wide counters.
#[must_use]
pub fn metrics_report() -> metrics::CursorMetricsReport {
    metrics::report()
}

/// Zero the process-wide counters.
pub fn metrics_reset() {
    metrics::reset();
}

/// Run a closure with a temporary metrics sink override on this thread.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}
