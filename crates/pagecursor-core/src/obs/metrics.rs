use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

///
/// CursorCounters
/// Process-wide monotonic counters; reads and writes are relaxed.
///

pub(crate) struct CursorCounters {
    pub(crate) prev_cursors_minted: AtomicU64,
    pub(crate) next_cursors_minted: AtomicU64,
    pub(crate) cursors_verified: AtomicU64,
    pub(crate) signature_rejections: AtomicU64,
    pub(crate) malformed_rejections: AtomicU64,
    pub(crate) first_pages: AtomicU64,
    pub(crate) forward_pages: AtomicU64,
    pub(crate) backward_pages: AtomicU64,
    pub(crate) pages_at_end: AtomicU64,
    pub(crate) records_paged: AtomicU64,
}

static COUNTERS: CursorCounters = CursorCounters {
    prev_cursors_minted: AtomicU64::new(0),
    next_cursors_minted: AtomicU64::new(0),
    cursors_verified: AtomicU64::new(0),
    signature_rejections: AtomicU64::new(0),
    malformed_rejections: AtomicU64::new(0),
    first_pages: AtomicU64::new(0),
    forward_pages: AtomicU64::new(0),
    backward_pages: AtomicU64::new(0),
    pages_at_end: AtomicU64::new(0),
    records_paged: AtomicU64::new(0),
};

pub(crate) fn counters() -> &'static CursorCounters {
    &COUNTERS
}

pub(crate) fn bump(counter: &AtomicU64, delta: u64) {
    counter.fetch_add(delta, Ordering::Relaxed);
}

///
/// CursorMetricsReport
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct CursorMetricsReport {
    pub prev_cursors_minted: u64,
    pub next_cursors_minted: u64,
    pub cursors_verified: u64,
    pub signature_rejections: u64,
    pub malformed_rejections: u64,
    pub first_pages: u64,
    pub forward_pages: u64,
    pub backward_pages: u64,
    pub pages_at_end: u64,
    pub records_paged: u64,
}

pub(crate) fn report() -> CursorMetricsReport {
    let c = &COUNTERS;
    let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);

    CursorMetricsReport {
        prev_cursors_minted: load(&c.prev_cursors_minted),
        next_cursors_minted: load(&c.next_cursors_minted),
        cursors_verified: load(&c.cursors_verified),
        signature_rejections: load(&c.signature_rejections),
        malformed_rejections: load(&c.malformed_rejections),
        first_pages: load(&c.first_pages),
        forward_pages: load(&c.forward_pages),
        backward_pages: load(&c.backward_pages),
        pages_at_end: load(&c.pages_at_end),
        records_paged: load(&c.records_paged),
    }
}

pub(crate) fn reset() {
    let c = &COUNTERS;
    for counter in [
        &c.prev_cursors_minted,
        &c.next_cursors_minted,
        &c.cursors_verified,
        &c.signature_rejections,
        &c.malformed_rejections,
        &c.first_pages,
        &c.forward_pages,
        &c.backward_pages,
        &c.pages_at_end,
        &c.records_paged,
    ] {
        counter.store(0, Ordering::Relaxed);
    }
}
