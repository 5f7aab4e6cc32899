//! Byte aggregator: folds per-chunk reports from every reader into one total.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::debug;

/// Cumulative byte total for a session.
///
/// Only the aggregator task writes it; the sampler reads it once per tick.
/// The total never decreases.
#[derive(Debug, Default)]
pub struct ByteCounter {
    total: AtomicU64,
}

impl ByteCounter {
    /// Creates a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bytes counted so far.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    fn add(&self, count: u64) {
        self.total.fetch_add(count, Ordering::SeqCst);
    }
}

/// Applies every report to `counter` until all senders are dropped.
///
/// Reports still queued when the readers stop are drained before this
/// returns, so the returned total is final.
pub async fn aggregate(mut reports: mpsc::Receiver<u64>, counter: &ByteCounter) -> u64 {
    let mut applied: u64 = 0;
    while let Some(count) = reports.recv().await {
        counter.add(count);
        applied += 1;
    }
    let total = counter.total();
    debug!(reports = applied, total, "byte aggregation finished");
    total
}
