//! Throughput sampler: one cumulative-average sample per tick.

use std::time::Duration;

use serde::Serialize;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

use super::aggregator::ByteCounter;
use super::shutdown::{Publish, ShutdownCoordinator};

/// One throughput estimate.
///
/// `kbps` is the cumulative average since the session started
/// (`total bytes * 8 / 1000 / second`), not the rate of the last tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThroughputSample {
    second: u64,
    kbps: f64,
}

impl ThroughputSample {
    /// Builds the sample for tick `second` given the bytes counted so far.
    #[must_use]
    pub fn from_total(second: u64, total_bytes: u64) -> Self {
        Self {
            second,
            kbps: cumulative_kbps(total_bytes, second),
        }
    }

    /// Tick index, starting at 1.
    #[must_use]
    pub fn second(&self) -> u64 {
        self.second
    }

    /// Kilobits per second.
    #[must_use]
    pub fn kbps(&self) -> f64 {
        self.kbps
    }

    /// Megabits per second.
    #[must_use]
    pub fn mbps(&self) -> f64 {
        self.kbps / 1000.0
    }
}

/// Average rate in kilobits per second over `ticks` elapsed ticks.
///
/// Zero ticks yields zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn cumulative_kbps(total_bytes: u64, ticks: u64) -> f64 {
    if ticks == 0 {
        return 0.0;
    }
    total_bytes as f64 / ticks as f64 * 8.0 / 1000.0
}

/// Samples `counter` every `tick` from `start` until the session stops.
///
/// Returns the last sample computed (tick 0 with zero throughput when the
/// session stopped before the first tick), whether or not it was published. Ticks missed while a
/// publish was blocked by a slow consumer are skipped, never replayed, so
/// sample indices stay strictly increasing without duplicates.
pub async fn run_sampler(
    start: Instant,
    tick: Duration,
    counter: &ByteCounter,
    shutdown: &ShutdownCoordinator,
) -> ThroughputSample {
    let mut ticker = tokio::time::interval_at(start + tick, tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let cancel = shutdown.token();
    let mut second: u64 = 0;
    let mut last = ThroughputSample::from_total(0, 0);
    let mut consumer_gone = false;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        second += 1;
        let sample = ThroughputSample::from_total(second, counter.total());
        trace!(second, kbps = sample.kbps(), "throughput sample");
        last = sample;

        if consumer_gone {
            continue;
        }
        match shutdown.publish(sample).await {
            Publish::Sent => {}
            Publish::Stopped => break,
            Publish::ConsumerGone => {
                debug!(second, "sample receiver dropped, sampling continues unpublished");
                consumer_gone = true;
            }
        }
    }

    debug!(ticks = second, "sampler stopped");
    last
}
