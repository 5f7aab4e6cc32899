//! Measurement engine: runs one session across a fixed set of URLs.
//!
//! # Session anatomy
//!
//! - one worker task per URL, spawned into a [`JoinSet`], each looping over
//!   [`read_stream`] against its URL;
//! - the byte aggregator folding every worker's chunk reports into a
//!   [`ByteCounter`];
//! - the throughput sampler publishing a cumulative average each tick;
//! - the minimum and maximum timers;
//! - the [`ShutdownCoordinator`] that every one of them may trigger.
//!
//! The aggregator, sampler and timers are driven concurrently by the
//! `measure` future itself, and workers live in a `JoinSet`, so dropping an
//! in-progress `measure` future aborts the whole session.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::aggregator::{ByteCounter, aggregate};
use super::config::MeasureConfig;
use super::reader::{ReadOutcome, read_stream};
use super::sampler::{ThroughputSample, run_sampler};
use super::shutdown::{ShutdownCoordinator, StopReason};
use super::timeout::TimeoutController;
use crate::transport::{ByteSource, TransportError};

/// Error type for measurement sessions.
#[derive(Debug, thiserror::Error)]
pub enum MeasureError {
    /// The configuration violates an engine invariant.
    #[error("invalid measurement configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with it.
        reason: String,
    },

    /// `measure` was called without any URL.
    #[error("no download URLs to measure")]
    NoTargets,

    /// A worker failed to open or read its stream; the session was aborted.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A worker task panicked; the session was aborted.
    #[error("measurement worker panicked: {reason}")]
    WorkerPanicked {
        /// Panic description from the runtime.
        reason: String,
    },
}

impl MeasureError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// What a finished session measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureSummary {
    total_bytes: u64,
    last_sample: ThroughputSample,
    elapsed: Duration,
}

impl MeasureSummary {
    /// Bytes received across all workers, including those that arrived
    /// after the last tick.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Ticks the sampler computed.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.last_sample.second()
    }

    /// Wall time from session start to full stop.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// The sample computed at the last tick, the session's final estimate.
    #[must_use]
    pub fn estimate(&self) -> ThroughputSample {
        self.last_sample
    }

    /// Cumulative average at the last tick, in kilobits per second.
    ///
    /// Bytes counted after the last tick are not spread over a partial tick.
    #[must_use]
    pub fn kbps(&self) -> f64 {
        self.last_sample.kbps()
    }
}

/// Concurrent bandwidth measurement engine.
///
/// The engine is reusable: each [`measure`](Self::measure) call is an
/// independent session with its own counters, timers and channels.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use fast_core::measure::{MeasureConfig, MeasureEngine, ThroughputSample};
/// use fast_core::transport::HttpByteSource;
/// use tokio::sync::mpsc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = MeasureEngine::new(Arc::new(HttpByteSource::new()), MeasureConfig::default())?;
/// let (tx, mut rx) = mpsc::channel::<ThroughputSample>(8);
/// let printer = tokio::spawn(async move {
///     while let Some(sample) = rx.recv().await {
///         println!("{:.2} Kbps", sample.kbps());
///     }
/// });
/// let urls = vec!["https://example.com/speedtest".to_string()];
/// let summary = engine.measure(&urls, tx).await?;
/// printer.await?;
/// println!("final: {:.2} Kbps", summary.kbps());
/// # Ok(())
/// # }
/// ```
pub struct MeasureEngine {
    source: Arc<dyn ByteSource>,
    config: MeasureConfig,
}

impl std::fmt::Debug for MeasureEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasureEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MeasureEngine {
    /// Creates an engine over `source`.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::InvalidConfig`] if `config` fails validation.
    #[instrument(level = "debug", skip(source))]
    pub fn new(source: Arc<dyn ByteSource>, config: MeasureConfig) -> Result<Self, MeasureError> {
        config.validate()?;

        debug!(
            buffer_size = config.buffer_size(),
            min_ms = config.min_duration().as_millis(),
            max_ms = config.max_duration().as_millis(),
            "creating measurement engine"
        );

        Ok(Self { source, config })
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &MeasureConfig {
        &self.config
    }

    /// Measures download throughput across `urls`.
    ///
    /// Samples are published on `samples` once per tick. The engine takes
    /// ownership of the sender and drops it when the session stops, which is
    /// how the caller's receiver learns that measurement is over. The call
    /// returns only after every session task has finished.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::NoTargets`] for an empty URL list,
    /// [`MeasureError::Transport`] with the first worker failure, or
    /// [`MeasureError::WorkerPanicked`] if a worker task panicked. Stopping
    /// at either deadline is not an error.
    #[instrument(skip(self, urls, samples), fields(targets = urls.len()))]
    pub async fn measure(
        &self,
        urls: &[String],
        samples: mpsc::Sender<ThroughputSample>,
    ) -> Result<MeasureSummary, MeasureError> {
        if urls.is_empty() {
            return Err(MeasureError::NoTargets);
        }

        info!("starting measurement");

        let start = Instant::now();
        let shutdown = Arc::new(ShutdownCoordinator::new(CancellationToken::new(), samples));
        let timeouts = Arc::new(TimeoutController::new());
        let counter = ByteCounter::new();
        let (report_tx, report_rx) = mpsc::channel(self.config.report_capacity());

        let mut workers = JoinSet::new();
        for (index, url) in urls.iter().enumerate() {
            let worker = Worker {
                index,
                url: url.clone(),
                source: Arc::clone(&self.source),
                buffer_size: self.config.buffer_size(),
                reports: report_tx.clone(),
                timeouts: Arc::clone(&timeouts),
                shutdown: Arc::clone(&shutdown),
            };
            workers.spawn(worker.run());
        }
        // Workers hold the only remaining senders; aggregation ends with them.
        drop(report_tx);

        let (failure, total_bytes, last_sample, (), ()) = tokio::join!(
            supervise(workers, &shutdown),
            aggregate(report_rx, &counter),
            run_sampler(start, self.config.tick(), &counter, &shutdown),
            timeouts.run_minimum(start + self.config.min_duration(), &shutdown),
            timeouts.run_maximum(start + self.config.max_duration(), &shutdown),
        );

        let summary = MeasureSummary {
            total_bytes,
            last_sample,
            elapsed: start.elapsed(),
        };

        if let Some(error) = failure {
            warn!(error = %error, total_bytes, "measurement aborted");
            return Err(error);
        }

        info!(
            total_bytes,
            ticks = last_sample.second(),
            kbps = summary.kbps(),
            elapsed_ms = summary.elapsed.as_millis(),
            "measurement complete"
        );
        Ok(summary)
    }
}

/// Waits for every worker and keeps the first failure.
///
/// A panicked worker never reaches its own stop call, so the supervisor
/// stops the session on its behalf.
async fn supervise(
    mut workers: JoinSet<Result<(), TransportError>>,
    shutdown: &ShutdownCoordinator,
) -> Option<MeasureError> {
    let mut failure: Option<MeasureError> = None;

    while let Some(joined) = workers.join_next().await {
        let error = match joined {
            Ok(Ok(())) => continue,
            Ok(Err(e)) => MeasureError::from(e),
            Err(join_error) => {
                shutdown.stop(StopReason::WorkerFailed).await;
                MeasureError::WorkerPanicked {
                    reason: join_error.to_string(),
                }
            }
        };

        if failure.is_none() {
            failure = Some(error);
        } else {
            debug!(error = %error, "additional worker failure ignored");
        }
    }

    failure
}

/// One persistent download loop for a single URL.
struct Worker {
    index: usize,
    url: String,
    source: Arc<dyn ByteSource>,
    buffer_size: usize,
    reports: mpsc::Sender<u64>,
    timeouts: Arc<TimeoutController>,
    shutdown: Arc<ShutdownCoordinator>,
}

impl Worker {
    /// Re-reads the URL until the minimum window has passed, the session is
    /// cancelled, or a transport error occurs; then stops the session.
    #[instrument(level = "debug", skip(self), fields(worker = self.index, url = %self.url))]
    async fn run(self) -> Result<(), TransportError> {
        let cancel = self.shutdown.token().clone();
        let mut passes: u32 = 0;

        let result = loop {
            passes += 1;
            match read_stream(
                self.source.as_ref(),
                &self.url,
                self.buffer_size,
                &self.reports,
                &cancel,
            )
            .await
            {
                Err(e) => {
                    warn!(error = %e, passes, "download failed");
                    break Err(e);
                }
                Ok(ReadOutcome::Cancelled) => break Ok(()),
                Ok(ReadOutcome::EndOfStream) => {
                    if self.timeouts.minimum_reached() {
                        break Ok(());
                    }
                    debug!(passes, "stream ended before minimum window, reopening");
                }
            }
        };

        debug!(passes, "worker finished");
        let reason = if result.is_ok() {
            StopReason::WorkerFinished
        } else {
            StopReason::WorkerFailed
        };
        // Release the report sender before waiting on the output lock.
        drop(self.reports);
        self.shutdown.stop(reason).await;
        result
    }
}
