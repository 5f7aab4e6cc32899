//! Concurrent download-throughput measurement.
//!
//! This module is the heart of the crate: it streams bytes from several URLs
//! at once, folds every chunk into one running total, and reports a
//! cumulative average throughput once per tick until the session ends.
//!
//! # Features
//!
//! - One persistent worker per URL, reopening streams that end early
//! - Minimum window (workers may stop) and maximum window (session must stop)
//! - Fine-grained, cancellable reads (512-byte chunks by default)
//! - A single idempotent shutdown that closes the output channel exactly once
//! - Any transport error aborts the whole session and is returned to the caller
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use fast_core::measure::{MeasureConfig, MeasureEngine, ThroughputSample};
//! use fast_core::transport::HttpByteSource;
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MeasureConfig::new()
//!     .with_min_duration(Duration::from_secs(5))
//!     .with_max_duration(Duration::from_secs(15));
//! let engine = MeasureEngine::new(Arc::new(HttpByteSource::new()), config)?;
//!
//! let (tx, mut rx) = mpsc::channel::<ThroughputSample>(8);
//! tokio::spawn(async move {
//!     while let Some(sample) = rx.recv().await {
//!         println!("{:.2} Kbps {:.2} Mbps", sample.kbps(), sample.mbps());
//!     }
//! });
//!
//! let urls = vec!["https://example.com/a".to_string(), "https://example.com/b".to_string()];
//! engine.measure(&urls, tx).await?;
//! # Ok(())
//! # }
//! ```

mod aggregator;
mod config;
pub mod constants;
mod engine;
mod reader;
mod sampler;
mod shutdown;
mod timeout;

pub use aggregator::{ByteCounter, aggregate};
pub use config::MeasureConfig;
pub use engine::{MeasureEngine, MeasureError, MeasureSummary};
pub use reader::{ReadOutcome, read_stream};
pub use sampler::{ThroughputSample, cumulative_kbps, run_sampler};
pub use shutdown::{Publish, ShutdownCoordinator, StopReason};
pub use timeout::TimeoutController;

// Note: no module-local Result alias. Use `Result<T, MeasureError>` explicitly.
