//! Constants for the measurement module (buffer size, timeouts, cadence).

use std::time::Duration;

/// Read-chunk buffer size in bytes. Small enough to keep reporting granular.
pub const BUFFER_SIZE: usize = 512;

/// Default minimum measurement duration (10 seconds).
pub const MIN_DURATION: Duration = Duration::from_secs(10);

/// Default maximum measurement duration (30 seconds).
pub const MAX_DURATION: Duration = Duration::from_secs(30);

/// Throughput sampling cadence.
pub const TICK: Duration = Duration::from_secs(1);

/// Byte reports that may queue up before readers wait on the aggregator.
pub const REPORT_CAPACITY: usize = 256;

/// Default HTTP connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default idle time allowed between two body chunks (30 seconds).
pub const READ_TIMEOUT_SECS: u64 = 30;
