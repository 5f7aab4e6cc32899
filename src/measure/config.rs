//! Session configuration.

use std::time::Duration;

use super::constants::{BUFFER_SIZE, MAX_DURATION, MIN_DURATION, REPORT_CAPACITY, TICK};
use super::engine::MeasureError;

/// Tunables for one measurement session.
///
/// Defaults reproduce the classic fast.com client: 512-byte reads, a
/// 10 second minimum window, a 30 second hard stop and one sample per second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureConfig {
    buffer_size: usize,
    min_duration: Duration,
    max_duration: Duration,
    tick: Duration,
    report_capacity: usize,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            buffer_size: BUFFER_SIZE,
            min_duration: MIN_DURATION,
            max_duration: MAX_DURATION,
            tick: TICK,
            report_capacity: REPORT_CAPACITY,
        }
    }
}

impl MeasureConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the read-chunk buffer size in bytes.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Sets the minimum window after which workers stop restarting streams.
    #[must_use]
    pub fn with_min_duration(mut self, min_duration: Duration) -> Self {
        self.min_duration = min_duration;
        self
    }

    /// Sets the hard deadline that ends the session.
    #[must_use]
    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = max_duration;
        self
    }

    /// Sets the sampling cadence.
    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Sets how many byte reports may be queued for the aggregator.
    #[must_use]
    pub fn with_report_capacity(mut self, report_capacity: usize) -> Self {
        self.report_capacity = report_capacity;
        self
    }

    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    #[must_use]
    pub fn min_duration(&self) -> Duration {
        self.min_duration
    }

    #[must_use]
    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    #[must_use]
    pub fn tick(&self) -> Duration {
        self.tick
    }

    #[must_use]
    pub fn report_capacity(&self) -> usize {
        self.report_capacity
    }

    /// Checks the invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::InvalidConfig`] when a size or duration is zero,
    /// or when the maximum duration is not strictly greater than the minimum.
    pub fn validate(&self) -> Result<(), MeasureError> {
        if self.buffer_size == 0 {
            return Err(MeasureError::invalid_config("buffer size must be non-zero"));
        }
        if self.report_capacity == 0 {
            return Err(MeasureError::invalid_config(
                "report capacity must be non-zero",
            ));
        }
        if self.tick.is_zero() {
            return Err(MeasureError::invalid_config("tick must be non-zero"));
        }
        if self.min_duration.is_zero() {
            return Err(MeasureError::invalid_config(
                "minimum duration must be non-zero",
            ));
        }
        if self.max_duration <= self.min_duration {
            return Err(MeasureError::invalid_config(format!(
                "maximum duration ({:?}) must be greater than minimum duration ({:?})",
                self.max_duration, self.min_duration
            )));
        }
        Ok(())
    }
}
