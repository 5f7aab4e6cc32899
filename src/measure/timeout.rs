//! Timeout controller: the minimum and maximum measurement deadlines.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::time::Instant;
use tracing::{debug, info};

use super::shutdown::{ShutdownCoordinator, StopReason};

/// Tracks the two session deadlines.
///
/// The minimum deadline only flips a flag that workers consult after a
/// stream ends; the maximum deadline stops the session outright.
#[derive(Debug, Default)]
pub struct TimeoutController {
    minimum_reached: AtomicBool,
}

impl TimeoutController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the minimum window has elapsed. Never reverts.
    #[must_use]
    pub fn minimum_reached(&self) -> bool {
        self.minimum_reached.load(Ordering::Acquire)
    }

    /// Sets the minimum flag at `deadline`, unless the session stops first.
    pub async fn run_minimum(&self, deadline: Instant, shutdown: &ShutdownCoordinator) {
        tokio::select! {
            biased;
            () = shutdown.token().cancelled() => {
                debug!("minimum timer cancelled");
            }
            () = tokio::time::sleep_until(deadline) => {
                self.minimum_reached.store(true, Ordering::Release);
                info!("minimum measurement window reached");
            }
        }
    }

    /// Stops the session at `deadline`, unless it stops first.
    pub async fn run_maximum(&self, deadline: Instant, shutdown: &ShutdownCoordinator) {
        tokio::select! {
            biased;
            () = shutdown.token().cancelled() => {
                debug!("maximum timer cancelled");
            }
            () = tokio::time::sleep_until(deadline) => {
                info!("maximum measurement window reached");
                shutdown.stop(StopReason::MaxTimeout).await;
            }
        }
    }
}
