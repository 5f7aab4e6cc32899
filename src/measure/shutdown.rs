//! Shutdown coordinator: the single, race-free stop of a session.
//!
//! Any number of callers may ask a session to stop (the max timer, every
//! worker on exit, the supervisor on a panic). Exactly one of them performs
//! the teardown, guarded by a compare-and-swap on `stopped`:
//!
//! 1. cancel the session token, which ends the sampler's ticker loop, both
//!    timers, and every in-flight read;
//! 2. drop the output sender, closing the caller's sample channel.
//!
//! The output sender lives behind an async mutex that the sampler holds for
//! the duration of a publish, and a publish races the cancellation token.
//! So a sample is either delivered before the channel closes or not at all;
//! sending on a closed channel cannot happen.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::sampler::ThroughputSample;

/// Why a session was stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The maximum duration elapsed.
    MaxTimeout,
    /// A worker finished its loop after the minimum window.
    WorkerFinished,
    /// A worker hit a transport error or panicked.
    WorkerFailed,
}

/// Result of trying to hand a sample to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    /// The sample was queued on the output channel.
    Sent,
    /// The session is stopped; nothing more may be published.
    Stopped,
    /// The caller dropped its receiver while the session is still running.
    ConsumerGone,
}

/// Owns the session's cancellation token and output channel.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    stopped: AtomicBool,
    cancel: CancellationToken,
    output: Mutex<Option<mpsc::Sender<ThroughputSample>>>,
}

impl ShutdownCoordinator {
    /// Creates a coordinator for a running session.
    #[must_use]
    pub fn new(cancel: CancellationToken, output: mpsc::Sender<ThroughputSample>) -> Self {
        Self {
            stopped: AtomicBool::new(false),
            cancel,
            output: Mutex::new(Some(output)),
        }
    }

    /// The token every session task watches.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Returns true once some caller has won the stop.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Stops the session. Only the first call does anything.
    ///
    /// Returns `true` for the call that performed the teardown and `false`
    /// for every other caller.
    pub async fn stop(&self, reason: StopReason) -> bool {
        if self
            .stopped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(?reason, "session already stopped");
            return false;
        }

        self.cancel.cancel();
        // A publisher holding the lock observes the cancellation and lets go.
        self.output.lock().await.take();

        info!(?reason, "measurement stopped");
        true
    }

    /// Publishes one sample unless the session has stopped.
    pub async fn publish(&self, sample: ThroughputSample) -> Publish {
        let output = self.output.lock().await;
        let Some(tx) = output.as_ref() else {
            return Publish::Stopped;
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Publish::Stopped,
            sent = tx.send(sample) => match sent {
                Ok(()) => Publish::Sent,
                Err(_) => Publish::ConsumerGone,
            },
        }
    }
}
