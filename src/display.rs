//! Sample rendering for the measurement run.

use std::time::Duration;

use fast_core::ThroughputSample;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

/// How samples are shown while the measurement runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DisplayMode {
    /// Spinner on stderr, updated in place.
    Spinner,
    /// One text line per sample on stdout.
    Plain,
    /// One JSON object per sample on stdout.
    Json,
    /// Nothing until the final estimate.
    Silent,
}

impl DisplayMode {
    pub(crate) fn select(quiet: bool, json: bool, stderr_is_terminal: bool) -> Self {
        if json {
            Self::Json
        } else if quiet {
            Self::Silent
        } else if stderr_is_terminal {
            Self::Spinner
        } else {
            Self::Plain
        }
    }
}

pub(crate) fn format_sample(sample: &ThroughputSample) -> String {
    format!("{:.2} Kbps {:.2} Mbps", sample.kbps(), sample.mbps())
}

pub(crate) fn render(mode: DisplayMode, sample: &ThroughputSample) -> Option<String> {
    match mode {
        DisplayMode::Json => match serde_json::to_string(sample) {
            Ok(line) => Some(line),
            Err(e) => {
                warn!(error = %e, "failed to serialize sample");
                None
            }
        },
        DisplayMode::Silent => None,
        DisplayMode::Spinner | DisplayMode::Plain => Some(format_sample(sample)),
    }
}

/// Spawns the task that consumes samples until the engine closes the channel.
/// The handle yields the last sample seen.
pub(crate) fn spawn_display(
    mode: DisplayMode,
    mut samples: mpsc::Receiver<ThroughputSample>,
) -> JoinHandle<Option<ThroughputSample>> {
    tokio::spawn(async move {
        let spinner = (mode == DisplayMode::Spinner).then(|| {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner.set_message("Measuring...");
            spinner
        });

        let mut last = None;
        while let Some(sample) = samples.recv().await {
            if let Some(line) = render(mode, &sample) {
                match &spinner {
                    Some(spinner) => spinner.set_message(line),
                    None => println!("{line}"),
                }
            }
            last = Some(sample);
        }

        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        last
    })
}
