//! CLI entry point for the fast bandwidth estimator.

use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use fast_core::{FastClient, HttpByteSource, MeasureConfig, MeasureEngine, ThroughputSample};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

mod cli;
mod display;

use cli::Args;
use display::{DisplayMode, format_sample, spawn_display};

/// Samples buffered between the engine and the display task.
const SAMPLE_CHANNEL_CAPACITY: usize = 16;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr so stdout carries only samples and the estimate
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    // Validate the window before touching the network
    let config = MeasureConfig::new()
        .with_min_duration(Duration::from_secs(args.min))
        .with_max_duration(Duration::from_secs(args.max))
        .with_buffer_size(usize::try_from(args.buffer_size).context("buffer size out of range")?);
    let engine = MeasureEngine::new(Arc::new(HttpByteSource::new()), config)?;

    let urls = resolve_urls(&args).await?;
    info!(targets = urls.len(), "Starting measurement");

    let mode = DisplayMode::select(args.quiet, args.json, io::stderr().is_terminal());
    let (tx, rx) = mpsc::channel(SAMPLE_CHANNEL_CAPACITY);
    let display = spawn_display(mode, rx);

    // Dropping the measure future aborts every session task
    let outcome = tokio::select! {
        result = engine.measure(&urls, tx) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    let last = display.await.unwrap_or_else(|e| {
        warn!(error = %e, "display task failed");
        None
    });

    let estimate = match outcome {
        Some(result) => {
            let summary = result.context("measurement failed")?;
            info!(
                total_bytes = summary.total_bytes(),
                seconds = summary.ticks(),
                elapsed_ms = u64::try_from(summary.elapsed().as_millis()).unwrap_or(u64::MAX),
                "Measurement complete"
            );
            summary.estimate()
        }
        None => {
            warn!("Interrupted, reporting the last sample");
            last.unwrap_or_else(|| ThroughputSample::from_total(0, 0))
        }
    };

    if args.json {
        println!("{}", serde_json::to_string(&estimate)?);
    } else {
        println!("{}", format_sample(&estimate));
    }

    Ok(())
}

/// Positional URLs bypass discovery.
async fn resolve_urls(args: &Args) -> Result<Vec<String>> {
    if !args.urls.is_empty() {
        debug!(count = args.urls.len(), "using URLs from the command line");
        return Ok(args.urls.clone());
    }

    let mut client = FastClient::with_endpoint(&args.endpoint)?;
    debug!(endpoint = %client.endpoint(), "discovering download URLs");
    client.init().await.context("failed to read the fast.com bootstrap")?;
    let urls = client.get_urls().await.context("failed to fetch download URLs")?;
    Ok(urls)
}
