//! Stream reader: drives one byte stream and reports chunk sizes.

use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::transport::{ByteSource, TransportError};

/// How a read pass ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The stream reached its natural end.
    EndOfStream,
    /// The session asked the reader to stop.
    Cancelled,
}

/// Reads `url` to completion or cancellation, reporting every chunk length.
///
/// Each read uses a buffer of `buffer_size` bytes. The length of every read is
/// sent on `reports` before the read result is inspected, so a failing read
/// still reports zero. Cancellation is raced against the open and against each
/// individual read, which bounds the stop latency to one in-flight read.
/// The stream is dropped on every exit path.
///
/// # Errors
///
/// Returns [`TransportError`] when the stream cannot be opened or a read fails
/// with anything other than end-of-stream. Cancellation is not an error.
#[instrument(level = "debug", skip(source, reports, cancel), fields(url = %url))]
pub async fn read_stream(
    source: &dyn ByteSource,
    url: &str,
    buffer_size: usize,
    reports: &mpsc::Sender<u64>,
    cancel: &CancellationToken,
) -> Result<ReadOutcome, TransportError> {
    let mut stream = tokio::select! {
        biased;
        () = cancel.cancelled() => {
            debug!("cancelled before stream opened");
            return Ok(ReadOutcome::Cancelled);
        }
        opened = source.open(url) => opened?,
    };

    let mut buf = vec![0u8; buffer_size];
    let mut total: u64 = 0;

    loop {
        let read = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(bytes = total, "read cancelled");
                return Ok(ReadOutcome::Cancelled);
            }
            read = stream.read(&mut buf) => read,
        };

        let length = read.as_ref().map_or(0, |n| *n as u64);
        // Not raced against `cancel`: a chunk read before stop is still counted.
        if reports.send(length).await.is_err() {
            // Aggregator is gone, nobody is counting anymore.
            debug!(bytes = total, "byte report channel closed");
            return Ok(ReadOutcome::Cancelled);
        }
        total += length;

        match read {
            Ok(0) => {
                debug!(bytes = total, "stream finished");
                return Ok(ReadOutcome::EndOfStream);
            }
            Ok(_) => {}
            Err(e) => return Err(TransportError::read(url, e)),
        }
    }
}
