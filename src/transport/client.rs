//! HTTP implementation of [`ByteSource`].
//!
//! Response bodies are streamed with `bytes_stream()` and adapted into an
//! `AsyncRead`, so the reader can pull small fixed-size chunks and report
//! progress at a fine granularity.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::Client;
use tokio_util::io::StreamReader;
use tracing::{debug, instrument};
use url::Url;

use super::{ByteSource, ByteStream, TransportError};
use crate::measure::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use crate::user_agent;

/// HTTP byte source backed by a pooled `reqwest` client.
///
/// Create it once and share it (behind `Arc`) across every worker of a
/// session so connections are reused.
#[derive(Debug, Clone)]
pub struct HttpByteSource {
    client: Client,
}

impl Default for HttpByteSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpByteSource {
    /// Creates a source with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 10 seconds
    /// - Read timeout: 30 seconds between body chunks
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a source with explicit timeout values.
    ///
    /// No whole-request timeout is set: a measurement stream lives as long
    /// as the session keeps reading it.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .read_timeout(Duration::from_secs(read_timeout_secs))
            .user_agent(user_agent::default_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }
}

#[async_trait]
impl ByteSource for HttpByteSource {
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    async fn open(&self, url: &str) -> Result<ByteStream, TransportError> {
        Url::parse(url).map_err(|_| TransportError::invalid_url(url))?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::timeout(url)
            } else {
                TransportError::network(url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::http_status(url, status.as_u16()));
        }

        debug!(
            status = status.as_u16(),
            content_length = ?response.content_length(),
            "stream opened"
        );

        let body = response.bytes_stream().map_err(std::io::Error::other);
        Ok(Box::new(StreamReader::new(Box::pin(body))))
    }
}
