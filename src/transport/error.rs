//! Error types for the transport module.
//!
//! Every failure to open or read a measurement stream is a [`TransportError`].
//! It is the only error kind the measurement core produces from I/O, and it is
//! fatal to the whole session.

use thiserror::Error;

/// Errors that can occur while opening or reading a byte stream.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error opening {url}: {source}")]
    Network {
        /// The URL that failed to open.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Connecting timed out before a response arrived.
    #[error("timeout opening {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} opening {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Reading the body failed with something other than end-of-stream.
    #[error("read error on {url}: {source}")]
    Read {
        /// The URL whose body failed.
        url: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl TransportError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a read error.
    pub fn read(url: impl Into<String>, source: std::io::Error) -> Self {
        Self::Read {
            url: url.into(),
            source,
        }
    }

    /// Returns the URL the error is about.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::InvalidUrl { url }
            | Self::Network { url, .. }
            | Self::Timeout { url }
            | Self::HttpStatus { url, .. }
            | Self::Read { url, .. } => url,
        }
    }
}

// No From<reqwest::Error> / From<std::io::Error>: every variant needs the URL
// for context, so callers go through the constructors above.
