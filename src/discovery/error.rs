//! Error types for URL discovery.

use thiserror::Error;

/// Errors that can occur while discovering measurement URLs.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Network-level error reaching the bootstrap page, script or API.
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// A value the bootstrap relies on was not found.
    #[error("{field} not found in bootstrap response")]
    MissingField {
        /// Name of the missing value.
        field: &'static str,
    },

    /// A bootstrap or derived URL could not be parsed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The API response was not valid JSON.
    #[error("invalid JSON from {url}: {source}")]
    Json {
        /// The API URL.
        url: String,
        /// The underlying decoding error.
        #[source]
        source: reqwest::Error,
    },
}

impl DiscoveryError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a missing field error.
    #[must_use]
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a JSON decoding error.
    pub fn json(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Json {
            url: url.into(),
            source,
        }
    }
}
