//! Fast Core Library
//!
//! This library estimates download bandwidth by streaming several URLs
//! concurrently and reporting a running cumulative throughput once per
//! second, the way fast.com measures a connection.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`measure`] - Concurrent measurement engine (workers, sampler, timeouts)
//! - [`transport`] - Byte-source abstraction and its HTTP implementation
//! - [`discovery`] - fast.com bootstrap scraping and URL discovery

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod discovery;
pub mod measure;
#[cfg(test)]
pub mod test_support;
pub mod transport;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use discovery::{DEFAULT_ENDPOINT, DiscoveryError, FastClient};
pub use measure::{MeasureConfig, MeasureEngine, MeasureError, MeasureSummary, ThroughputSample};
pub use transport::{ByteSource, ByteStream, HttpByteSource, TransportError};
