//! Byte stream sources for bandwidth measurement.
//!
//! The measurement core never talks HTTP directly. It asks a [`ByteSource`]
//! to open a URL and gets back an [`AsyncRead`] it can pull chunks from and
//! drop at any time. [`HttpByteSource`] is the production implementation on
//! top of `reqwest` streaming bodies.
//!
//! # Example
//!
//! ```no_run
//! use fast_core::transport::{ByteSource, HttpByteSource};
//! use tokio::io::AsyncReadExt;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = HttpByteSource::new();
//! let mut stream = source.open("https://example.com/speedtest").await?;
//! let mut buf = [0u8; 512];
//! let n = stream.read(&mut buf).await?;
//! println!("first chunk: {n} bytes");
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

use async_trait::async_trait;
use tokio::io::AsyncRead;

pub use client::HttpByteSource;
pub use error::TransportError;

/// A readable body that can be abandoned by dropping it.
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

/// Opens byte streams for measurement targets.
///
/// Implementations must be cheap to call repeatedly for the same URL, since a
/// worker reopens its target every time the previous stream ends before the
/// minimum measurement window.
#[async_trait]
pub trait ByteSource: Send + Sync {
    /// Opens the stream behind `url`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the stream cannot be opened.
    async fn open(&self, url: &str) -> Result<ByteStream, TransportError>;
}
