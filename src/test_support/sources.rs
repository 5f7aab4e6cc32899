//! Scripted byte sources for exercising the measurement core without a network.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use tokio_util::io::StreamReader;

use crate::transport::{ByteSource, ByteStream, TransportError};

#[derive(Debug, Clone, Copy)]
struct Plan {
    chunk: usize,
    first_delay: Duration,
    every: Duration,
    chunks: Option<usize>,
    stall_after: Option<usize>,
}

/// Emits `chunk` bytes every `every`, optionally ending or stalling after a count.
#[derive(Debug, Clone)]
pub struct PacedSource {
    plan: Plan,
    opens: Arc<AtomicUsize>,
}

impl PacedSource {
    pub fn new(chunk: usize, every: Duration) -> Self {
        Self {
            plan: Plan {
                chunk,
                first_delay: every,
                every,
                chunks: None,
                stall_after: None,
            },
            opens: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Delay before the first chunk of every opened stream.
    pub fn with_first_delay(mut self, delay: Duration) -> Self {
        self.plan.first_delay = delay;
        self
    }

    /// End each stream after `count` chunks.
    pub fn with_chunks(mut self, count: usize) -> Self {
        self.plan.chunks = Some(count);
        self
    }

    /// Never produce anything after `count` chunks, without ending.
    pub fn stalling_after(mut self, count: usize) -> Self {
        self.plan.stall_after = Some(count);
        self
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ByteSource for PacedSource {
    async fn open(&self, _url: &str) -> Result<ByteStream, TransportError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let plan = self.plan;
        let chunks = stream::unfold(0usize, move |sent| async move {
            if plan.chunks.is_some_and(|limit| sent >= limit) {
                return None;
            }
            if plan.stall_after.is_some_and(|limit| sent >= limit) {
                std::future::pending::<()>().await;
            }
            let delay = if sent == 0 { plan.first_delay } else { plan.every };
            tokio::time::sleep(delay).await;
            Some((Ok::<_, io::Error>(Bytes::from(vec![0u8; plan.chunk])), sent + 1))
        });
        Ok(Box::new(StreamReader::new(Box::pin(chunks))))
    }
}

/// Fails either when opening or after a number of successful chunks.
#[derive(Debug, Clone)]
pub struct FailingSource {
    fail_after: Option<(usize, usize)>,
    opens: Arc<AtomicUsize>,
}

impl FailingSource {
    /// Every open answers with HTTP 503.
    pub fn on_open() -> Self {
        Self {
            fail_after: None,
            opens: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Streams `chunks` chunks of `size` bytes, then a connection reset.
    pub fn after_chunks(chunks: usize, size: usize) -> Self {
        Self {
            fail_after: Some((chunks, size)),
            opens: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ByteSource for FailingSource {
    async fn open(&self, url: &str) -> Result<ByteStream, TransportError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let Some((chunks, size)) = self.fail_after else {
            return Err(TransportError::http_status(url, 503));
        };
        let items = stream::unfold(0usize, move |sent| async move {
            tokio::time::sleep(Duration::from_millis(1)).await;
            if sent < chunks {
                Some((Ok(Bytes::from(vec![0u8; size])), sent + 1))
            } else if sent == chunks {
                Some((
                    Err(io::Error::new(
                        io::ErrorKind::ConnectionReset,
                        "connection reset by peer",
                    )),
                    sent + 1,
                ))
            } else {
                None
            }
        });
        Ok(Box::new(StreamReader::new(Box::pin(items))))
    }
}

/// Dispatches each URL to its own scripted source.
#[derive(Default)]
pub struct RoutedSource {
    routes: HashMap<String, Arc<dyn ByteSource>>,
}

impl RoutedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, source: Arc<dyn ByteSource>) -> Self {
        self.routes.insert(url.to_string(), source);
        self
    }
}

#[async_trait]
impl ByteSource for RoutedSource {
    async fn open(&self, url: &str) -> Result<ByteStream, TransportError> {
        match self.routes.get(url) {
            Some(source) => source.open(url).await,
            None => Err(TransportError::invalid_url(url)),
        }
    }
}
