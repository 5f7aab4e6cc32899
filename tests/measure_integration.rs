//! Integration tests for the measurement engine.
//!
//! These tests drive MeasureEngine over the real HTTP byte source against a
//! mock HTTP server, with short measurement windows.

use std::sync::Arc;
use std::time::Duration;

use fast_core::{
    HttpByteSource, MeasureConfig, MeasureEngine, MeasureError, ThroughputSample, TransportError,
};
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;

const BODY_LEN: usize = 64 * 1024;

// ==================== Helper Functions ====================

fn short_config() -> MeasureConfig {
    MeasureConfig::new()
        .with_min_duration(Duration::from_secs(1))
        .with_max_duration(Duration::from_secs(2))
}

async fn mount_body(server: &MockServer, route: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0xAB; BODY_LEN])
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Collects every sample until the engine closes the channel.
fn collect_samples() -> (
    mpsc::Sender<ThroughputSample>,
    tokio::task::JoinHandle<Vec<ThroughputSample>>,
) {
    let (tx, mut rx) = mpsc::channel(16);
    let handle = tokio::spawn(async move {
        let mut samples = Vec::new();
        while let Some(sample) = rx.recv().await {
            samples.push(sample);
        }
        samples
    });
    (tx, handle)
}

// ==================== Measurement Tests ====================

#[tokio::test]
async fn test_measure_streams_from_every_url_until_minimum_then_stops() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_body(&server, "/a", Duration::from_millis(200)).await;
    mount_body(&server, "/b", Duration::from_millis(200)).await;

    let engine = MeasureEngine::new(Arc::new(HttpByteSource::new()), short_config()).unwrap();
    let urls = vec![format!("{}/a", server.uri()), format!("{}/b", server.uri())];
    let (tx, samples) = collect_samples();

    let summary = engine.measure(&urls, tx).await.unwrap();
    let samples = samples.await.unwrap();

    assert!(
        summary.total_bytes() >= BODY_LEN as u64,
        "Expected at least one full body, got {}",
        summary.total_bytes()
    );
    assert!(summary.elapsed() >= Duration::from_secs(1));
    assert!(summary.elapsed() < Duration::from_secs(3));

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().any(|r| r.url.path() == "/a"));
    assert!(requests.iter().any(|r| r.url.path() == "/b"));

    for (i, sample) in samples.iter().enumerate() {
        assert_eq!(sample.second(), i as u64 + 1);
        assert!(sample.kbps() > 0.0);
    }
}

#[tokio::test]
async fn test_measure_http_error_aborts_session() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_body(&server, "/ok", Duration::from_millis(100)).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let engine = MeasureEngine::new(Arc::new(HttpByteSource::new()), short_config()).unwrap();
    let urls = vec![
        format!("{}/ok", server.uri()),
        format!("{}/missing", server.uri()),
    ];
    let (tx, samples) = collect_samples();

    let result = engine.measure(&urls, tx).await;

    match result {
        Err(MeasureError::Transport(TransportError::HttpStatus { status, url })) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/missing"));
        }
        other => panic!("Expected HttpStatus 404, got {other:?}"),
    }
    // The session stopped long before the first tick
    assert!(samples.await.unwrap().is_empty());
}

#[tokio::test]
async fn test_measure_unreachable_host_is_network_error() {
    // Port 9 (discard) on localhost is closed in test environments
    let engine = MeasureEngine::new(Arc::new(HttpByteSource::new()), short_config()).unwrap();
    let urls = vec!["http://127.0.0.1:9/speedtest".to_string()];
    let (tx, _samples) = collect_samples();

    let result = engine.measure(&urls, tx).await;

    assert!(
        matches!(
            result,
            Err(MeasureError::Transport(
                TransportError::Network { .. } | TransportError::Timeout { .. }
            ))
        ),
        "Expected a network failure, got {result:?}"
    );
}

#[tokio::test]
async fn test_measure_stops_at_maximum_when_streams_never_end() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    // Headers arrive only after the maximum window; the worker is cancelled while opening
    mount_body(&server, "/slow", Duration::from_secs(10)).await;

    let engine = MeasureEngine::new(Arc::new(HttpByteSource::new()), short_config()).unwrap();
    let urls = vec![format!("{}/slow", server.uri())];
    let (tx, samples) = collect_samples();

    let summary = engine.measure(&urls, tx).await.unwrap();
    let samples = samples.await.unwrap();

    assert_eq!(summary.total_bytes(), 0);
    assert!(summary.elapsed() >= Duration::from_secs(2));
    assert!(summary.elapsed() < Duration::from_secs(4));
    assert!(samples.iter().all(|s| s.kbps() == 0.0));
}
