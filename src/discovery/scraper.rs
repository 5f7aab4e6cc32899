//! Extraction of bootstrap values from the fast.com page and script.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::trace;

#[allow(clippy::expect_used)]
static SCRIPT_SRC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<script\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#)
        .expect("script src regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static API_ENDPOINT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"apiEndpoint="([\w|/.:\-]+)""#).expect("apiEndpoint regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"token:"(\w+)""#).expect("token regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static URL_COUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"urlCount:(\d+)").expect("urlCount regex is valid") // Static pattern, safe to panic
});

/// First `<script src="...">` value in the page, e.g. `/app-d17c81.js`.
#[must_use]
pub fn script_src(html: &str) -> Option<String> {
    SCRIPT_SRC_PATTERN
        .captures(html)
        .map(|caps| caps[1].to_string())
}

/// API host and path without scheme, e.g. `api.fast.com/netflix/speedtest`.
#[must_use]
pub fn api_endpoint(script: &str) -> Option<String> {
    API_ENDPOINT_PATTERN
        .captures(script)
        .map(|caps| caps[1].to_string())
}

/// Access token embedded in the script.
#[must_use]
pub fn token(script: &str) -> Option<String> {
    TOKEN_PATTERN.captures(script).map(|caps| caps[1].to_string())
}

/// Suggested number of download URLs.
///
/// The script carries several `urlCount:` assignments (defaults first,
/// effective value last); the last one wins.
#[must_use]
pub fn url_count(script: &str) -> Option<usize> {
    let count = URL_COUNT_PATTERN
        .captures_iter(script)
        .last()
        .and_then(|caps| caps[1].parse().ok());
    trace!(?count, "urlCount extracted");
    count
}

/// Every string stored under a `"url"` key, anywhere in the document.
#[must_use]
pub fn collect_urls(document: &Value) -> Vec<String> {
    let mut urls = Vec::new();
    walk(document, &mut urls);
    urls
}

fn walk(value: &Value, urls: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match child {
                    Value::String(s) if key == "url" => urls.push(s.clone()),
                    _ => walk(child, urls),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, urls);
            }
        }
        _ => {}
    }
}
