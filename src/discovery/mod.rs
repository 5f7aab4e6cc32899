//! Discovery of measurement URLs from fast.com.
//!
//! The public page references a script that embeds the speed-test API
//! endpoint, an access token and the number of URLs to request. Discovery is
//! a two-step process:
//!
//! 1. [`FastClient::init`] scrapes those values from the page and script;
//! 2. [`FastClient::get_urls`] calls the API and returns the download URLs
//!    to hand to the measurement engine.
//!
//! # Example
//!
//! ```no_run
//! use fast_core::discovery::FastClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = FastClient::new();
//! client.init().await?;
//! let urls = client.get_urls().await?;
//! println!("{} targets", urls.len());
//! # Ok(())
//! # }
//! ```

mod error;
pub mod scraper;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub use error::DiscoveryError;

use crate::user_agent;

/// Default bootstrap page.
pub const DEFAULT_ENDPOINT: &str = "https://fast.com";

/// Connect timeout for bootstrap requests.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Whole-request timeout for bootstrap requests (they are small).
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Values scraped from the bootstrap script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    url: Url,
    token: String,
    url_count: usize,
}

impl ApiConfig {
    /// Speed-test API URL, with the bootstrap page's scheme.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Number of URLs the API is asked for.
    #[must_use]
    pub fn url_count(&self) -> usize {
        self.url_count
    }
}

/// Client for the fast.com bootstrap flow.
#[derive(Debug, Clone)]
pub struct FastClient {
    client: Client,
    endpoint: Url,
    api: Option<ApiConfig>,
}

impl Default for FastClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FastClient {
    /// Creates a client for the public fast.com endpoint.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static configuration
    /// or the built-in endpoint does not parse. Neither happens in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL")
    }

    /// Creates a client for another bootstrap page (mirrors, tests).
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidUrl`] if `endpoint` does not parse.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static configuration.
    #[allow(clippy::expect_used)]
    pub fn with_endpoint(endpoint: &str) -> Result<Self, DiscoveryError> {
        let endpoint = Url::parse(endpoint).map_err(|_| DiscoveryError::invalid_url(endpoint))?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(user_agent::default_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");
        Ok(Self {
            client,
            endpoint,
            api: None,
        })
    }

    /// Bootstrap page this client scrapes.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Scraped API values, once [`init`](Self::init) succeeded.
    #[must_use]
    pub fn api(&self) -> Option<&ApiConfig> {
        self.api.as_ref()
    }

    /// Scrapes the API endpoint, token and URL count.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] when a request fails or a value is missing.
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn init(&mut self) -> Result<&ApiConfig, DiscoveryError> {
        let html = self.fetch_text(&self.endpoint).await?;
        let src = scraper::script_src(&html).ok_or(DiscoveryError::missing("script src"))?;
        let script_url = self
            .endpoint
            .join(&src)
            .map_err(|_| DiscoveryError::invalid_url(&src))?;
        debug!(script = %script_url, "bootstrap script located");

        let script = self.fetch_text(&script_url).await?;
        let host_path =
            scraper::api_endpoint(&script).ok_or(DiscoveryError::missing("apiEndpoint"))?;
        let token = scraper::token(&script).ok_or(DiscoveryError::missing("token"))?;
        let url_count = scraper::url_count(&script).ok_or(DiscoveryError::missing("urlCount"))?;

        let api_url = format!("{}://{host_path}", self.endpoint.scheme());
        let url = Url::parse(&api_url).map_err(|_| DiscoveryError::invalid_url(&api_url))?;
        info!(api = %url, url_count, "discovery initialized");

        Ok(self.api.insert(ApiConfig {
            url,
            token,
            url_count,
        }))
    }

    /// Asks the API for download URLs.
    ///
    /// Call after [`init`](Self::init); call `init` again if the token has
    /// expired (the API then answers 403).
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::MissingField`] before `init` or when the
    /// response carries no URL, and other variants for request failures.
    #[instrument(skip(self))]
    pub async fn get_urls(&self) -> Result<Vec<String>, DiscoveryError> {
        let api = self.api.as_ref().ok_or(DiscoveryError::missing("token"))?;

        let mut url = api.url.clone();
        url.query_pairs_mut()
            .append_pair("https", "true")
            .append_pair("token", &api.token)
            .append_pair("urlCount", &api.url_count.to_string());

        let response = self.send(&url).await?;
        let document: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DiscoveryError::json(api.url.as_str(), e))?;

        let urls = scraper::collect_urls(&document);
        if urls.is_empty() {
            return Err(DiscoveryError::missing("url"));
        }
        if urls.len() != api.url_count {
            warn!(
                expected = api.url_count,
                received = urls.len(),
                "API returned an unexpected number of URLs"
            );
        }

        debug!(count = urls.len(), "download URLs received");
        Ok(urls)
    }

    async fn fetch_text(&self, url: &Url) -> Result<String, DiscoveryError> {
        self.send(url)
            .await?
            .text()
            .await
            .map_err(|e| DiscoveryError::network(url.as_str(), e))
    }

    async fn send(&self, url: &Url) -> Result<reqwest::Response, DiscoveryError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DiscoveryError::network(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::http_status(url.as_str(), status.as_u16()));
        }
        Ok(response)
    }
}
