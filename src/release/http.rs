//! HTTP GET with a response cache in front of the network

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, error};

use crate::config::REQUEST_TIMEOUT_MS;
use crate::release::cache::ResponseCache;
use crate::release::error::RegistryError;

/// Body of a GET request, `None` when the server answered with a non-2xx status
pub type ResponseBody = Option<String>;

/// HTTP client shared by all sources.
///
/// Successful responses are stored in the cache; failed ones always go to the
/// network again. Cache failures are logged and never fail the request.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    cache: Option<Arc<ResponseCache>>,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpClient {
    pub fn new(cache: Option<Arc<ResponseCache>>) -> Self {
        Self::with_timeout(cache, Duration::from_millis(REQUEST_TIMEOUT_MS))
    }

    /// Client whose requests give up after `timeout`
    pub fn with_timeout(cache: Option<Arc<ResponseCache>>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .inspect_err(|e| error!("Failed to build HTTP client, using defaults: {}", e))
            .unwrap_or_default();
        Self { client, cache }
    }

    /// GET `url`, serving a fresh cached body when there is one
    pub async fn get(&self, url: &str, accept: &str) -> Result<ResponseBody, RegistryError> {
        let now = Utc::now();

        if let Some(cache) = &self.cache {
            let cached = cache
                .get(url, now)
                .inspect_err(|e| error!("Failed to read cache for {}: {}", url, e))
                .unwrap_or(None);
            if let Some(cached) = cached {
                debug!("Cache hit for {} (fetched at {})", url, cached.fetched_at);
                return Ok(Some(cached.body));
            }
        }

        debug!("Fetching {}", url);
        let response = self.client.get(url).header(ACCEPT, accept).send().await?;

        if !response.status().is_success() {
            debug!("{} returned status {}", url, response.status());
            return Ok(None);
        }

        let body = response.text().await?;
        if let Some(cache) = &self.cache {
            let _ = cache
                .put(url, &body, now)
                .inspect_err(|e| error!("Failed to cache response for {}: {}", url, e));
        }
        Ok(Some(body))
    }
}
