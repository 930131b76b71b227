//! PyPI JSON API client for fetching release history

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::release::error::RegistryError;
use crate::release::http::HttpClient;
use crate::release::source::ReleaseSource;
use crate::release::types::RawReleases;

/// PyPI JSON API client
pub struct PypiJsonApi {
    http: HttpClient,
    base_url: String,
}

impl PypiJsonApi {
    pub fn new(http: HttpClient, base_url: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn project_url(&self, package_name: &str) -> String {
        format!("{}/pypi/{}/json", self.base_url, package_name)
    }
}

/// PyPI JSON API response structure, only the part we use
#[derive(Debug, Default, Deserialize)]
struct PypiResponse {
    #[serde(default)]
    releases: RawReleases,
}

#[async_trait]
impl ReleaseSource for PypiJsonApi {
    async fn fetch_releases(&self, package_name: &str) -> Result<RawReleases, RegistryError> {
        let url = self.project_url(package_name);

        let Some(body) = self.http.get(&url, "application/json").await? else {
            debug!("No release data for {}", package_name);
            return Ok(RawReleases::new());
        };

        let response: PypiResponse = serde_json::from_str(&body)?;
        debug!(
            "Found {} versions for package {}",
            response.releases.len(),
            package_name
        );
        Ok(response.releases)
    }
}
