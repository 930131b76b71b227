//! Release lookup for a single package

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::FetchConfig;
use crate::release::error::RegistryError;
use crate::release::http::HttpClient;
use crate::release::merge::merge;
use crate::release::normalize::normalize;
use crate::release::source::{IndexSource, ReleaseSource};
use crate::release::sources::{PypiJsonApi, SimpleIndex};
use crate::release::types::{FetchResult, ReleaseHistory};

/// Fetches and normalizes the release history of one package at a time.
///
/// The JSON API is authoritative. When a simple index is configured its
/// listing only adds versions the JSON API does not know about; a failing
/// simple index is logged and the JSON API data is kept.
pub struct ReleaseFetcher {
    primary: Arc<dyn ReleaseSource>,
    secondary: Option<Arc<dyn IndexSource>>,
}

impl ReleaseFetcher {
    pub fn new(primary: Arc<dyn ReleaseSource>, secondary: Option<Arc<dyn IndexSource>>) -> Self {
        Self { primary, secondary }
    }

    /// Build the fetcher for a configuration, sharing one HTTP client
    pub fn from_config(config: &FetchConfig, http: HttpClient) -> Self {
        let secondary = config.secondary_index.as_ref().map(|endpoint| {
            info!("Merging releases from simple index {}", endpoint);
            Arc::new(SimpleIndex::new(http.clone(), endpoint.clone())) as Arc<dyn IndexSource>
        });
        let primary = Arc::new(PypiJsonApi::new(http, config.pypi_url.clone()));
        Self::new(primary, secondary)
    }

    /// Look up one package. Failures are returned as [`FetchResult::Failed`].
    pub async fn fetch(&self, package_name: &str) -> FetchResult {
        let result = self.try_fetch(package_name).await;
        if let Err(e) = &result {
            warn!("Failed to fetch releases for {}: {}", package_name, e);
        }
        result.into()
    }

    async fn try_fetch(&self, package_name: &str) -> Result<ReleaseHistory, RegistryError> {
        let raw = self.primary.fetch_releases(package_name).await?;
        let history = normalize(raw, Utc::now())?;
        debug!("{} has {} releases", package_name, history.len());

        let Some(secondary) = &self.secondary else {
            return Ok(history);
        };

        match secondary.fetch_listing(package_name).await {
            Ok(listing) => Ok(merge(history, listing)),
            Err(e) => {
                warn!(
                    "Ignoring simple index failure for {}: {}",
                    package_name, e
                );
                Ok(history)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::source::{MockIndexSource, MockReleaseSource};
    use crate::release::types::{IndexEntry, RawArtifact, RawReleases};

    fn raw_releases() -> RawReleases {
        RawReleases::from([(
            "1.0.0".to_string(),
            vec![RawArtifact {
                packagetype: Some("sdist".to_string()),
                upload_time_iso_8601: Some("2021-10-05T10:00:00Z".to_string()),
            }],
        )])
    }

    fn decode_error() -> RegistryError {
        RegistryError::Decode(serde_json::from_str::<RawReleases>("[").unwrap_err())
    }

    #[tokio::test]
    async fn fetch_returns_normalized_primary_releases() {
        let mut primary = MockReleaseSource::new();
        primary
            .expect_fetch_releases()
            .withf(|name| name == "a")
            .returning(|_| Ok(raw_releases()));

        let fetcher = ReleaseFetcher::new(Arc::new(primary), None);
        let result = fetcher.fetch("a").await;

        let history = result.releases().unwrap();
        assert_eq!(history.versions().collect::<Vec<_>>(), vec!["1.0.0"]);
    }

    #[tokio::test]
    async fn fetch_captures_primary_failure() {
        let mut primary = MockReleaseSource::new();
        primary
            .expect_fetch_releases()
            .returning(|_| Err(decode_error()));

        let fetcher = ReleaseFetcher::new(Arc::new(primary), None);
        let result = fetcher.fetch("a").await;

        assert!(result.releases().is_none());
        assert!(matches!(result, FetchResult::Failed(RegistryError::Decode(_))));
    }

    #[tokio::test]
    async fn fetch_captures_malformed_timestamp() {
        let mut primary = MockReleaseSource::new();
        primary.expect_fetch_releases().returning(|_| {
            Ok(RawReleases::from([(
                "1.0".to_string(),
                vec![RawArtifact {
                    packagetype: None,
                    upload_time_iso_8601: Some("not a time".to_string()),
                }],
            )]))
        });

        let fetcher = ReleaseFetcher::new(Arc::new(primary), None);
        let result = fetcher.fetch("a").await;

        assert!(matches!(
            result,
            FetchResult::Failed(RegistryError::InvalidTimestamp { .. })
        ));
    }

    #[tokio::test]
    async fn fetch_merges_secondary_listing() {
        let mut primary = MockReleaseSource::new();
        primary
            .expect_fetch_releases()
            .returning(|_| Ok(raw_releases()));
        let mut secondary = MockIndexSource::new();
        secondary
            .expect_fetch_listing()
            .withf(|name| name == "a")
            .times(1)
            .returning(|_| {
                Ok(vec![IndexEntry {
                    version: Some("1.1.0".to_string()),
                    package_type: "sdist".to_string(),
                }])
            });

        let fetcher = ReleaseFetcher::new(Arc::new(primary), Some(Arc::new(secondary)));
        let result = fetcher.fetch("a").await;

        let history = result.releases().unwrap();
        assert_eq!(history.versions().collect::<Vec<_>>(), vec!["1.1.0", "1.0.0"]);
        assert_eq!(history.get("1.1.0").unwrap().uploaded_at(), None);
    }

    #[tokio::test]
    async fn fetch_keeps_primary_data_when_secondary_fails() {
        let mut primary = MockReleaseSource::new();
        primary
            .expect_fetch_releases()
            .returning(|_| Ok(raw_releases()));
        let mut secondary = MockIndexSource::new();
        secondary
            .expect_fetch_listing()
            .returning(|_| Err(decode_error()));

        let fetcher = ReleaseFetcher::new(Arc::new(primary), Some(Arc::new(secondary)));
        let result = fetcher.fetch("a").await;

        let history = result.releases().unwrap();
        assert_eq!(history.versions().collect::<Vec<_>>(), vec!["1.0.0"]);
    }

    #[tokio::test]
    async fn fetch_skips_secondary_when_primary_fails() {
        let mut primary = MockReleaseSource::new();
        primary
            .expect_fetch_releases()
            .returning(|_| Err(decode_error()));
        let mut secondary = MockIndexSource::new();
        secondary.expect_fetch_listing().never();

        let fetcher = ReleaseFetcher::new(Arc::new(primary), Some(Arc::new(secondary)));
        let result = fetcher.fetch("a").await;

        assert!(result.error().is_some());
    }
}
