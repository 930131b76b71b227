//! Release data shared between sources, normalization and the package facade

use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use pep508_rs::pep440_rs::Version;
use serde::Deserialize;

use crate::release::error::RegistryError;

/// Package type used for artifacts that had to be synthesized
pub const SDIST: &str = "sdist";

/// Artifact record as published by the JSON API
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawArtifact {
    #[serde(default)]
    pub packagetype: Option<String>,
    #[serde(default)]
    pub upload_time_iso_8601: Option<String>,
}

/// Raw `releases` payload: version string to its published files
pub type RawReleases = HashMap<String, Vec<RawArtifact>>;

/// One entry of a simple-index project page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// `None` when the version cannot be recovered from the file name
    pub version: Option<String>,
    pub package_type: String,
}

/// One published file for one version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseArtifact {
    pub version: String,
    pub package_type: String,
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// All artifacts published for a single version, never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub version: String,
    pub artifacts: Vec<ReleaseArtifact>,
}

impl Release {
    pub fn new(version: impl Into<String>, artifacts: Vec<ReleaseArtifact>) -> Self {
        Self {
            version: version.into(),
            artifacts,
        }
    }

    /// Latest upload time among the artifacts, if any artifact has one
    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        self.artifacts.iter().filter_map(|a| a.uploaded_at).max()
    }

    /// PEP 440 parse of the version, `None` for legacy version strings
    pub fn parsed_version(&self) -> Option<Version> {
        Version::from_str(&self.version).ok()
    }

    /// Whether the version is a final release (no pre, rc or dev segment)
    pub fn is_stable(&self) -> bool {
        is_stable_version(&self.version)
    }
}

/// Returns true for versions that parse under PEP 440 and are neither
/// pre-releases nor development releases.
pub fn is_stable_version(version: &str) -> bool {
    Version::from_str(version)
        .map(|v| !v.is_pre() && !v.is_dev())
        .unwrap_or(false)
}

/// Newest-first ordering: parsed version descending, then upload time
/// descending. Unparseable versions and missing times sort last.
pub fn newest_first(a: &Release, b: &Release) -> Ordering {
    let a_key = (a.parsed_version(), a.uploaded_at());
    let b_key = (b.parsed_version(), b.uploaded_at());
    b_key.0.cmp(&a_key.0).then_with(|| b_key.1.cmp(&a_key.1))
}

/// Release history of one package, ordered newest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseHistory {
    releases: IndexMap<String, Release>,
}

impl ReleaseHistory {
    /// Build a history from releases, sorting them newest first.
    /// The sort is stable so equal keys keep their input order.
    pub fn from_releases(releases: impl IntoIterator<Item = Release>) -> Self {
        let mut releases: IndexMap<String, Release> = releases
            .into_iter()
            .map(|release| (release.version.clone(), release))
            .collect();
        releases.sort_by(|_, a, _, b| newest_first(a, b));
        Self { releases }
    }

    pub fn get(&self, version: &str) -> Option<&Release> {
        self.releases.get(version)
    }

    pub fn contains(&self, version: &str) -> bool {
        self.releases.contains_key(version)
    }

    pub fn first(&self) -> Option<&Release> {
        self.releases.values().next()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Release> {
        self.releases.values()
    }

    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.releases.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

impl IntoIterator for ReleaseHistory {
    type Item = Release;
    type IntoIter = indexmap::map::IntoValues<String, Release>;

    fn into_iter(self) -> Self::IntoIter {
        self.releases.into_values()
    }
}

/// Outcome of querying the remote sources for one package
#[derive(Debug)]
pub enum FetchResult {
    /// Release history, empty when the index does not know the package
    Releases(ReleaseHistory),
    /// The lookup failed; the error is kept for reporting
    Failed(RegistryError),
}

impl FetchResult {
    pub fn releases(&self) -> Option<&ReleaseHistory> {
        match self {
            Self::Releases(history) => Some(history),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&RegistryError> {
        match self {
            Self::Releases(_) => None,
            Self::Failed(e) => Some(e),
        }
    }
}

impl From<Result<ReleaseHistory, RegistryError>> for FetchResult {
    fn from(result: Result<ReleaseHistory, RegistryError>) -> Self {
        match result {
            Ok(history) => Self::Releases(history),
            Err(e) => Self::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn release(version: &str, uploaded_at: Option<DateTime<Utc>>) -> Release {
        Release::new(
            version,
            vec![ReleaseArtifact {
                version: version.to_string(),
                package_type: SDIST.to_string(),
                uploaded_at,
            }],
        )
    }

    #[rstest]
    #[case("1.0.0", true)]
    #[case("2.0.0.post1", true)]
    #[case("1.0.0rc1", false)]
    #[case("1.0.0b2", false)]
    #[case("1.0a1", false)]
    #[case("2.0.0.dev1", false)]
    #[case("1.0.0.post1.dev3", false)]
    #[case("2004b", false)]
    #[case("not-a-version", false)]
    fn is_stable_version_returns_expected(#[case] version: &str, #[case] expected: bool) {
        assert_eq!(is_stable_version(version), expected);
    }

    #[test]
    fn uploaded_at_returns_latest_artifact_time() {
        let early = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2021, 1, 2, 0, 0, 0).unwrap();
        let release = Release::new(
            "1.0",
            vec![
                ReleaseArtifact {
                    version: "1.0".to_string(),
                    package_type: "bdist_wheel".to_string(),
                    uploaded_at: Some(early),
                },
                ReleaseArtifact {
                    version: "1.0".to_string(),
                    package_type: SDIST.to_string(),
                    uploaded_at: Some(late),
                },
            ],
        );

        assert_eq!(release.uploaded_at(), Some(late));
    }

    #[test]
    fn from_releases_orders_by_version_then_time() {
        let t1 = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let history = ReleaseHistory::from_releases(vec![
            release("1.9.0", Some(t1)),
            release("legacy-b", Some(t1)),
            release("10.0.0", Some(t1)),
            release("legacy-a", Some(t2)),
            release("2.0.0", None),
        ]);

        let versions: Vec<_> = history.versions().collect();
        assert_eq!(
            versions,
            vec!["10.0.0", "2.0.0", "1.9.0", "legacy-a", "legacy-b"]
        );
    }

    #[test]
    fn fetch_result_from_error_has_no_releases() {
        let err = serde_json::from_str::<RawReleases>("{").unwrap_err();
        let result = FetchResult::from(Err(RegistryError::Decode(err)));

        assert!(result.releases().is_none());
        assert!(matches!(result.error(), Some(RegistryError::Decode(_))));
    }
}
