//! An installed distribution together with what the index knows about it

use chrono::{DateTime, Utc};

use crate::distributions::LocalDistribution;
use crate::release::error::RegistryError;
use crate::release::types::{FetchResult, Release, ReleaseHistory};

/// Read-only view over one distribution and its fetched release history.
///
/// Every query is derived on demand from the fetched data.
#[derive(Debug)]
pub struct Package {
    distribution: LocalDistribution,
    result: FetchResult,
}

impl Package {
    pub fn new(distribution: LocalDistribution, result: FetchResult) -> Self {
        Self {
            distribution,
            result,
        }
    }

    pub fn name(&self) -> &str {
        &self.distribution.name
    }

    /// Installed version
    pub fn version(&self) -> &str {
        &self.distribution.version
    }

    /// Release history, `None` when the lookup failed
    pub fn releases(&self) -> Option<&ReleaseHistory> {
        self.result.releases()
    }

    pub fn error(&self) -> Option<&RegistryError> {
        self.result.error()
    }

    /// The release matching the installed version
    pub fn current_release(&self) -> Option<&Release> {
        self.releases()?.get(self.version())
    }

    /// Newest stable release, or the newest release of any kind when no
    /// stable one exists
    pub fn latest_release(&self) -> Option<&Release> {
        let releases = self.releases()?;
        releases
            .iter()
            .find(|release| release.is_stable())
            .or_else(|| releases.first())
    }

    /// Upload time of the latest release, `now` when it is unknown
    pub fn last_release_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.latest_release()
            .and_then(Release::uploaded_at)
            .unwrap_or(now)
    }

    /// True unless a different version is the latest release
    pub fn is_up_to_date(&self) -> bool {
        self.latest_release()
            .is_none_or(|latest| latest.version == self.version())
    }
}
