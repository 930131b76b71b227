//! Source traits for fetching release data for a package

#[cfg(test)]
use mockall::automock;

use crate::release::error::RegistryError;
use crate::release::types::{IndexEntry, RawReleases};

/// Authoritative source of release history (the JSON API)
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetches the raw `releases` payload for a package
    ///
    /// # Returns
    /// * `Ok(RawReleases)` - Empty when the index does not know the package
    /// * `Err(RegistryError)` - On transport or decode failures
    async fn fetch_releases(&self, package_name: &str) -> Result<RawReleases, RegistryError>;
}

/// Secondary source listing the files of a project without upload times
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait IndexSource: Send + Sync {
    /// Fetches the project page of a package as (version, package type) entries
    async fn fetch_listing(&self, package_name: &str) -> Result<Vec<IndexEntry>, RegistryError>;
}
