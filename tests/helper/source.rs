//! Source test utilities

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use pypi_changes::distributions::LocalDistribution;
use pypi_changes::release::error::RegistryError;
use pypi_changes::release::source::ReleaseSource;
use pypi_changes::release::types::{RawArtifact, RawReleases};

/// In-memory JSON API: known packages return their releases, packages
/// registered as failing return a decode error, delegated packages are
/// answered by another source, anything else is unknown.
#[derive(Default)]
pub struct InMemorySource {
    releases: HashMap<String, RawReleases>,
    failing: Vec<String>,
    delegated: HashMap<String, Arc<dyn ReleaseSource>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `versions` as (version, upload time) pairs for `package`
    pub fn with_releases(mut self, package: &str, versions: &[(&str, &str)]) -> Self {
        let releases = versions
            .iter()
            .map(|(version, uploaded)| {
                (
                    version.to_string(),
                    vec![RawArtifact {
                        packagetype: Some("sdist".to_string()),
                        upload_time_iso_8601: Some(uploaded.to_string()),
                    }],
                )
            })
            .collect();
        self.releases.insert(package.to_string(), releases);
        self
    }

    pub fn with_failure(mut self, package: &str) -> Self {
        self.failing.push(package.to_string());
        self
    }

    /// Answer lookups of `package` with `source`
    pub fn with_delegate(mut self, package: &str, source: Arc<dyn ReleaseSource>) -> Self {
        self.delegated.insert(package.to_string(), source);
        self
    }
}

#[async_trait]
impl ReleaseSource for InMemorySource {
    async fn fetch_releases(&self, package_name: &str) -> Result<RawReleases, RegistryError> {
        if let Some(source) = self.delegated.get(package_name) {
            return source.fetch_releases(package_name).await;
        }
        if self.failing.iter().any(|p| p == package_name) {
            let err = serde_json::from_str::<RawReleases>("{\"releases\"").unwrap_err();
            return Err(RegistryError::Decode(err));
        }
        Ok(self.releases.get(package_name).cloned().unwrap_or_default())
    }
}

/// Distribution `name` installed at `version`
pub fn dist(name: &str, version: &str) -> LocalDistribution {
    LocalDistribution {
        name: name.to_string(),
        version: version.to_string(),
        path: PathBuf::from(format!("/site-packages/{name}-{version}.dist-info")),
    }
}

/// TCP server that accepts connections and never answers
pub async fn unresponsive_server() -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });
    (addr, handle)
}
