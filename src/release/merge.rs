//! Enrichment of a JSON API release history with a simple-index listing

use indexmap::IndexMap;
use tracing::debug;

use crate::release::types::{IndexEntry, Release, ReleaseArtifact, ReleaseHistory};

/// Add versions that only the simple index knows about.
///
/// Versions already present in `primary` are kept as they are. Versions that
/// only appear in `listing` are added with untimed artifacts, and entries
/// without a version are ignored.
pub fn merge(primary: ReleaseHistory, listing: Vec<IndexEntry>) -> ReleaseHistory {
    let mut missing: IndexMap<String, Vec<ReleaseArtifact>> = IndexMap::new();
    for entry in listing {
        let Some(version) = entry.version else {
            continue;
        };
        if primary.contains(&version) {
            continue;
        }
        missing
            .entry(version.clone())
            .or_default()
            .push(ReleaseArtifact {
                version,
                package_type: entry.package_type,
                uploaded_at: None,
            });
    }

    if missing.is_empty() {
        return primary;
    }

    debug!("Adding {} versions from the simple index", missing.len());
    let added = missing
        .into_iter()
        .map(|(version, artifacts)| Release::new(version, artifacts));
    ReleaseHistory::from_releases(added.chain(primary))
}
