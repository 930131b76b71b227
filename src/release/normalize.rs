//! Normalization of the JSON API `releases` payload into a [`ReleaseHistory`]

use chrono::{DateTime, Duration, Utc};

use crate::release::error::RegistryError;
use crate::release::types::{RawReleases, Release, ReleaseArtifact, ReleaseHistory, SDIST};

/// Convert a raw `releases` payload into an ordered release history.
///
/// Versions without any published file get a single synthesized `sdist`
/// artifact dated one second before the previously processed version, so
/// every version has a time to order by. Processing walks the versions in
/// descending string order and anchors the first synthesized time at `now`.
///
/// # Errors
/// Returns [`RegistryError::InvalidTimestamp`] if any upload time fails to parse.
pub fn normalize(raw: RawReleases, now: DateTime<Utc>) -> Result<ReleaseHistory, RegistryError> {
    let mut entries: Vec<_> = raw.into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| b.cmp(a));

    let mut previous_at = now;
    let mut releases = Vec::with_capacity(entries.len());

    for (version, raw_artifacts) in entries {
        let release = if raw_artifacts.is_empty() {
            previous_at -= Duration::seconds(1);
            Release::new(
                version.as_str(),
                vec![ReleaseArtifact {
                    version: version.clone(),
                    package_type: SDIST.to_string(),
                    uploaded_at: Some(previous_at),
                }],
            )
        } else {
            let artifacts = raw_artifacts
                .into_iter()
                .map(|raw| -> Result<ReleaseArtifact, RegistryError> {
                    Ok(ReleaseArtifact {
                        version: version.clone(),
                        package_type: raw.packagetype.unwrap_or_else(|| SDIST.to_string()),
                        uploaded_at: raw
                            .upload_time_iso_8601
                            .as_deref()
                            .map(|value| parse_upload_time(&version, value))
                            .transpose()?,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let release = Release::new(version.as_str(), artifacts);
            if let Some(uploaded_at) = release.uploaded_at() {
                previous_at = uploaded_at;
            }
            release
        };
        releases.push(release);
    }

    Ok(ReleaseHistory::from_releases(releases))
}

/// Parse an ISO-8601 upload time; a `Z` suffix means UTC.
fn parse_upload_time(version: &str, value: &str) -> Result<DateTime<Utc>, RegistryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| RegistryError::InvalidTimestamp {
            version: version.to_string(),
            value: value.to_string(),
            source,
        })
}
