//! JSON report

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::package::Package;
use crate::release::types::Release;
use crate::report::humanize::natural_delta;

#[derive(Debug, Serialize)]
struct PackageReport<'a> {
    name: &'a str,
    version: &'a str,
    up_to_date: bool,
    current: ReleaseReport<'a>,
    latest: Option<ReleaseReport<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReleaseReport<'a> {
    version: &'a str,
    date: Option<String>,
    since: Option<String>,
}

impl<'a> ReleaseReport<'a> {
    fn new(version: &'a str, release: Option<&Release>, now: DateTime<Utc>) -> Self {
        let uploaded_at = release.and_then(Release::uploaded_at);
        Self {
            version,
            date: uploaded_at.map(|at| at.to_rfc3339()),
            since: uploaded_at.map(|at| natural_delta(now - at)),
        }
    }
}

fn package_report(pkg: &Package, now: DateTime<Utc>) -> PackageReport<'_> {
    PackageReport {
        name: pkg.name(),
        version: pkg.version(),
        up_to_date: pkg.is_up_to_date(),
        current: ReleaseReport::new(pkg.version(), pkg.current_release(), now),
        latest: pkg
            .latest_release()
            .map(|latest| ReleaseReport::new(&latest.version, Some(latest), now)),
        error: pkg.error().map(ToString::to_string),
    }
}

/// Write already sorted packages as a pretty-printed JSON array
pub fn write_json<W: Write>(out: &mut W, packages: &[Package], now: DateTime<Utc>) -> anyhow::Result<()> {
    let reports: Vec<_> = packages.iter().map(|pkg| package_report(pkg, now)).collect();
    serde_json::to_writer_pretty(&mut *out, &reports)?;
    writeln!(out)?;
    Ok(())
}
