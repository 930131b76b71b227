//! Tree report for the terminal

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::package::Package;
use crate::release::types::Release;
use crate::report::humanize::natural_delta;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";

/// One line describing a package
fn package_line(pkg: &Package, now: DateTime<Utc>) -> String {
    let mut line = format!("{} {}", pkg.name(), pkg.version());

    if let Some(at) = pkg.current_release().and_then(Release::uploaded_at) {
        line.push(' ');
        line.push_str(&natural_delta(now - at));
    }

    if let Some(latest) = pkg.latest_release().filter(|_| !pkg.is_up_to_date()) {
        line.push_str(&format!(" remote {}", latest.version));
        if let Some(at) = latest.uploaded_at() {
            line.push(' ');
            line.push_str(&natural_delta(now - at));
        }
    }

    if let Some(error) = pkg.error() {
        line.push_str(&format!(" failed: {error}"));
    }
    line
}

/// Write already sorted packages as a tree rooted at the interpreter
pub fn write_tree<W: Write>(
    out: &mut W,
    python: &Path,
    packages: &[Package],
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    writeln!(out, "Distributions within {}", python.display())?;
    for (i, pkg) in packages.iter().enumerate() {
        let branch = if i + 1 == packages.len() { LAST_BRANCH } else { BRANCH };
        writeln!(out, "{branch}{}", package_line(pkg, now))?;
    }
    Ok(())
}
