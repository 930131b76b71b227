//! Presentation of resolved packages
//!
//! # Modules
//!
//! - [`humanize`]: Natural-language elapsed time
//! - [`json`]: Machine-readable JSON report
//! - [`tree`]: Human-readable tree report

pub mod humanize;
pub mod json;
pub mod tree;

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::package::Package;

/// How packages are ordered in a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// By name, case-insensitive
    Alphabetic,
    /// Most recently released first
    #[default]
    Updated,
}

/// Most recent release first, then name ascending
fn by_recency(a: &Package, b: &Package, now: DateTime<Utc>) -> Ordering {
    b.last_release_at(now)
        .cmp(&a.last_release_at(now))
        .then_with(|| a.name().cmp(b.name()))
}

/// Sort packages for display. Completion order of the lookups never leaks
/// into the result.
pub fn sort_packages(packages: &mut [Package], order: SortOrder, now: DateTime<Utc>) {
    match order {
        SortOrder::Alphabetic => packages.sort_by_cached_key(|p| p.name().to_lowercase()),
        SortOrder::Updated => packages.sort_by(|a, b| by_recency(a, b, now)),
    }
}
