//! Concurrent release lookup for all discovered distributions

use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info};

use crate::distributions::LocalDistribution;
use crate::package::Package;
use crate::release::error::RegistryError;
use crate::release::fetcher::ReleaseFetcher;
use crate::release::types::FetchResult;

const PROGRESS_TEMPLATE: &str =
    "{msg} {wide_bar:.cyan/blue} {pos}/{len} {percent:>3}% {per_sec} {eta}";

/// Progress bar for `total` lookups, drawn on stderr and cleared when done
pub fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.set_message("Acquire release information");
    bar
}

/// Look up every distribution with at most `jobs` requests in flight.
///
/// Each lookup runs as its own task on the runtime's worker threads.
/// Packages are yielded in completion order, one per distribution, whether
/// the lookup succeeded or not. `progress` advances once per completion.
pub fn resolve_all(
    fetcher: Arc<ReleaseFetcher>,
    distributions: Vec<LocalDistribution>,
    jobs: usize,
    progress: ProgressBar,
) -> impl Stream<Item = Package> {
    let jobs = jobs.max(1);
    info!(
        "Resolving {} distributions with {} parallel requests",
        distributions.len(),
        jobs
    );

    stream::iter(distributions)
        .map(move |distribution| {
            let fetcher = Arc::clone(&fetcher);
            async move {
                let fallback = distribution.clone();
                let task = tokio::spawn(async move {
                    let result = fetcher.fetch(&distribution.name).await;
                    debug!("Resolved {}", distribution.name);
                    (distribution, result)
                });
                match task.await {
                    Ok((distribution, result)) => Package::new(distribution, result),
                    Err(e) => {
                        error!("Lookup task for {} failed: {}", fallback.name, e);
                        Package::new(fallback, FetchResult::Failed(RegistryError::Task(e)))
                    }
                }
            }
        })
        .buffer_unordered(jobs)
        .inspect(move |_| progress.inc(1))
}
