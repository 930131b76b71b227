use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use futures::StreamExt;
use indicatif::ProgressBar;
use tracing::{error, info};

use pypi_changes::cli::{Cli, OutputFormat};
use pypi_changes::config::log_path;
use pypi_changes::distributions::{discover, interpreter_paths};
use pypi_changes::package::Package;
use pypi_changes::release::cache::ResponseCache;
use pypi_changes::release::fetcher::ReleaseFetcher;
use pypi_changes::release::http::HttpClient;
use pypi_changes::report::json::write_json;
use pypi_changes::report::sort_packages;
use pypi_changes::report::tree::write_tree;
use pypi_changes::resolve::{progress_bar, resolve_all};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = pypi_changes::logging::init(&log_path())?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
        .inspect_err(|e| error!("{:#}", e))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let spinner = ProgressBar::new_spinner().with_message("Discovering distributions");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let paths = interpreter_paths(&cli.python)?;
    let distributions = discover(&paths);
    spinner.finish_and_clear();

    if let Some(dir) = cli.cache_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let cache = ResponseCache::new(&cli.cache_path, cli.cache_duration())?;
    cache.purge_expired(Utc::now())?;

    let fetcher = Arc::new(ReleaseFetcher::from_config(
        &cli.fetch_config(),
        HttpClient::new(Some(Arc::new(cache))),
    ));

    let progress = progress_bar(distributions.len());
    let mut packages: Vec<Package> = resolve_all(fetcher, distributions, cli.jobs, progress.clone())
        .collect()
        .await;
    progress.finish_and_clear();

    let failed = packages.iter().filter(|p| p.error().is_some()).count();
    info!("Resolved {} packages, {} failed", packages.len(), failed);

    let now = Utc::now();
    sort_packages(&mut packages, cli.sort_order(), now);

    let mut out = std::io::stdout().lock();
    match cli.output {
        OutputFormat::Tree => write_tree(&mut out, &cli.python, &packages, now)?,
        OutputFormat::Json => write_json(&mut out, &packages, now)?,
    }
    out.flush()?;
    Ok(())
}
