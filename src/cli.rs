//! Command line options

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::config::{CacheDuration, DEFAULT_CACHE_DURATION_SECS, DEFAULT_JOBS, FetchConfig, cache_db_path};
use crate::report::SortOrder;

/// Report format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Tree,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "pypi-changes")]
#[command(version, about = "Show which installed Python distributions are outdated on PyPI")]
pub struct Cli {
    /// Python interpreter to inspect
    #[arg(value_name = "PYTHON_EXE", value_parser = existing_path)]
    pub python: PathBuf,

    /// Maximum number of parallel requests when loading release information
    #[arg(short, long, default_value_t = DEFAULT_JOBS, value_name = "COUNT")]
    pub jobs: usize,

    /// Requests are cached to disk in this SQLite file
    #[arg(short, long, default_value_os_t = cache_db_path(), value_name = "PATH")]
    pub cache_path: PathBuf,

    /// Seconds requests stay cached (0 bypasses the cache, -1 caches forever)
    #[arg(
        short = 'd',
        long,
        default_value_t = DEFAULT_CACHE_DURATION_SECS,
        allow_negative_numbers = true,
        value_name = "SEC"
    )]
    pub cache_duration: i64,

    /// Sort output alphabetically
    #[arg(short, long, action = ArgAction::SetTrue, conflicts_with = "updated")]
    pub alphabetic: bool,

    /// Sort by most recent release (default)
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub updated: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Tree)]
    pub output: OutputFormat,

    /// Alternate simple index to merge releases from
    #[arg(long, env = "PIP_INDEX_URL", value_name = "URL")]
    pub index_url: Option<String>,
}

impl Cli {
    pub fn sort_order(&self) -> SortOrder {
        if self.alphabetic {
            SortOrder::Alphabetic
        } else {
            SortOrder::Updated
        }
    }

    pub fn cache_duration(&self) -> CacheDuration {
        CacheDuration::from_secs(self.cache_duration)
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig::default().with_index_url(self.index_url.as_deref())
    }
}

/// Accept only paths that exist, resolved to an absolute path
fn existing_path(value: &str) -> Result<PathBuf, String> {
    let path = std::path::absolute(value).map_err(|e| e.to_string())?;
    if !path.exists() {
        return Err(format!("path {} does not exist", path.display()));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("pypi-changes").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_are_applied() {
        let cli = parse(&["/"]).unwrap();

        assert_eq!(cli.python, PathBuf::from("/"));
        assert_eq!(cli.jobs, DEFAULT_JOBS);
        assert_eq!(cli.cache_duration(), CacheDuration::default());
        assert_eq!(cli.sort_order(), SortOrder::Updated);
        assert_eq!(cli.output, OutputFormat::Tree);
    }

    #[test]
    fn options_are_parsed() {
        let cli = parse(&["-j", "3", "-d", "-1", "-a", "-o", "json", "-c", "/tmp/x.sqlite", "/"])
            .unwrap();

        assert_eq!(cli.jobs, 3);
        assert_eq!(cli.cache_duration(), CacheDuration::Forever);
        assert_eq!(cli.sort_order(), SortOrder::Alphabetic);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.cache_path, PathBuf::from("/tmp/x.sqlite"));
    }

    #[test]
    fn index_url_enables_secondary_index() {
        let cli = parse(&["--index-url", "https://mirror.example.com/simple/", "/"]).unwrap();

        assert_eq!(
            cli.fetch_config().secondary_index.as_deref(),
            Some("https://mirror.example.com/simple")
        );
    }

    #[test]
    fn missing_interpreter_is_rejected() {
        let err = parse(&["/definitely/not/python"]).unwrap_err();

        assert!(err.to_string().contains("does not exist"));
    }
}
