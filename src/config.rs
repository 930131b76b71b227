use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// Defaults
// =============================================================================

/// Default number of parallel requests to the package index
pub const DEFAULT_JOBS: usize = 10;

/// Default time a cached response stays fresh, in seconds (1 hour)
pub const DEFAULT_CACHE_DURATION_SECS: i64 = 3600;

/// Timeout for a single HTTP request in milliseconds (30 seconds)
pub const REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Base URL of the JSON API
pub const DEFAULT_PYPI_URL: &str = "https://pypi.org";

/// Simple index that the JSON API already covers
pub const DEFAULT_SIMPLE_INDEX: &str = "https://pypi.org/simple";

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "PYPI_CHANGES_LOG";

/// How long cached responses may be served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDuration {
    /// Never read from or write to the cache
    Bypass,
    /// Cached responses never go stale
    Forever,
    /// Cached responses go stale after the given duration
    For(Duration),
}

impl CacheDuration {
    /// `0` bypasses the cache, negative values cache forever,
    /// positive values are seconds.
    pub fn from_secs(secs: i64) -> Self {
        match secs {
            0 => Self::Bypass,
            s if s < 0 => Self::Forever,
            s => Self::For(Duration::from_secs(s.unsigned_abs())),
        }
    }
}

impl Default for CacheDuration {
    fn default() -> Self {
        Self::from_secs(DEFAULT_CACHE_DURATION_SECS)
    }
}

/// Where release data is fetched from
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FetchConfig {
    /// Base URL of the JSON API (`{base}/pypi/{name}/json`)
    pub pypi_url: String,
    /// Simple index used to enrich the JSON API data, if any
    pub secondary_index: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            pypi_url: DEFAULT_PYPI_URL.to_string(),
            secondary_index: None,
        }
    }
}

impl FetchConfig {
    /// Enable the simple index only when it is not the default PyPI one
    pub fn with_index_url(mut self, index_url: Option<&str>) -> Self {
        self.secondary_index = index_url
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty() && *url != DEFAULT_SIMPLE_INDEX)
            .map(str::to_string);
        self
    }
}

/// Returns the cache directory for pypi-changes.
/// Uses $XDG_CACHE_HOME/pypi-changes if XDG_CACHE_HOME is set,
/// otherwise falls back to ~/.cache/pypi-changes,
/// or ./pypi-changes if neither is available.
pub fn cache_dir() -> PathBuf {
    cache_dir_with_env(std::env::var("XDG_CACHE_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the response cache database.
pub fn cache_db_path() -> PathBuf {
    cache_dir().join("requests.sqlite")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    cache_dir().join("pypi-changes.log")
}

fn cache_dir_with_env(xdg_cache_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let cache_dir = xdg_cache_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".cache")))
        .unwrap_or_else(|| PathBuf::from("."));

    cache_dir.join("pypi-changes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(0, CacheDuration::Bypass)]
    #[case(-1, CacheDuration::Forever)]
    #[case(-3600, CacheDuration::Forever)]
    #[case(3600, CacheDuration::For(Duration::from_secs(3600)))]
    fn cache_duration_from_secs_returns_expected(
        #[case] secs: i64,
        #[case] expected: CacheDuration,
    ) {
        assert_eq!(CacheDuration::from_secs(secs), expected);
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("https://pypi.org/simple"), None)]
    #[case(Some("https://pypi.org/simple/"), None)]
    #[case(Some(""), None)]
    #[case(
        Some("https://mirror.example.com/simple/"),
        Some("https://mirror.example.com/simple")
    )]
    fn with_index_url_only_enables_non_default_index(
        #[case] index_url: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let config = FetchConfig::default().with_index_url(index_url);

        assert_eq!(config.secondary_index.as_deref(), expected);
        assert_eq!(config.pypi_url, DEFAULT_PYPI_URL);
    }

    #[test]
    fn fetch_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<FetchConfig>(json!({
            "secondaryIndex": "https://mirror.example.com/simple"
        }))
        .unwrap();

        assert_eq!(
            result,
            FetchConfig {
                pypi_url: DEFAULT_PYPI_URL.to_string(),
                secondary_index: Some("https://mirror.example.com/simple".to_string()),
            }
        );
    }

    #[test]
    fn cache_dir_with_env_uses_xdg_cache_home_when_set() {
        let path = cache_dir_with_env(
            Some("/tmp/test-cache".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-cache/pypi-changes"));
    }

    #[test]
    fn cache_dir_with_env_falls_back_to_home_cache() {
        let path = cache_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(path, PathBuf::from("/home/user/.cache/pypi-changes"));
    }

    #[test]
    fn cache_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = cache_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./pypi-changes"));
    }
}
