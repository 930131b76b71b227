//! Simple repository API (PEP 503 / PEP 691) client for alternate indexes

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::release::error::RegistryError;
use crate::release::http::HttpClient;
use crate::release::source::IndexSource;
use crate::release::types::{IndexEntry, SDIST};

/// Prefer the JSON form of the project page, accept HTML
const SIMPLE_ACCEPT: &str = "application/vnd.pypi.simple.v1+json, text/html;q=0.1";

const SDIST_SUFFIXES: &[&str] = &[".tar.gz", ".tar.bz2", ".tar.xz", ".tar.Z", ".tgz", ".tar", ".zip"];

static NAME_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("valid regex"));

static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});

/// Entities that show up in project page links
const HTML_ENTITIES: &[(&str, &str)] = &[
    ("&#43;", "+"),
    ("&#x2B;", "+"),
    ("&#x2b;", "+"),
    ("&#33;", "!"),
    ("&#x21;", "!"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
];

/// Client for a simple index such as a private mirror
pub struct SimpleIndex {
    http: HttpClient,
    endpoint: String,
}

impl SimpleIndex {
    pub fn new(http: HttpClient, endpoint: String) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }
}

/// JSON project page (PEP 691)
#[derive(Debug, Deserialize)]
struct ProjectPage {
    #[serde(default)]
    files: Vec<ProjectFile>,
}

#[derive(Debug, Deserialize)]
struct ProjectFile {
    filename: String,
}

#[async_trait]
impl IndexSource for SimpleIndex {
    async fn fetch_listing(&self, package_name: &str) -> Result<Vec<IndexEntry>, RegistryError> {
        let url = format!("{}/{}/", self.endpoint, normalize_name(package_name));

        let Some(body) = self.http.get(&url, SIMPLE_ACCEPT).await? else {
            debug!("Simple index has no project page for {}", package_name);
            return Ok(Vec::new());
        };

        let filenames = if body.trim_start().starts_with('{') {
            let page: ProjectPage = serde_json::from_str(&body)?;
            page.files.into_iter().map(|f| f.filename).collect()
        } else {
            ANCHOR_HREF
                .captures_iter(&body)
                .filter_map(|c| c.get(1).or_else(|| c.get(2)))
                .filter_map(|href| href_filename(href.as_str()))
                .collect::<Vec<_>>()
        };

        let entries: Vec<_> = filenames
            .iter()
            .map(|filename| parse_filename(package_name, filename))
            .collect();
        debug!(
            "Simple index lists {} files for {}",
            entries.len(),
            package_name
        );
        Ok(entries)
    }
}

/// File name of a project page link: the unescaped, percent-decoded last
/// path segment of the `href`
fn href_filename(href: &str) -> Option<String> {
    let href = HTML_ENTITIES
        .iter()
        .fold(href.to_string(), |acc, (entity, text)| acc.replace(entity, text));
    let path = href.split(['#', '?']).next().unwrap_or_default();
    let segment = path.rsplit('/').next().filter(|s| !s.is_empty())?;
    let filename = urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    Some(filename)
}

/// PEP 503 name normalization
pub fn normalize_name(name: &str) -> String {
    NAME_SEPARATORS.replace_all(name, "-").to_lowercase()
}

/// Recover the version and package type from a distribution file name
pub fn parse_filename(project: &str, filename: &str) -> IndexEntry {
    if let Some(stem) = filename.strip_suffix(".whl") {
        return IndexEntry {
            version: stem.split('-').nth(1).map(str::to_string),
            package_type: "bdist_wheel".to_string(),
        };
    }

    if let Some(stem) = filename.strip_suffix(".egg") {
        return IndexEntry {
            version: stem.split('-').nth(1).map(str::to_string),
            package_type: "bdist_egg".to_string(),
        };
    }

    if let Some(stem) = SDIST_SUFFIXES
        .iter()
        .find_map(|suffix| filename.strip_suffix(suffix))
    {
        return IndexEntry {
            version: split_project_version(project, stem),
            package_type: SDIST.to_string(),
        };
    }

    IndexEntry {
        version: None,
        package_type: "unknown".to_string(),
    }
}

/// Split `{project}-{version}` where the project part may itself contain dashes
fn split_project_version(project: &str, stem: &str) -> Option<String> {
    let project = normalize_name(project);
    stem.match_indices('-')
        .map(|(i, _)| i)
        .find(|&i| normalize_name(&stem[..i]) == project)
        .map(|i| stem[i + 1..].to_string())
        .filter(|version| !version.is_empty())
}
