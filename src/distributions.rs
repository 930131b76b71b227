//! Discovery of the distributions installed for a Python interpreter

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

static DIST_DIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([A-Z0-9]|[A-Z0-9][A-Z0-9._-]*[A-Z0-9])(\.egg-info|\.dist-info)$")
        .expect("valid regex")
});

/// Script printing the interpreter's module search path as JSON
const SYS_PATH_SCRIPT: &str = "import sys, json; print(json.dumps(sys.path))";

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to run {path:?}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path:?} exited with {status}: {stderr}")]
    Interpreter {
        path: PathBuf,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Invalid sys.path output: {0}")]
    InvalidOutput(#[from] serde_json::Error),
}

/// An installed distribution as found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDistribution {
    pub name: String,
    pub version: String,
    /// The `.dist-info` / `.egg-info` directory
    pub path: PathBuf,
}

/// Ask `python` for its module search path
pub fn interpreter_paths(python: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let output = Command::new(python)
        .args(["-c", SYS_PATH_SCRIPT])
        .output()
        .map_err(|source| DiscoveryError::Spawn {
            path: python.to_path_buf(),
            source,
        })?;

    if !output.status.success() {
        return Err(DiscoveryError::Interpreter {
            path: python.to_path_buf(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let paths: Vec<PathBuf> = serde_json::from_slice(&output.stdout)?;
    debug!("{:?} searches {} paths", python, paths.len());
    Ok(paths)
}

/// Find distributions below `paths`, first occurrence of a name wins
pub fn discover(paths: &[PathBuf]) -> Vec<LocalDistribution> {
    let mut seen_dirs = HashSet::new();
    let mut seen_names = HashSet::new();
    let mut distributions = Vec::new();

    for raw_path in paths {
        let Ok(path) = raw_path.canonicalize() else {
            continue;
        };
        if !seen_dirs.insert(path.clone()) {
            continue;
        }
        let Ok(entries) = fs::read_dir(&path) else {
            continue;
        };

        let mut candidates: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|candidate| candidate.is_dir())
            .filter(|candidate| {
                candidate
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| DIST_DIR.is_match(n))
            })
            .collect();
        candidates.sort();

        for candidate in candidates {
            let Some(dist) = read_distribution(&candidate) else {
                debug!("Skipping {:?}: no usable metadata", candidate);
                continue;
            };
            if seen_names.insert(dist.name.clone()) {
                distributions.push(dist);
            }
        }
    }

    info!("Discovered {} distributions", distributions.len());
    distributions
}

/// Read name and version from a metadata directory
fn read_distribution(dir: &Path) -> Option<LocalDistribution> {
    let metadata = ["METADATA", "PKG-INFO"]
        .iter()
        .find_map(|file| fs::read_to_string(dir.join(file)).ok())?;
    let (name, version) = parse_metadata(&metadata)?;
    Some(LocalDistribution {
        name,
        version,
        path: dir.to_path_buf(),
    })
}

/// Extract `Name` and `Version` from core metadata headers
fn parse_metadata(metadata: &str) -> Option<(String, String)> {
    let mut name = None;
    let mut version = None;
    for line in metadata.lines() {
        if line.trim().is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            match key.trim() {
                "Name" if name.is_none() => name = Some(value.trim().to_string()),
                "Version" if version.is_none() => version = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }
    Some((name.filter(|n| !n.is_empty())?, version?))
}
