//! Per-project state under `.faultline/`
//!
//! Path layout helpers plus the contribution cache. The cache is one JSON
//! document, written as a whole on every update and read back verbatim; a
//! missing file when ownership data is requested surfaces as a
//! must-resynchronize error, never as silently empty data.

use crate::error::CacheError;
use crate::models::{Contribution, MainDeveloper};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name for per-project state, alongside the working tree
pub const STATE_DIR: &str = ".faultline";

pub fn state_dir(project_base: &Path) -> PathBuf {
    project_base.join(STATE_DIR)
}

/// The synced copy of the raw log export
pub fn history_log_path(project_base: &Path) -> PathBuf {
    state_dir(project_base).join("history.log")
}

pub fn contribution_cache_path(project_base: &Path) -> PathBuf {
    state_dir(project_base).join("contributions.json")
}

pub fn aliases_path(project_base: &Path) -> PathBuf {
    state_dir(project_base).join("aliases")
}

pub fn ensure_state_dir(project_base: &Path) -> std::io::Result<PathBuf> {
    let dir = state_dir(project_base);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Whole-map contribution cache: server path → developer → line count
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContributionCache {
    entries: BTreeMap<String, Contribution>,
}

impl ContributionCache {
    pub fn new(entries: BTreeMap<String, Contribution>) -> Self {
        Self { entries }
    }

    /// Read the cache file. A missing file means ownership analysis has
    /// not run since the last sync.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                CacheError::MissingContributions {
                    path: path.to_path_buf(),
                }
            } else {
                CacheError::Io {
                    path: path.to_path_buf(),
                    source: err,
                }
            }
        })?;
        let cache: Self = serde_json::from_str(&text).map_err(|source| CacheError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loaded {} cached contributions", cache.entries.len());
        Ok(cache)
    }

    /// Serialize the whole map and overwrite the cache file.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let text = serde_json::to_string_pretty(self).map_err(|source| CacheError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, text).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "saved {} contributions to {}",
            self.entries.len(),
            path.display()
        );
        Ok(())
    }

    /// Delete the cache file. Fine to call when it does not exist.
    pub fn remove_file(path: &Path) -> Result<(), CacheError> {
        match std::fs::remove_file(path) {
            Ok(()) => {
                debug!("removed contribution cache {}", path.display());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn get(&self, server_path: &str) -> Option<&Contribution> {
        self.entries.get(server_path)
    }

    pub fn entries(&self) -> &BTreeMap<String, Contribution> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Per-file main developer for every cached path that has one
    pub fn main_developers(&self) -> BTreeMap<String, MainDeveloper> {
        self.entries
            .iter()
            .filter_map(|(path, contribution)| {
                contribution
                    .main_developer()
                    .map(|main| (path.clone(), main))
            })
            .collect()
    }

    /// Distinct developer names across all cached contributions
    pub fn developers(&self) -> BTreeSet<String> {
        self.entries
            .values()
            .flat_map(|contribution| contribution.developers().map(str::to_string))
            .collect()
    }
}
