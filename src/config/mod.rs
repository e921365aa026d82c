//! Project configuration
//!
//! Read from `faultline.toml` in the project root. Everything has a
//! default, so a project without a config file still syncs and analyzes;
//! the file exists to pin the work-item pattern, restrict extensions, and
//! define classification groups for the classified coupling view.

use crate::history::PathFilter;
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Config file name, looked up in the project root
pub const CONFIG_FILE: &str = "faultline.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub contributions: ContributionsConfig,
    #[serde(default)]
    pub coupling: CouplingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Regular expression extracting work-item tokens from commit comments.
    /// Empty disables extraction.
    #[serde(default = "default_work_item_pattern")]
    pub work_item_pattern: String,
    /// Extension allow-list for summaries; empty means no restriction
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Path substrings excluded from summaries
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            work_item_pattern: default_work_item_pattern(),
            extensions: Vec::new(),
            exclude: default_exclude(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContributionsConfig {
    /// Worker bound for the attribution batch
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for ContributionsConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CouplingConfig {
    /// Classification rules for the classified coupling view, first match
    /// wins
    #[serde(default)]
    pub classify: Vec<ClassifyRule>,
}

/// Buckets every path containing `contains` into `group`
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyRule {
    pub contains: String,
    pub group: String,
}

fn default_work_item_pattern() -> String {
    "#[0-9]+".to_string()
}

fn default_exclude() -> Vec<String> {
    vec![
        "target/".to_string(),
        "node_modules/".to_string(),
        "vendor/".to_string(),
        ".git/".to_string(),
    ]
}

fn default_workers() -> usize {
    crate::analysis::contribution::DEFAULT_WORKERS
}

impl ProjectConfig {
    /// Compiled work-item pattern; `None` when extraction is disabled
    pub fn work_item_regex(&self) -> Result<Option<Regex>> {
        if self.history.work_item_pattern.is_empty() {
            return Ok(None);
        }
        let regex = Regex::new(&self.history.work_item_pattern).with_context(|| {
            format!(
                "invalid work_item_pattern {:?} in {CONFIG_FILE}",
                self.history.work_item_pattern
            )
        })?;
        Ok(Some(regex))
    }

    /// Extension allow-list, lowercased with leading dots stripped
    pub fn known_extensions(&self) -> HashSet<String> {
        self.history
            .extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .collect()
    }

    pub fn path_filter(&self) -> PathFilter {
        PathFilter::new(self.history.exclude.clone())
    }

    /// Group key for a path under the configured classification rules,
    /// empty when no rule matches
    pub fn classify_path(&self, server_path: &str) -> String {
        self.coupling
            .classify
            .iter()
            .find(|rule| server_path.contains(rule.contains.as_str()))
            .map(|rule| rule.group.clone())
            .unwrap_or_default()
    }
}

/// Load `faultline.toml` from the project root. A missing file yields the
/// defaults; a file that exists but does not parse is an error, not a
/// silent fallback.
pub fn load_project_config(project_base: &Path) -> Result<ProjectConfig> {
    let path = project_base.join(CONFIG_FILE);
    if !path.exists() {
        debug!("no {CONFIG_FILE} found, using defaults");
        return Ok(ProjectConfig::default());
    }

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: ProjectConfig =
        toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    debug!("loaded project config from {}", path.display());
    Ok(config)
}
