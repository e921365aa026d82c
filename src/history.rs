//! Change-set history and the per-file artifact summary
//!
//! The history is the parse result handed to every analysis pass: an
//! ordered list of commits, each with typed change items. Aggregation is
//! identity-based, so a file keeps one artifact across renames.

use crate::models::{Artifact, ChangeSet, FileId, WarningMessage};
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use tracing::debug;

/// Excludes paths from summaries by substring match. An empty filter
/// accepts everything.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    exclude_substrings: Vec<String>,
}

impl PathFilter {
    pub fn new(exclude_substrings: Vec<String>) -> Self {
        Self { exclude_substrings }
    }

    pub fn accept_all() -> Self {
        Self::default()
    }

    pub fn accepts(&self, server_path: &str) -> bool {
        !self
            .exclude_substrings
            .iter()
            .any(|needle| server_path.contains(needle.as_str()))
    }
}

/// Ordered sequence of change sets, in export order
#[derive(Debug, Clone, Default)]
pub struct ChangeSetHistory {
    change_sets: Vec<ChangeSet>,
}

impl ChangeSetHistory {
    pub fn new(change_sets: Vec<ChangeSet>) -> Self {
        Self { change_sets }
    }

    pub fn change_sets(&self) -> &[ChangeSet] {
        &self.change_sets
    }

    /// Number of commits
    pub fn len(&self) -> usize {
        self.change_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.change_sets.is_empty()
    }

    /// Distinct committer names across the whole history, sorted
    pub fn committers(&self) -> BTreeSet<String> {
        self.change_sets
            .iter()
            .map(|change_set| change_set.committer.clone())
            .collect()
    }

    /// Aggregate the history into one artifact per file identity.
    ///
    /// Counts commits, collects committers and work-item tokens (matches of
    /// `work_item_pattern` in each comment), and keeps the path, revision
    /// id and date of the latest change. Files are excluded when the path
    /// filter rejects them or when their extension is not in
    /// `known_extensions` (compared lowercased, without the leading dot; an
    /// empty set means no extension restriction). Artifacts come back
    /// sorted by server path.
    pub fn artifact_summary(
        &self,
        filter: &PathFilter,
        known_extensions: &HashSet<String>,
        work_item_pattern: Option<&Regex>,
    ) -> Vec<Artifact> {
        let mut by_id: HashMap<FileId, Artifact> = HashMap::new();

        for change_set in &self.change_sets {
            for item in &change_set.items {
                if !filter.accepts(&item.server_path) {
                    continue;
                }
                if !extension_allowed(&item.server_path, known_extensions) {
                    continue;
                }

                let artifact = by_id.entry(item.id).or_insert_with(|| Artifact {
                    id: item.id,
                    server_path: item.server_path.clone(),
                    local_path: item.local_path.clone(),
                    revision: change_set.id.clone(),
                    commits: 0,
                    committers: BTreeSet::new(),
                    work_items: BTreeSet::new(),
                    last_change: change_set.date,
                });

                artifact.commits += 1;
                artifact.committers.insert(change_set.committer.clone());
                if let Some(pattern) = work_item_pattern {
                    for token in pattern.find_iter(&change_set.comment) {
                        artifact.work_items.insert(token.as_str().to_string());
                    }
                }
                if change_set.date > artifact.last_change {
                    artifact.last_change = change_set.date;
                    artifact.revision = change_set.id.clone();
                    artifact.server_path = item.server_path.clone();
                    artifact.local_path = item.local_path.clone();
                }
            }
        }

        let mut artifacts: Vec<Artifact> = by_id.into_values().collect();
        artifacts.sort_by(|a, b| a.server_path.cmp(&b.server_path));
        debug!("summarized {} artifacts from history", artifacts.len());
        artifacts
    }

    /// Drop every change item whose local file no longer exists on disk.
    ///
    /// A deleted file cannot be inspected anymore (blamed, opened), so
    /// keeping its items would attribute coupling and ownership to nothing.
    /// Mutates the history in place; running it again is a no-op. Returns
    /// one warning per removed path.
    pub fn cleanup(&mut self) -> Vec<WarningMessage> {
        let mut removed: BTreeSet<String> = BTreeSet::new();

        for change_set in &mut self.change_sets {
            change_set.items.retain(|item| {
                if item.local_path.is_file() {
                    true
                } else {
                    removed.insert(item.server_path.clone());
                    false
                }
            });
        }

        if !removed.is_empty() {
            debug!("cleanup removed {} paths from history", removed.len());
        }
        removed
            .into_iter()
            .map(|path| WarningMessage::new(path, "not on disk; removed from history"))
            .collect()
    }
}

fn extension_allowed(server_path: &str, known_extensions: &HashSet<String>) -> bool {
    if known_extensions.is_empty() {
        return true;
    }
    match Path::new(server_path).extension().and_then(|e| e.to_str()) {
        Some(ext) => known_extensions.contains(&ext.to_ascii_lowercase()),
        None => false,
    }
}
