//! Core data models for Faultline
//!
//! These models represent commits, the files they touched, and the derived
//! coupling/ownership results used throughout the codebase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Stable identity of a file across its whole lifetime, including renames.
///
/// Two change items referring to the same underlying file resolve to the
/// same `FileId` even when the path changed in between. Assigned by the
/// rename tracker during parsing; meaningless across separate parses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct FileId(pub u64);

/// How a commit touched a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    #[default]
    Edit,
    Delete,
    Rename,
    /// Unclassified kind code. Recorded, never dropped silently.
    None,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Add => write!(f, "add"),
            ChangeKind::Edit => write!(f, "edit"),
            ChangeKind::Delete => write!(f, "delete"),
            ChangeKind::Rename => write!(f, "rename"),
            ChangeKind::None => write!(f, "none"),
        }
    }
}

/// One file's change record within a commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeItem {
    pub kind: ChangeKind,
    /// Stable identity assigned by the rename tracker
    pub id: FileId,
    /// Current repository-relative path, decoded
    pub server_path: String,
    /// Where the file lives under the project root
    pub local_path: PathBuf,
    /// For renames, the decoded path the file moved away from
    #[serde(default)]
    pub renamed_from: Option<String>,
}

/// One commit: header fields plus the files it touched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Opaque commit identifier, not necessarily numeric
    pub id: String,
    pub committer: String,
    pub date: DateTime<Utc>,
    pub comment: String,
    pub items: Vec<ChangeItem>,
}

/// Per-file aggregate derived from the full history.
///
/// Computed fresh from a `ChangeSetHistory` snapshot; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: FileId,
    pub server_path: String,
    pub local_path: PathBuf,
    /// Commit id of the latest change
    pub revision: String,
    /// Number of commits touching the file
    pub commits: usize,
    pub committers: BTreeSet<String>,
    pub work_items: BTreeSet<String>,
    pub last_change: DateTime<Utc>,
}

/// Co-change relationship between two files (or two classification groups)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupling {
    pub item1: String,
    pub item2: String,
    /// Commits in which both members appear
    pub co_changes: u32,
    /// Co-change count normalized by the less frequently changed member
    pub degree: f64,
}

/// Dominant developer for one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainDeveloper {
    pub developer: String,
    /// Share of attributed lines, 0.0 to 100.0
    pub percent: f64,
}

/// Per-developer line ownership for one file, from blame/annotate text
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Contribution {
    lines_by_developer: BTreeMap<String, u32>,
}

impl Contribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute one more line to `developer`
    pub fn add_line(&mut self, developer: &str) {
        *self
            .lines_by_developer
            .entry(developer.to_string())
            .or_insert(0) += 1;
    }

    pub fn lines_for(&self, developer: &str) -> u32 {
        self.lines_by_developer.get(developer).copied().unwrap_or(0)
    }

    pub fn total_lines(&self) -> u32 {
        self.lines_by_developer.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines_by_developer.is_empty()
    }

    /// Developer names in sorted order
    pub fn developers(&self) -> impl Iterator<Item = &str> {
        self.lines_by_developer.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.lines_by_developer
            .iter()
            .map(|(developer, &lines)| (developer.as_str(), lines))
    }

    /// Developer with the most attributed lines and their ownership share.
    ///
    /// Ties resolve to the lexicographically smallest name: names are
    /// visited in sorted order and the running maximum is replaced only on
    /// a strictly greater count. Returns `None` when no lines were
    /// attributed at all.
    pub fn main_developer(&self) -> Option<MainDeveloper> {
        let total = self.total_lines();
        if total == 0 {
            return None;
        }
        let mut best: Option<(&str, u32)> = None;
        for (developer, &lines) in &self.lines_by_developer {
            match best {
                Some((_, max)) if lines <= max => {}
                _ => best = Some((developer, lines)),
            }
        }
        best.map(|(developer, lines)| MainDeveloper {
            developer: developer.to_string(),
            percent: 100.0 * f64::from(lines) / f64::from(total),
        })
    }
}

/// User-facing warning produced during analysis, tied to a path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningMessage {
    pub path: String,
    pub message: String,
}

impl WarningMessage {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for WarningMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_developer_picks_maximum() {
        let mut contribution = Contribution::new();
        for _ in 0..80 {
            contribution.add_line("alice");
        }
        for _ in 0..20 {
            contribution.add_line("bob");
        }

        let main = contribution.main_developer().unwrap();
        assert_eq!(main.developer, "alice");
        assert!((main.percent - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_main_developer_tie_is_deterministic() {
        let mut contribution = Contribution::new();
        for _ in 0..50 {
            contribution.add_line("bob");
        }
        for _ in 0..50 {
            contribution.add_line("alice");
        }

        // Lexicographically smallest name wins a tie, regardless of
        // insertion order.
        let main = contribution.main_developer().unwrap();
        assert_eq!(main.developer, "alice");
        assert!((main.percent - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_main_developer_empty_is_none() {
        assert!(Contribution::new().main_developer().is_none());
    }

    #[test]
    fn test_contribution_serializes_as_plain_map() {
        let mut contribution = Contribution::new();
        contribution.add_line("alice");
        contribution.add_line("alice");
        contribution.add_line("bob");

        let json = serde_json::to_string(&contribution).unwrap();
        assert_eq!(json, r#"{"alice":2,"bob":1}"#);

        let back: Contribution = serde_json::from_str(&json).unwrap();
        assert_eq!(back.lines_for("alice"), 2);
        assert_eq!(back.total_lines(), 3);
    }

    #[test]
    fn test_change_kind_display() {
        assert_eq!(ChangeKind::Add.to_string(), "add");
        assert_eq!(ChangeKind::Rename.to_string(), "rename");
        assert_eq!(ChangeKind::None.to_string(), "none");
    }
}
