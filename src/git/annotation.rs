//! Blame/annotate text sources
//!
//! The contribution calculator never knows where attribution text comes
//! from. It pulls text through this capability, so the same aggregation
//! logic runs against process output, a service, or files on disk.

use crate::models::Artifact;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Supplies per-line attribution text for artifacts.
///
/// `Send + Sync` so one source can be shared across the workers of a
/// contribution batch. A failure for one artifact is contained by the
/// batch; implementations should return an error rather than panic.
pub trait AnnotationSource: Send + Sync {
    fn attribution_text(&self, artifact: &Artifact) -> Result<String>;
}

/// Reads pre-exported annotation files from a directory mirroring the
/// repository tree: the text for `src/main.rs` lives at `<root>/src/main.rs`.
pub struct FileAnnotationSource {
    root: PathBuf,
}

impl FileAnnotationSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AnnotationSource for FileAnnotationSource {
    fn attribution_text(&self, artifact: &Artifact) -> Result<String> {
        let path = self.root.join(artifact.server_path.trim_start_matches('/'));
        std::fs::read_to_string(&path)
            .with_context(|| format!("no annotation export at {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileId;
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn artifact(server_path: &str) -> Artifact {
        Artifact {
            id: FileId(1),
            server_path: server_path.to_string(),
            local_path: PathBuf::from(server_path),
            revision: "c1".to_string(),
            commits: 1,
            committers: BTreeSet::new(),
            work_items: BTreeSet::new(),
            last_change: Utc::now(),
        }
    }

    #[test]
    fn test_reads_mirrored_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/main.rs"), "c1\t( alice 1) fn main\n").unwrap();

        let source = FileAnnotationSource::new(dir.path());
        let text = source.attribution_text(&artifact("src/main.rs")).unwrap();
        assert!(text.contains("alice"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileAnnotationSource::new(dir.path());
        assert!(source.attribution_text(&artifact("src/gone.rs")).is_err());
    }
}
