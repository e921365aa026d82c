//! Analysis façade
//!
//! One `Analyzer` per project. It owns the project configuration, loads
//! the synced history lazily (parse + on-disk cleanup, once), runs the
//! coupling/summary passes, drives the sync workflow, and accumulates the
//! user-facing warnings every operation produces along the way.

pub mod alias;
pub mod contribution;
pub mod coupling;

pub use alias::AliasMapping;
pub use contribution::{
    calculate_contributions, ContributionBatch, ProgressCallback, DEFAULT_WORKERS,
};
pub use coupling::{change_couplings, classified_couplings};

use crate::cache::{self, ContributionCache};
use crate::config::{load_project_config, ProjectConfig};
use crate::error::CacheError;
use crate::git::{parse_log, AnnotationSource};
use crate::history::ChangeSetHistory;
use crate::models::{Artifact, Coupling, MainDeveloper, WarningMessage};
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::info;

/// What a sync accomplished, for reporting
#[derive(Debug, Default)]
pub struct SyncStats {
    pub commits: usize,
    /// Computed contribution entries; `None` when ownership analysis was
    /// skipped and the cache was dropped instead
    pub contributions: Option<usize>,
    pub failed_contributions: usize,
    pub new_aliases: usize,
}

/// Options for [`Analyzer::update`]
#[derive(Default)]
pub struct UpdateOptions<'a> {
    /// Attribution source for ownership analysis; `None` skips the
    /// analysis and removes the contribution cache wholesale
    pub annotation_source: Option<&'a dyn AnnotationSource>,
    /// Overrides the configured worker bound
    pub workers: Option<usize>,
    pub progress: Option<&'a ProgressCallback>,
}

pub struct Analyzer {
    project_base: PathBuf,
    config: ProjectConfig,
    history: Option<ChangeSetHistory>,
    warnings: Vec<WarningMessage>,
}

impl Analyzer {
    pub fn new(project_base: impl Into<PathBuf>, config: ProjectConfig) -> Self {
        Self {
            project_base: project_base.into(),
            config,
            history: None,
            warnings: Vec::new(),
        }
    }

    /// Construct for a project root, loading `faultline.toml` from it.
    pub fn open(project_base: impl Into<PathBuf>) -> Result<Self> {
        let project_base = project_base.into();
        let config = load_project_config(&project_base)?;
        Ok(Self::new(project_base, config))
    }

    pub fn project_base(&self) -> &Path {
        &self.project_base
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Warnings accumulated by the operations run so far
    pub fn warnings(&self) -> &[WarningMessage] {
        &self.warnings
    }

    /// Import a raw log export.
    ///
    /// The export is parsed first, so a structurally broken file never
    /// replaces the synced history. On success the raw text is copied to
    /// `.faultline/history.log` verbatim. With an annotation source the
    /// contribution cache is recomputed from scratch; without one it is
    /// deleted wholesale, so no analysis can later read ownership data
    /// that no longer matches the history.
    pub fn update(&mut self, export: &Path, options: UpdateOptions) -> Result<SyncStats> {
        let text = std::fs::read_to_string(export)
            .with_context(|| format!("failed to read log export {}", export.display()))?;
        let mut history = parse_log(&text, &self.project_base)
            .with_context(|| format!("failed to parse log export {}", export.display()))?;

        cache::ensure_state_dir(&self.project_base).with_context(|| {
            format!(
                "failed to create state directory under {}",
                self.project_base.display()
            )
        })?;
        let log_path = cache::history_log_path(&self.project_base);
        std::fs::write(&log_path, &text)
            .with_context(|| format!("failed to write {}", log_path.display()))?;
        info!("synced {} change sets to {}", history.len(), log_path.display());

        self.warnings.extend(history.cleanup());

        let mut stats = SyncStats {
            commits: history.len(),
            ..SyncStats::default()
        };
        let mut developers = history.committers();

        let cache_path = cache::contribution_cache_path(&self.project_base);
        match options.annotation_source {
            Some(source) => {
                let filter = self.config.path_filter();
                let extensions = self.config.known_extensions();
                let pattern = self.config.work_item_regex()?;
                let artifacts = history.artifact_summary(&filter, &extensions, pattern.as_ref());

                let workers = options
                    .workers
                    .unwrap_or(self.config.contributions.workers);
                let batch =
                    calculate_contributions(&artifacts, source, workers, options.progress)?;

                stats.contributions = Some(batch.contributions.len());
                stats.failed_contributions = batch.warnings.len();
                self.warnings.extend(batch.warnings);

                let contribution_cache = ContributionCache::new(batch.contributions);
                developers.extend(contribution_cache.developers());
                contribution_cache.save(&cache_path)?;
            }
            None => {
                ContributionCache::remove_file(&cache_path)?;
            }
        }

        stats.new_aliases =
            alias::refresh_defaults(&cache::aliases_path(&self.project_base), &developers)?;

        self.history = Some(history);
        Ok(stats)
    }

    /// Per-file co-change coupling, strongest first
    pub fn change_coupling(&mut self) -> Result<Vec<Coupling>> {
        let history = self.history()?;
        Ok(coupling::change_couplings(history))
    }

    /// Coupling between the configured classification groups
    pub fn classified_coupling(&mut self) -> Result<Vec<Coupling>> {
        let config = self.config.clone();
        let history = self.history()?;
        Ok(coupling::classified_couplings(history, |path| {
            config.classify_path(path)
        }))
    }

    /// Artifact summary over the synced history
    pub fn summary(&mut self) -> Result<Vec<Artifact>> {
        let filter = self.config.path_filter();
        let extensions = self.config.known_extensions();
        let pattern = self.config.work_item_regex()?;
        let history = self.history()?;
        Ok(history.artifact_summary(&filter, &extensions, pattern.as_ref()))
    }

    /// The persisted contribution cache for this project
    pub fn contributions(&self) -> Result<ContributionCache, CacheError> {
        ContributionCache::load(&cache::contribution_cache_path(&self.project_base))
    }

    /// Per-file main developer from the contribution cache
    pub fn main_developers(&self) -> Result<BTreeMap<String, MainDeveloper>, CacheError> {
        Ok(self.contributions()?.main_developers())
    }

    /// Every developer name seen in the history or the contribution cache
    pub fn known_developers(&mut self) -> Result<BTreeSet<String>> {
        let mut developers = self.history()?.committers();
        if let Ok(cached) = self.contributions() {
            developers.extend(cached.developers());
        }
        Ok(developers)
    }

    /// The alias mapping for this project
    pub fn aliases(&self) -> Result<AliasMapping> {
        AliasMapping::load(&cache::aliases_path(&self.project_base))
    }

    fn history(&mut self) -> Result<&ChangeSetHistory> {
        if self.history.is_none() {
            let log_path = cache::history_log_path(&self.project_base);
            if !log_path.exists() {
                return Err(CacheError::MissingHistory { path: log_path }.into());
            }
            let text = std::fs::read_to_string(&log_path)
                .with_context(|| format!("failed to read {}", log_path.display()))?;
            let mut history = parse_log(&text, &self.project_base)
                .with_context(|| format!("failed to parse {}", log_path.display()))?;
            self.warnings.extend(history.cleanup());
            self.history = Some(history);
        }
        Ok(self.history.get_or_insert_with(ChangeSetHistory::default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::FileAnnotationSource;

    const EXPORT: &str = "START_HEADER\n\
        c1\n\
        alice\n\
        2023-04-01 10:00:00 +0000\n\
        add both #11\n\
        END_HEADER\n\
        A\tsrc/a.rs\n\
        A\tsrc/b.rs\n\
        START_HEADER\n\
        c2\n\
        bob\n\
        2023-04-02 10:00:00 +0000\n\
        touch both again\n\
        END_HEADER\n\
        M\tsrc/a.rs\n\
        M\tsrc/b.rs\n";

    /// Project dir with working tree files, an export file and an
    /// annotation tree
    fn project() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_path_buf();
        std::fs::create_dir_all(base.join("src")).unwrap();
        std::fs::write(base.join("src/a.rs"), "fn a() {}\n").unwrap();
        std::fs::write(base.join("src/b.rs"), "fn b() {}\n").unwrap();

        std::fs::write(base.join("export.log"), EXPORT).unwrap();

        let annotations = base.join("annotations/src");
        std::fs::create_dir_all(&annotations).unwrap();
        std::fs::write(
            annotations.join("a.rs"),
            "c1\t( alice 2023-04-01 1) fn a() {}\n",
        )
        .unwrap();
        std::fs::write(
            annotations.join("b.rs"),
            "c2\t( bob 2023-04-02 1) fn b() {}\nc2\t( bob 2023-04-02 2) x\n",
        )
        .unwrap();
        (dir, base)
    }

    #[test]
    fn test_analysis_before_sync_asks_for_sync() {
        let dir = tempfile::tempdir().unwrap();
        let mut analyzer = Analyzer::open(dir.path()).unwrap();
        let err = analyzer.change_coupling().unwrap_err();
        assert!(err.to_string().contains("faultline sync"));
    }

    #[test]
    fn test_update_then_analyze() {
        let (_dir, base) = project();
        let mut analyzer = Analyzer::open(&base).unwrap();

        let source = FileAnnotationSource::new(base.join("annotations"));
        let stats = analyzer
            .update(
                &base.join("export.log"),
                UpdateOptions {
                    annotation_source: Some(&source),
                    ..UpdateOptions::default()
                },
            )
            .unwrap();

        assert_eq!(stats.commits, 2);
        assert_eq!(stats.contributions, Some(2));
        assert_eq!(stats.failed_contributions, 0);
        // alice and bob get default alias entries
        assert_eq!(stats.new_aliases, 2);

        let couplings = analyzer.change_coupling().unwrap();
        assert_eq!(couplings.len(), 1);
        assert_eq!(couplings[0].co_changes, 2);

        let mains = analyzer.main_developers().unwrap();
        assert_eq!(mains["src/a.rs"].developer, "alice");
        assert_eq!(mains["src/b.rs"].developer, "bob");

        let summary = analyzer.summary().unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(
            summary[0].work_items.iter().cloned().collect::<Vec<_>>(),
            vec!["#11".to_string()]
        );
    }

    #[test]
    fn test_update_without_contributions_drops_the_cache() {
        let (_dir, base) = project();
        let mut analyzer = Analyzer::open(&base).unwrap();

        let source = FileAnnotationSource::new(base.join("annotations"));
        analyzer
            .update(
                &base.join("export.log"),
                UpdateOptions {
                    annotation_source: Some(&source),
                    ..UpdateOptions::default()
                },
            )
            .unwrap();
        assert!(analyzer.contributions().is_ok());

        analyzer
            .update(&base.join("export.log"), UpdateOptions::default())
            .unwrap();
        let err = analyzer.contributions().unwrap_err();
        assert!(matches!(err, CacheError::MissingContributions { .. }));
    }

    #[test]
    fn test_update_rejects_broken_export_and_keeps_old_history() {
        let (_dir, base) = project();
        let mut analyzer = Analyzer::open(&base).unwrap();
        analyzer
            .update(&base.join("export.log"), UpdateOptions::default())
            .unwrap();

        std::fs::write(base.join("broken.log"), "no markers here\n").unwrap();
        let mut analyzer = Analyzer::open(&base).unwrap();
        assert!(analyzer
            .update(&base.join("broken.log"), UpdateOptions::default())
            .is_err());

        // The previously synced history is still intact
        let couplings = analyzer.change_coupling().unwrap();
        assert_eq!(couplings.len(), 1);
    }

    #[test]
    fn test_cleanup_warnings_surface() {
        let (_dir, base) = project();
        // src/b.rs is in history but not on disk anymore
        std::fs::remove_file(base.join("src/b.rs")).unwrap();

        let mut analyzer = Analyzer::open(&base).unwrap();
        analyzer
            .update(&base.join("export.log"), UpdateOptions::default())
            .unwrap();

        assert_eq!(analyzer.warnings().len(), 1);
        assert_eq!(analyzer.warnings()[0].path, "src/b.rs");

        // And the pruned file no longer couples with anything
        assert!(analyzer.change_coupling().unwrap().is_empty());
    }

    #[test]
    fn test_known_developers_across_history_and_cache() {
        let (_dir, base) = project();
        let mut analyzer = Analyzer::open(&base).unwrap();
        let source = FileAnnotationSource::new(base.join("annotations"));
        analyzer
            .update(
                &base.join("export.log"),
                UpdateOptions {
                    annotation_source: Some(&source),
                    ..UpdateOptions::default()
                },
            )
            .unwrap();

        let developers: Vec<_> = analyzer.known_developers().unwrap().into_iter().collect();
        assert_eq!(developers, vec!["alice".to_string(), "bob".to_string()]);
    }
}
