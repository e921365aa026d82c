//! Sync command - import a log export and refresh derived caches

use crate::analysis::{Analyzer, ProgressCallback, UpdateOptions};
use crate::git::FileAnnotationSource;
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Create bar progress style
fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap()
        .progress_chars("█▓▒░  ")
}

/// Run the sync command
pub fn run(
    path: &Path,
    log: &Path,
    contributions: bool,
    annotations: Option<&Path>,
    workers: Option<usize>,
) -> Result<()> {
    let project_base = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    let mut analyzer = Analyzer::open(&project_base)?;

    println!("\nSyncing {}\n", style(log.display()).cyan());

    let stats = if contributions {
        let annotation_root = match annotations {
            Some(dir) => dir.to_path_buf(),
            None => crate::cache::state_dir(&project_base).join("annotations"),
        };
        if !annotation_root.is_dir() {
            anyhow::bail!(
                "Annotation directory not found: {}\n\
                 Export per-file blame text there first, or pass --annotations <DIR>.",
                annotation_root.display()
            );
        }
        let source = FileAnnotationSource::new(&annotation_root);

        let bar = ProgressBar::new(0);
        bar.set_style(bar_style());
        bar.set_message("Computing contributions...");
        let bar_handle = bar.clone();
        let progress: ProgressCallback = Box::new(move |current, done, total| {
            bar_handle.set_length(total as u64);
            bar_handle.set_position(done as u64);
            bar_handle.set_message(current.to_string());
        });

        let stats = analyzer.update(
            log,
            UpdateOptions {
                annotation_source: Some(&source),
                workers,
                progress: Some(&progress),
            },
        )?;
        bar.finish_and_clear();
        stats
    } else {
        analyzer.update(
            log,
            UpdateOptions {
                workers,
                ..UpdateOptions::default()
            },
        )?
    };

    println!(
        "  {} {} change sets synced",
        style("[OK]").green(),
        style(stats.commits).cyan()
    );
    match stats.contributions {
        Some(count) => {
            if stats.failed_contributions > 0 {
                println!(
                    "  {} {} contributions cached, {} failed",
                    style("[OK]").green(),
                    style(count).cyan(),
                    style(stats.failed_contributions).yellow()
                );
            } else {
                println!(
                    "  {} {} contributions cached",
                    style("[OK]").green(),
                    style(count).cyan()
                );
            }
        }
        None => println!(
            "  {} Ownership analysis skipped (no --contributions)",
            style("[--]").dim()
        ),
    }
    if stats.new_aliases > 0 {
        println!(
            "  {} {} developers added to {}",
            style("[OK]").green(),
            style(stats.new_aliases).cyan(),
            style(".faultline/aliases").cyan()
        );
    }

    super::print_warnings(analyzer.warnings());
    Ok(())
}
