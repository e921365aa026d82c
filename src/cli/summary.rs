//! `faultline summary` command — per-file change statistics

use crate::analysis::Analyzer;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

/// Run the `faultline summary` command.
pub fn run(path: &Path, top: usize) -> Result<()> {
    let project_base = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    let mut analyzer = Analyzer::open(&project_base)?;
    let mut artifacts = analyzer.summary()?;

    // Hottest files first; the summary itself comes back path-ordered
    artifacts.sort_by(|a, b| b.commits.cmp(&a.commits));
    artifacts.truncate(top);

    if artifacts.is_empty() {
        println!("No files in the synced history.");
        super::print_warnings(analyzer.warnings());
        return Ok(());
    }

    println!();
    println!(
        "  {:<50} {:>8} {:>8} {:>8} {:>12}",
        "File", "Commits", "Authors", "Items", "Last change"
    );
    println!("  {}", "\u{2500}".repeat(90));

    for artifact in &artifacts {
        // Pre-format styled cells so column widths ignore the color codes
        let commits = style(format!("{:>8}", artifact.commits)).cyan();
        println!(
            "  {:<50} {} {:>8} {:>8} {:>12}",
            super::shorten(&artifact.server_path, 50),
            commits,
            artifact.committers.len(),
            artifact.work_items.len(),
            artifact.last_change.format("%Y-%m-%d"),
        );
    }

    println!();
    println!("  Showing top {} files by commit count", artifacts.len());

    super::print_warnings(analyzer.warnings());
    Ok(())
}
