//! `faultline coupling` command — co-change coupling between files

use crate::analysis::Analyzer;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

/// Run the `faultline coupling` command.
pub fn run(path: &Path, classified: bool, top: usize, min_co_changes: u32) -> Result<()> {
    let project_base = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    let mut analyzer = Analyzer::open(&project_base)?;
    let mut couplings = if classified {
        analyzer.classified_coupling()?
    } else {
        analyzer.change_coupling()?
    };

    couplings.retain(|coupling| coupling.co_changes >= min_co_changes);
    couplings.truncate(top);

    if couplings.is_empty() {
        println!("No coupled pairs found.");
        super::print_warnings(analyzer.warnings());
        return Ok(());
    }

    let label = if classified { "Group" } else { "File" };
    println!();
    println!(
        "  {:<38} {:<38} {:>7} {:>7}",
        label, "Couples with", "Shared", "Degree"
    );
    println!("  {}", "\u{2500}".repeat(94));

    for coupling in &couplings {
        let degree = format!("{:>6.0}%", coupling.degree * 100.0);
        let degree_style = if coupling.degree >= 0.7 {
            style(degree).red()
        } else if coupling.degree >= 0.4 {
            style(degree).yellow()
        } else {
            style(degree).green()
        };

        println!(
            "  {:<38} {:<38} {:>7} {}",
            super::shorten(&coupling.item1, 38),
            super::shorten(&coupling.item2, 38),
            coupling.co_changes,
            degree_style,
        );
    }

    println!();
    println!("  Showing {} pairs by coupling degree", couplings.len());

    super::print_warnings(analyzer.warnings());
    Ok(())
}
