//! `faultline knowledge` command — knowledge distribution per file

use crate::analysis::Analyzer;
use anyhow::{Context, Result};
use console::style;
use std::collections::BTreeMap;
use std::path::Path;

/// Run the `faultline knowledge` command.
pub fn run(path: &Path, developer: Option<&str>, developers: bool) -> Result<()> {
    let project_base = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    let analyzer = Analyzer::open(&project_base)?;
    let aliases = analyzer.aliases()?;
    let mains = analyzer.main_developers()?;

    // Alias-resolved view; ignored developers drop out entirely
    let resolved: Vec<(&String, String, f64)> = mains
        .iter()
        .filter_map(|(file, main)| {
            aliases
                .resolve(&main.developer)
                .map(|name| (file, name.to_string(), main.percent))
        })
        .collect();

    if developers {
        let mut owned: BTreeMap<&str, usize> = BTreeMap::new();
        for (_, name, _) in &resolved {
            *owned.entry(name.as_str()).or_insert(0) += 1;
        }

        if owned.is_empty() {
            println!("No ownership data in the contribution cache.");
            return Ok(());
        }

        let mut rows: Vec<(&str, usize)> = owned.into_iter().collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

        println!();
        println!("  {:<30} {:>12}", "Developer", "Files owned");
        println!("  {}", "\u{2500}".repeat(43));
        for (name, count) in &rows {
            let count_cell = style(format!("{:>12}", count)).cyan();
            println!("  {:<30} {}", name, count_cell);
        }
        println!();
        println!("  {} developers with owned files", rows.len());
        return Ok(());
    }

    let rows: Vec<_> = resolved
        .into_iter()
        .filter(|(_, name, _)| developer.map_or(true, |wanted| name == wanted))
        .collect();

    if rows.is_empty() {
        match developer {
            Some(wanted) => println!("No files mainly owned by '{}'.", wanted),
            None => println!("No ownership data in the contribution cache."),
        }
        return Ok(());
    }

    println!();
    println!(
        "  {:<54} {:<24} {:>9}",
        "File", "Main developer", "Owns"
    );
    println!("  {}", "\u{2500}".repeat(89));

    for (file, name, percent) in &rows {
        let share = format!("{:>8.0}%", percent);
        // A file one head fully owns is a knowledge risk
        let share_style = if *percent >= 90.0 {
            style(share).red()
        } else if *percent >= 70.0 {
            style(share).yellow()
        } else {
            style(share).green()
        };

        println!(
            "  {:<54} {:<24} {}",
            super::shorten(file, 54),
            name,
            share_style,
        );
    }

    println!();
    println!("  {} files with ownership data", rows.len());

    Ok(())
}
