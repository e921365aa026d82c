//! Init command - scaffold a project for history mining

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

const CONFIG_TEMPLATE: &str = r##"# Faultline configuration

[history]
# Pattern for work-item references extracted from commit comments
work_item_pattern = "#[0-9]+"

# Extensions included in summaries, without the dot (empty = no restriction)
extensions = []

# Path substrings excluded from every analysis
exclude = ["target/", "node_modules/", "vendor/", ".git/"]

[contributions]
# Parallel blame workers (1-64)
workers = 4

# Group files for `faultline coupling --classified`
# [[coupling.classify]]
# contains = "src/parser"
# group = "parser"
#
# [[coupling.classify]]
# contains = "tests/"
# group = "tests"
"##;

/// Run the init command
pub fn run(path: &Path) -> Result<()> {
    let project_base = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !project_base.is_dir() {
        anyhow::bail!("Path is not a directory: {}", project_base.display());
    }

    println!("\nInitializing faultline\n");

    let state_dir = crate::cache::state_dir(&project_base);
    if state_dir.exists() {
        println!(
            "  {} Already initialized at {}",
            style("[OK]").green(),
            style(state_dir.display()).cyan()
        );
    } else {
        std::fs::create_dir_all(&state_dir)
            .with_context(|| "Failed to create .faultline directory")?;
        println!(
            "  {} Created {}",
            style("[OK]").green(),
            style(state_dir.display()).cyan()
        );
    }

    let config_path = project_base.join(crate::config::CONFIG_FILE);
    if config_path.exists() {
        println!(
            "  {} {} exists, leaving it alone",
            style("[--]").dim(),
            style(crate::config::CONFIG_FILE).cyan()
        );
    } else {
        std::fs::write(&config_path, CONFIG_TEMPLATE)
            .with_context(|| "Failed to create config file")?;
        println!(
            "  {} Created {}",
            style("[OK]").green(),
            style(crate::config::CONFIG_FILE).cyan()
        );
    }

    let gitignore_path = project_base.join(".gitignore");
    let gitignore_entry = "\n# Faultline\n.faultline/\n";

    if gitignore_path.exists() {
        let content = std::fs::read_to_string(&gitignore_path).unwrap_or_default();
        if !content.contains(".faultline") {
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(&gitignore_path)?;
            use std::io::Write;
            file.write_all(gitignore_entry.as_bytes())?;
            println!(
                "  {} Added .faultline/ to {}",
                style("[OK]").green(),
                style(".gitignore").cyan()
            );
        }
    }

    println!("\nNext steps:");
    println!(
        "  {} Import a log export",
        style("faultline sync <export>").cyan()
    );
    println!(
        "  {} See what changes together",
        style("faultline coupling").cyan()
    );
    println!(
        "  {} See who owns what",
        style("faultline knowledge").cyan()
    );

    Ok(())
}
