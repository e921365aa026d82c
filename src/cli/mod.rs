//! CLI command definitions and handlers

mod coupling;
mod init;
mod knowledge;
mod summary;
mod sync;

use crate::models::WarningMessage;
use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// Faultline - change-history mining
#[derive(Parser, Debug)]
#[command(name = "faultline")]
#[command(
    version,
    about = "Mine version-control history for change coupling and knowledge distribution",
    long_about = "Faultline reads a version-control log export and surfaces engineering \
signals the diff view hides: files that always change together, files whose \
knowledge lives in one head, and where the hotspots are.\n\n\
Everything runs locally against a synced copy of the export; no repository \
access is needed after `faultline sync`.",
    after_help = "\
Examples:
  faultline init                         Scaffold .faultline/ and faultline.toml
  faultline sync export.log              Import a log export
  faultline sync export.log --contributions   Also compute per-file ownership
  faultline coupling --top 10            Strongest co-change pairs
  faultline summary                      Most-changed files
  faultline knowledge                    Main developer per file

Documentation: https://github.com/faultline/faultline"
)]
pub struct Cli {
    /// Project root (default: current directory)
    #[arg(long, global = true, default_value = ".")]
    pub path: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel blame workers (1-64, default from faultline.toml)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a project: create .faultline/ and a faultline.toml with example settings
    Init,

    /// Import a raw log export into .faultline/ (validates before replacing the synced history)
    #[command(after_help = "\
Examples:
  faultline sync export.log                        Sync history only
  faultline sync export.log --contributions        Also compute ownership from annotations
  faultline sync export.log --contributions --annotations blame/
                                                   Read annotation files from blame/
  faultline sync export.log --contributions --workers 8
                                                   Use 8 parallel blame workers

Without --contributions any existing contribution cache is removed, so
`faultline knowledge` will ask you to resynchronize.")]
    Sync {
        /// Raw log export file to import
        #[arg(value_name = "EXPORT")]
        log: PathBuf,

        /// Recompute the per-file contribution cache from annotation exports
        #[arg(long)]
        contributions: bool,

        /// Directory of annotation exports mirroring the repository tree
        /// (default: .faultline/annotations)
        #[arg(long, value_name = "DIR")]
        annotations: Option<PathBuf>,
    },

    /// Show co-change coupling between files (or configured groups)
    #[command(after_help = "\
Examples:
  faultline coupling                     Strongest file pairs
  faultline coupling --top 50            Show 50 pairs
  faultline coupling --classified        Couple the groups from faultline.toml
  faultline coupling --min-co-changes 5  Only pairs that co-changed 5+ times")]
    Coupling {
        /// Couple the classification groups from faultline.toml instead of files
        #[arg(long)]
        classified: bool,

        /// Number of pairs to show
        #[arg(long, default_value = "20")]
        top: usize,

        /// Hide pairs with fewer co-changes than this
        #[arg(long, default_value = "2")]
        min_co_changes: u32,
    },

    /// Show per-file change statistics from the synced history
    #[command(after_help = "\
Examples:
  faultline summary                      20 most-changed files
  faultline summary --top 50             50 most-changed files")]
    Summary {
        /// Number of files to show
        #[arg(long, default_value = "20")]
        top: usize,
    },

    /// Show knowledge distribution: the main developer of every file
    #[command(after_help = "\
Examples:
  faultline knowledge                    Main developer per file
  faultline knowledge --developer alice  Only files mainly owned by alice
  faultline knowledge --developers       List developers with owned-file counts

Requires a contribution cache; run `faultline sync <export> --contributions`
first. Names are normalized through .faultline/aliases.")]
    Knowledge {
        /// Only show files whose main developer matches this name (after aliasing)
        #[arg(long)]
        developer: Option<String>,

        /// List distinct developers and how many files each mainly owns
        #[arg(long)]
        developers: bool,
    },

    /// Show version information
    Version,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => init::run(&cli.path),

        Commands::Sync {
            log,
            contributions,
            annotations,
        } => sync::run(
            &cli.path,
            &log,
            contributions,
            annotations.as_deref(),
            cli.workers,
        ),

        Commands::Coupling {
            classified,
            top,
            min_co_changes,
        } => coupling::run(&cli.path, classified, top, min_co_changes),

        Commands::Summary { top } => summary::run(&cli.path, top),

        Commands::Knowledge {
            developer,
            developers,
        } => knowledge::run(&cli.path, developer.as_deref(), developers),

        Commands::Version => {
            println!("faultline {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Keep the tail of long paths; the filename end is the informative part
pub(crate) fn shorten(path: &str, max: usize) -> String {
    if path.len() > max {
        format!("\u{2026}{}", &path[path.len() - (max - 1)..])
    } else {
        path.to_string()
    }
}

/// Print accumulated warnings after a command's main output
pub(crate) fn print_warnings(warnings: &[WarningMessage]) {
    if warnings.is_empty() {
        return;
    }
    println!();
    for warning in warnings {
        println!(
            "  {} {}: {}",
            style("warning").yellow(),
            style(&warning.path).cyan(),
            warning.message
        );
    }
}
