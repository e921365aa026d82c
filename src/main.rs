//! Faultline - change-history mining CLI
//!
//! Mines a version-control log export for co-change coupling and
//! knowledge-ownership signals, all from a local synced copy of the
//! export.

use anyhow::Result;
use clap::Parser;
use faultline::cli;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // RUST_LOG wins; --log-level is the fallback filter
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    cli::run(cli)
}
