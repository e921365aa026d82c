//! Developer contribution from blame/annotate text
//!
//! One annotation export line per source line, first token the revision,
//! then the developer name behind an opening parenthesis. Aggregation is
//! line counting per developer; the interesting part is the fan-out, which
//! runs one blocking attribution call per artifact under a small fixed
//! worker pool so the backing tool is never flooded.

use crate::git::AnnotationSource;
use crate::models::{Artifact, Contribution, WarningMessage};
use anyhow::{Context, Result};
use dashmap::DashMap;
use rayon::prelude::*;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Worker bound used when the caller does not override it
pub const DEFAULT_WORKERS: usize = 4;

/// Reports batch progress: current path, completed count, total count
pub type ProgressCallback = Box<dyn Fn(&str, usize, usize) + Send + Sync>;

/// Contribution maps for a whole summary, keyed by server path, plus one
/// warning per artifact whose attribution failed
#[derive(Debug, Default)]
pub struct ContributionBatch {
    pub contributions: BTreeMap<String, Contribution>,
    pub warnings: Vec<WarningMessage>,
}

static BLAME_LINE: OnceLock<Regex> = OnceLock::new();

/// Revision token, tab, then the developer name behind `(` and whitespace
fn blame_line_pattern() -> &'static Regex {
    BLAME_LINE.get_or_init(|| Regex::new(r"^\S*\t\(\s+(\S+)").expect("blame pattern compiles"))
}

/// Count attributed lines per developer in one annotation export.
///
/// Lines that do not fit the attribution shape are skipped; a noisy export
/// degrades the count, it never fails it.
pub fn parse_attribution(text: &str) -> Contribution {
    let mut contribution = Contribution::new();
    let mut skipped = 0usize;
    for line in text.lines() {
        match blame_line_pattern().captures(line) {
            Some(captures) => contribution.add_line(&captures[1]),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!("skipped {skipped} unparseable attribution lines");
    }
    contribution
}

/// Compute contributions for every artifact under a bounded worker pool.
///
/// Each worker performs one blocking attribution call and one map insert.
/// A failing artifact is recorded as a warning and left out of the result
/// map; it never aborts the rest of the batch. The pool is dedicated, so
/// the bound holds independently of the global rayon pool.
pub fn calculate_contributions(
    artifacts: &[Artifact],
    source: &dyn AnnotationSource,
    workers: usize,
    progress: Option<&ProgressCallback>,
) -> Result<ContributionBatch> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .context("failed to build contribution worker pool")?;

    let results: DashMap<String, Contribution> = DashMap::new();
    let failures: DashMap<String, String> = DashMap::new();
    let completed = AtomicUsize::new(0);
    let total = artifacts.len();

    pool.install(|| {
        artifacts.par_iter().for_each(|artifact| {
            match source.attribution_text(artifact) {
                Ok(text) => {
                    results.insert(artifact.server_path.clone(), parse_attribution(&text));
                }
                Err(err) => {
                    warn!(
                        "attribution failed for {}: {err:#}",
                        artifact.server_path
                    );
                    failures.insert(
                        artifact.server_path.clone(),
                        format!("attribution failed: {err:#}"),
                    );
                }
            }
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(callback) = progress {
                callback(&artifact.server_path, done, total);
            }
        });
    });

    let contributions: BTreeMap<String, Contribution> = results.into_iter().collect();
    let mut warnings: Vec<WarningMessage> = failures
        .into_iter()
        .map(|(path, message)| WarningMessage::new(path, message))
        .collect();
    warnings.sort_by(|a, b| a.path.cmp(&b.path));

    debug!(
        "contribution batch finished: {} computed, {} failed",
        contributions.len(),
        warnings.len()
    );
    Ok(ContributionBatch {
        contributions,
        warnings,
    })
}
