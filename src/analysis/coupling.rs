//! Change-coupling analysis
//!
//! Files that keep appearing in the same commits are coupled, whatever the
//! import graph says. For every unordered pair of group keys that co-occur
//! in at least one commit, this pass counts the co-changes and normalizes
//! them into a degree. Pairs that never co-occur are never materialized.

use crate::history::ChangeSetHistory;
use crate::models::{ChangeItem, Coupling};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Per-file coupling over server paths.
pub fn change_couplings(history: &ChangeSetHistory) -> Vec<Coupling> {
    couplings_with(history, |item| Some(item.server_path.clone()))
}

/// Coupling over caller-defined groups.
///
/// `classify` buckets each server path into a group key; items classified
/// to an empty key are skipped. Group pairs are counted exactly like file
/// pairs, with the same degree normalization, so the two views stay
/// comparable.
pub fn classified_couplings<F>(history: &ChangeSetHistory, classify: F) -> Vec<Coupling>
where
    F: Fn(&str) -> String,
{
    couplings_with(history, |item| {
        let key = classify(&item.server_path);
        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    })
}

fn couplings_with<F>(history: &ChangeSetHistory, key_of: F) -> Vec<Coupling>
where
    F: Fn(&ChangeItem) -> Option<String>,
{
    let mut total_changes: HashMap<String, u32> = HashMap::new();
    let mut pair_counts: HashMap<(String, String), u32> = HashMap::new();

    for change_set in history.change_sets() {
        // Deduplicated and sorted, so each pair has one fixed orientation
        // and a key appearing twice in one commit counts once
        let keys: BTreeSet<String> = change_set.items.iter().filter_map(&key_of).collect();

        for key in &keys {
            *total_changes.entry(key.clone()).or_insert(0) += 1;
        }
        if keys.len() < 2 {
            continue;
        }

        let keys: Vec<&String> = keys.iter().collect();
        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                *pair_counts
                    .entry((keys[i].clone(), keys[j].clone()))
                    .or_insert(0) += 1;
            }
        }
    }

    let mut couplings: Vec<Coupling> = pair_counts
        .into_iter()
        .map(|((item1, item2), co_changes)| {
            let total1 = total_changes.get(&item1).copied().unwrap_or(co_changes);
            let total2 = total_changes.get(&item2).copied().unwrap_or(co_changes);
            // Normalize by the rarer member: a file that changes seldom but
            // always alongside a hot partner still registers strongly
            let rarer = total1.min(total2).max(1);
            Coupling {
                item1,
                item2,
                co_changes,
                degree: f64::from(co_changes) / f64::from(rarer),
            }
        })
        .collect();

    couplings.sort_by(|a, b| {
        b.degree
            .partial_cmp(&a.degree)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.co_changes.cmp(&a.co_changes))
            .then_with(|| a.item1.cmp(&b.item1))
            .then_with(|| a.item2.cmp(&b.item2))
    });

    debug!("computed {} coupling pairs", couplings.len());
    couplings
}
