//! File identity tracking across renames
//!
//! The tracker owns the path → identity map for one parse. It is stateful
//! across the whole history, never reset between commits: because exports
//! list changes oldest-first, re-keying an identity forward on a rename
//! lets every later change on the new path resolve to the pre-rename file.
//!
//! One tracker instance belongs to one parse invocation. Separate histories
//! get separate trackers and can be parsed concurrently in isolation.

use crate::models::FileId;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct RenameTracker {
    ids_by_path: HashMap<String, FileId>,
    next_id: u64,
    in_change_set: bool,
}

impl RenameTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of one commit's items. No state is reset; the call
    /// only guards against interleaved commits.
    pub fn begin_change_set(&mut self) {
        debug_assert!(!self.in_change_set, "change set already open");
        self.in_change_set = true;
    }

    /// Marks the end of one commit's items. The path map persists.
    pub fn end_change_set(&mut self) {
        debug_assert!(self.in_change_set, "no change set open");
        self.in_change_set = false;
    }

    /// Resolve the identity for a change item's path.
    ///
    /// With `renamed_from` set, the identity of the old path is looked up
    /// (or created, when the rename is the first sight of the file) and
    /// re-keyed to `path`. Otherwise the item's own path is the lookup key.
    pub fn assign(&mut self, path: &str, renamed_from: Option<&str>) -> FileId {
        match renamed_from {
            Some(old_path) => {
                let id = self.lookup_or_create(old_path);
                self.ids_by_path.remove(old_path);
                self.ids_by_path.insert(path.to_string(), id);
                id
            }
            None => self.lookup_or_create(path),
        }
    }

    /// Number of paths currently mapped
    pub fn len(&self) -> usize {
        self.ids_by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids_by_path.is_empty()
    }

    fn lookup_or_create(&mut self, path: &str) -> FileId {
        if let Some(&id) = self.ids_by_path.get(path) {
            return id;
        }
        let id = FileId(self.next_id);
        self.next_id += 1;
        self.ids_by_path.insert(path.to_string(), id);
        id
    }
}
