//! Log-export record parsing
//!
//! An export is a sequence of commit records. Each record opens with the
//! literal `START_HEADER` marker line, carries four header fields (commit
//! id, committer, date, multi-line comment closed by `END_HEADER`), then
//! lists one change-item line per touched file until the next marker or the
//! end of the input. Change-item lines are tab-separated:
//! `<kind-code>\t<path>` or, for rename-coded lines, `<code>\t<old>\t<new>`.
//!
//! Parsing is strictly sequential. The rename tracker's correctness depends
//! on seeing commits in export order, so there is no per-record parallelism
//! here.

use crate::error::ParseError;
use crate::git::paths::{decode_path, map_to_local};
use crate::git::tracker::RenameTracker;
use crate::history::ChangeSetHistory;
use crate::models::{ChangeItem, ChangeKind, ChangeSet};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::path::Path;
use tracing::debug;

/// Opens every commit record
pub const RECORD_MARKER: &str = "START_HEADER";
/// Closes the header block of a record
pub const HEADER_END_MARKER: &str = "END_HEADER";

/// Renames reported below this similarity are new content, not a move
const RENAME_SIMILARITY_THRESHOLD: u32 = 90;

/// Parse a raw log export into a change-set history.
///
/// `project_base` is the project root used to map server-relative paths to
/// local filesystem paths. Fails with a structural error when the export
/// contains no record marker at all, when a header is malformed, or when a
/// change-item line does not fit the grammar; on any failure the caller
/// receives no partial history.
pub fn parse_log(text: &str, project_base: &Path) -> Result<ChangeSetHistory, ParseError> {
    let mut reader = LineReader::new(text);
    let mut tracker = RenameTracker::new();
    let mut change_sets = Vec::new();

    if !reader.skip_to_marker() {
        return Err(ParseError::NoChangeSets);
    }

    let mut record = 0;
    let mut more = true;
    while more {
        record += 1;
        change_sets.push(parse_record(&mut reader, &mut tracker, project_base, record)?);
        more = reader.at_marker();
    }

    debug!("parsed {} change sets from log export", change_sets.len());
    Ok(ChangeSetHistory::new(change_sets))
}

/// Read and parse a log export file. See [`parse_log`].
pub fn parse_log_file(
    path: &Path,
    project_base: &Path,
) -> Result<ChangeSetHistory, ParseError> {
    let text = std::fs::read_to_string(path)?;
    parse_log(&text, project_base)
}

/// Line cursor over the export text. Every line is served trimmed, and the
/// most recent line stays observable so record boundaries can be detected
/// after a sub-parser stops consuming.
struct LineReader<'a> {
    lines: std::str::Lines<'a>,
    last: Option<&'a str>,
}

impl<'a> LineReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            last: None,
        }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        self.last = self.lines.next().map(str::trim);
        self.last
    }

    /// Advance until a record marker line; false when the input ends first.
    fn skip_to_marker(&mut self) -> bool {
        while let Some(line) = self.next_line() {
            if line == RECORD_MARKER {
                return true;
            }
        }
        false
    }

    fn at_marker(&self) -> bool {
        self.last == Some(RECORD_MARKER)
    }
}

fn parse_record(
    reader: &mut LineReader,
    tracker: &mut RenameTracker,
    project_base: &Path,
    record: usize,
) -> Result<ChangeSet, ParseError> {
    let truncated = || ParseError::TruncatedHeader { record };

    let id = reader.next_line().ok_or_else(truncated)?.to_string();
    let committer = reader.next_line().ok_or_else(truncated)?.to_string();
    let date_raw = reader.next_line().ok_or_else(truncated)?;
    let date = parse_date(date_raw).ok_or_else(|| ParseError::InvalidDate {
        record,
        value: date_raw.to_string(),
    })?;

    // Comment lines run until the header-end marker; blank lines are dropped
    let mut comment_lines = Vec::new();
    loop {
        let line = reader.next_line().ok_or_else(truncated)?;
        if line == HEADER_END_MARKER {
            break;
        }
        if !line.is_empty() {
            comment_lines.push(line);
        }
    }
    let comment = comment_lines.join("\n");

    tracker.begin_change_set();
    let mut items = Vec::new();
    while let Some(line) = reader.next_line() {
        if line == RECORD_MARKER {
            break;
        }
        if line.is_empty() {
            continue;
        }
        items.push(parse_change_item(line, tracker, project_base)?);
    }
    tracker.end_change_set();

    Ok(ChangeSet {
        id,
        committer,
        date,
        comment,
        items,
    })
}

fn parse_change_item(
    line: &str,
    tracker: &mut RenameTracker,
    project_base: &Path,
) -> Result<ChangeItem, ParseError> {
    let malformed = || ParseError::MalformedChangeItem {
        line: line.to_string(),
    };

    let parts: Vec<&str> = line.split('\t').collect();
    let code = parts[0];
    let kind = classify_kind(code);

    if rename_similarity(code).is_some() {
        // Rename-coded lines always carry the old and the new path
        if parts.len() != 3 {
            return Err(malformed());
        }
        let old_path = decode_path(parts[1])?;
        let server_path = decode_path(parts[2])?;
        let (id, renamed_from) = match kind {
            ChangeKind::Rename => (tracker.assign(&server_path, Some(&old_path)), Some(old_path)),
            // Below-threshold similarity: effectively new content, so the
            // new path starts its own identity instead of continuing the
            // old file's.
            _ => (tracker.assign(&server_path, None), None),
        };
        Ok(ChangeItem {
            kind,
            id,
            local_path: map_to_local(project_base, &server_path),
            server_path,
            renamed_from,
        })
    } else {
        if parts.len() != 2 && parts.len() != 3 {
            return Err(malformed());
        }
        let server_path = decode_path(parts[1])?;
        let id = tracker.assign(&server_path, None);
        Ok(ChangeItem {
            kind,
            id,
            local_path: map_to_local(project_base, &server_path),
            server_path,
            renamed_from: None,
        })
    }
}

/// Similarity score of a rename-coded kind, `None` for everything else
fn rename_similarity(code: &str) -> Option<u32> {
    code.strip_prefix('R')?.parse().ok()
}

fn classify_kind(code: &str) -> ChangeKind {
    match code {
        "A" => ChangeKind::Add,
        "D" => ChangeKind::Delete,
        "M" => ChangeKind::Edit,
        _ => match rename_similarity(code) {
            Some(similarity) if similarity >= RENAME_SIMILARITY_THRESHOLD => ChangeKind::Rename,
            Some(_) => ChangeKind::Add,
            None => ChangeKind::None,
        },
    }
}

/// Locale-independent date parse covering the formats exports actually
/// emit: RFC 3339, `git log --date=iso`, and a bare date.
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S %z") {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }
    None
}
