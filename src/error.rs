//! Typed errors for the parsing and cache layers
//!
//! Orchestration code wraps these in `anyhow` chains; they stay typed here
//! so callers can match on the failure class.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while parsing a log export.
///
/// Every variant is structural and fatal for the whole parse: a broken
/// export cannot be partially trusted, so the caller never receives a
/// partial history.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The export contained no record marker at all. Zero commits means
    /// the export step itself failed, not that the repository is empty.
    #[error("no change sets found in log export")]
    NoChangeSets,

    #[error("record {record} ended before its header was complete")]
    TruncatedHeader { record: usize },

    #[error("unparseable commit date {value:?} in record {record}")]
    InvalidDate { record: usize, value: String },

    #[error("invalid hex escape in path {path:?}")]
    InvalidPathEscape { path: String },

    /// A change-item line whose field count the grammar does not allow.
    /// This is an export-format variant the parser does not understand.
    #[error("malformed change item line {line:?}")]
    MalformedChangeItem { line: String },

    #[error("failed to read log export")]
    Io(#[from] std::io::Error),
}

/// Errors raised when reading per-project state under `.faultline/`.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("no synced history at {}; run `faultline sync` first", path.display())]
    MissingHistory { path: PathBuf },

    #[error(
        "no contribution cache at {}; resynchronize with contributions enabled",
        path.display()
    )]
    MissingContributions { path: PathBuf },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed cache file {}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
