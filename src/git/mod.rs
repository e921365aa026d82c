//! Log-export ingestion
//!
//! Turns a raw version-control log export into a structurally checked,
//! identity-stable change history. Nothing in here invokes the
//! version-control tool; the export text is produced by an outer layer and
//! handed in as-is.
//!
//! # Features
//!
//! - Record/header/change-item parsing with a fatal structural error
//!   taxonomy
//! - Escaped-path decoding so paths compare correctly
//! - File identity tracking that survives renames
//! - The `AnnotationSource` capability feeding blame text to the
//!   contribution calculator
//!
//! # Example
//!
//! ```no_run
//! use faultline::git::parse_log_file;
//! use std::path::Path;
//!
//! let history = parse_log_file(
//!     Path::new(".faultline/history.log"),
//!     Path::new("."),
//! ).unwrap();
//! println!("{} commits", history.len());
//! ```

pub mod annotation;
pub mod log_parser;
pub mod paths;
pub mod tracker;

pub use annotation::{AnnotationSource, FileAnnotationSource};
pub use log_parser::{parse_log, parse_log_file, HEADER_END_MARKER, RECORD_MARKER};
pub use paths::{decode_path, map_to_local};
pub use tracker::RenameTracker;
