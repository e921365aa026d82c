//! Faultline - change-history mining
//!
//! Reads a version-control log export and derives engineering signals
//! from it: which files change together (coupling) and whose head the
//! code lives in (knowledge/ownership). The parser assigns files stable
//! identities across renames, so the statistics follow a file through
//! its whole lifetime.

pub mod analysis;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod history;
pub mod models;
