//! # Guild Directory Common Library
//!
//! Shared code for the guild directory service including:
//! - Directory data model (records, snapshots, validation outcomes)
//! - Error taxonomy
//! - Configuration loading

pub mod config;
pub mod error;
pub mod model;

pub use error::{Error, Result};
pub use model::{DirectoryRecord, Snapshot, SourceLabel, ValidationOutcome};
