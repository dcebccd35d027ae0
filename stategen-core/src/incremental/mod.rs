//! Incremental build tracking
//!
//! A persisted content-hash manifest decides whether re-emission is
//! necessary. The manifest is advisory only: a missing or corrupt file is
//! treated as empty, never as a failure.

pub mod manifest;
pub mod tracker;

pub use manifest::{BuildManifest, FileRecord};
pub use tracker::{ChangeSet, ChangeTracker};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IncrementalError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IncrementalError>;
