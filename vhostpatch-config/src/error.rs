//! Patching errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while patching a site file
#[derive(Debug, Error)]
pub enum PatchError {
    /// Neither form of the catch-all marker occurs in the document
    #[error("Could not find '{marker}' marker")]
    MarkerNotFound { marker: &'static str },

    /// The source file could not be read
    #[error("Failed to read {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backup copy could not be written
    #[error("Failed to back up {source_path} to {backup_path}: {source}")]
    Backup {
        source_path: PathBuf,
        backup_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The patched document could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Removal pattern could not be compiled
    #[error("Invalid block pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Site settings rejected
    #[error(transparent)]
    Site(#[from] vhostpatch_core::Error),
}

impl PatchError {
    pub fn is_marker_not_found(&self) -> bool {
        matches!(self, PatchError::MarkerNotFound { .. })
    }
}

/// Result type for patching operations
pub type PatchResult<T> = Result<T, PatchError>;
