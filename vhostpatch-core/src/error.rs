//! Error types for vhostpatch

use std::path::PathBuf;
use thiserror::Error;

/// Result type for vhostpatch core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for vhostpatch core
#[derive(Error, Debug)]
pub enum Error {
    /// Site settings could not be parsed or are inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Settings file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
