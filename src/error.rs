//! Error types for the smbchk symbol-compatibility checker.
//!
//! Structured errors via thiserror; the binary wraps these with anyhow at the
//! top level.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for smbchk operations.
#[derive(Debug, Error)]
pub enum SmbchkError {
    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Symbol database or config could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary image could not be parsed
    #[error("Invalid binary format in {path}: {message}")]
    InvalidFormat { path: String, message: String },

    /// None of the configured libraries exist under the prefix
    #[error("No library found under {}: looked for {}", .dir.display(), .candidates.join(", "))]
    LibraryNotFound {
        dir: PathBuf,
        candidates: Vec<String>,
    },

    /// Positional lookup outside the database
    #[error("Index {index} out of range for database with {len} entries")]
    IndexOutOfRange { index: isize, len: usize },

    /// File exceeds the configured read limit
    #[error("File too large: {} ({size} bytes, limit {limit})", .path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    /// Version tag could not be determined
    #[error("Version tag error: {0}")]
    Tag(String),
}

/// Result type alias for smbchk operations
pub type Result<T> = std::result::Result<T, SmbchkError>;
