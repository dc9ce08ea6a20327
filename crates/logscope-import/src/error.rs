use std::path::PathBuf;

use thiserror::Error;

/// Errors from bulk import orchestration.
///
/// Per-file read failures never surface here; they degrade into
/// synthetic error-level events so the remaining files still run.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The import root does not exist or is not a directory.
    #[error("import path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while discovering files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
