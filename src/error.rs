//! Error types for the takeout sorter

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for takeout sorter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the takeout sorter
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source path does not exist: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Failed to extract {}: {message}", archive.display())]
    Extraction { archive: PathBuf, message: String },

    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    Relocation {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Expected content directory not found in archive: {}", path.display())]
    MissingContent { path: PathBuf },

    #[error("Working directory already exists, refusing to reuse it: {}", path.display())]
    WorkingDirectoryExists { path: PathBuf },

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),
}
