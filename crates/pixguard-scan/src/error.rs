//! Error types for resource scanning
//!
//! None of these abort a scan; the scanner logs them and skips the input.

use std::path::PathBuf;

/// Errors while reading one resource file
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// File or directory could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// XML descriptor is not well formed
    #[error("malformed xml in {path}: {message}")]
    Xml {
        /// Offending file
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Directory traversal failed
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl ScanError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create XML error for path
    pub fn xml_error(path: impl Into<PathBuf>, err: &roxmltree::Error) -> Self {
        Self::Xml {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Result alias for scan operations
pub type ScanResultOf<T> = Result<T, ScanError>;
