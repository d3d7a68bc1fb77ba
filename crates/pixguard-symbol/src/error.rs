//! Error types for identifier archive parsing

use std::path::PathBuf;

use pixguard_classfile::ClassFileError;

/// Errors while reading a compiled identifier archive
#[derive(Debug, thiserror::Error)]
pub enum SymbolError {
    /// Archive could not be opened
    #[error("io error reading {path}: {source}")]
    Io {
        /// Archive path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Archive is not a readable zip container
    #[error("invalid archive {path}: {source}")]
    Archive {
        /// Archive path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: zip::result::ZipError,
    },

    /// One identifier module failed to decode
    #[error("undecodable identifier module {entry}: {source}")]
    Module {
        /// Entry name inside the archive
        entry: String,
        /// Underlying error
        #[source]
        source: ClassFileError,
    },
}

impl SymbolError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create archive error for path
    pub fn archive_error(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for symbol operations
pub type SymbolResult<T> = Result<T, SymbolError>;
