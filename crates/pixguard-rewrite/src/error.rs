//! Error types for call-site rewriting

use std::path::PathBuf;

use pixguard_classfile::ClassFileError;

/// Errors while rewriting classes or driving a batch
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// Class file could not be decoded or re-encoded
    #[error("class file error: {0}")]
    ClassFile(#[from] ClassFileError),

    /// Input or output could not be accessed
    #[error("io error on {path}: {source}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Jar could not be read or written
    #[error("archive error on {path}: {source}")]
    Archive {
        /// Offending jar
        path: PathBuf,
        /// Underlying error
        #[source]
        source: zip::result::ZipError,
    },

    /// Directory traversal failed
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl RewriteError {
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

/// Result alias for rewrite operations
pub type RewriteResult<T> = Result<T, RewriteError>;
