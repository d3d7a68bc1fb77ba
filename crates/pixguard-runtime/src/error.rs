//! Error types for host integration

use thiserror::Error;

/// Failure reported by a [`FactorySeam`](crate::FactorySeam)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SeamError {
    /// The host refused access to its factory slot
    #[error("access to factory slot denied: {0}")]
    AccessDenied(String),

    /// The host has no factory slot to replace
    #[error("factory slot unavailable: {0}")]
    Unavailable(String),
}
