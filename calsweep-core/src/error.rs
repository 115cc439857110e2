//! Error types for calsweep.

use thiserror::Error;

/// Errors that can occur in calsweep operations.
///
/// Permission refusals during deletion are not represented here: they are
/// an outcome of a deletion attempt (see [`crate::disposition`]), not a failure.
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider access error: {0}")]
    ProviderAccess(String),

    #[error("{0}")]
    Deletion(String),

    #[error("Backup error: {0}")]
    Backup(String),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for calsweep operations.
pub type SweepResult<T> = Result<T, SweepError>;
