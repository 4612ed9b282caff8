//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the sync job.
///
/// Every variant is fatal for the current run; the binary reports the
/// [`SyncError::stage`] and exits non-zero.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SyncError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Calendar error: {0}")]
    Calendar(String),

    #[error("Persistence error: {0}")]
    Persist(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl SyncError {
    /// Pipeline stage that raised the error, as shown in diagnostics.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::Calendar(_) => "calendar",
            Self::Persist(_) => "persist",
            Self::Config(_) => "config",
            Self::Cancelled => "cancelled",
        }
    }

    /// Underlying message without the stage prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Auth(msg) | Self::Calendar(msg) | Self::Persist(msg) | Self::Config(msg) => msg,
            Self::Cancelled => "operation cancelled",
        }
    }
}

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;
