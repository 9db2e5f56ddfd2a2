use thiserror::Error;

use crate::constants::FETCH_FALLBACK_MESSAGE;

/// Failure of the users fetch collaborator.
///
/// Network, decode and server-side errors are collapsed into one
/// human-readable message before they reach the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("{0}")]
    Failed(String),
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Message to surface to the user, never empty.
    pub fn message(&self) -> &str {
        match self {
            Self::Failed(msg) if !msg.trim().is_empty() => msg.as_str(),
            Self::Failed(_) => FETCH_FALLBACK_MESSAGE,
        }
    }
}

/// Failure of the remote save behind an optimistic edit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistError {
    #[error("Save failed: {0}")]
    Failed(String),
}
