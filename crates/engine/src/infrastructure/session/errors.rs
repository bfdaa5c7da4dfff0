//! Session error types

use storyloom_domain::SessionId;

use crate::infrastructure::ports::StoreError;

/// Error types for session operations.
///
/// Everything except `Store` is a user-facing domain error: the request
/// handler converts it to an error entry without failing the batch.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Cannot choose from 1 or 0 options")]
    NoChoices,

    #[error("No such option: {0}")]
    OptionOutOfRange(usize),

    #[error("Missing required items")]
    MissingItems,

    #[error("Invalid link weights")]
    InvalidLinkWeights,

    #[error("No valid links to choose from")]
    NoValidLinks,

    #[error("Too many options")]
    TooManyOptions,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Internal errors fail the whole request instead of becoming an error
    /// entry in the batch response.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}
