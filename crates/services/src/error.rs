//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{AnswerSlotError, AttemptError};
use storage::repository::StorageError;

/// Errors emitted by quiz sessions and the history service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session has not been started")]
    NotStarted,
    #[error("session already finished")]
    Finished,
    #[error(transparent)]
    AnswerSlot(#[from] AnswerSlotError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
