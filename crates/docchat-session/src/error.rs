//! Error taxonomy for session operations.
//!
//! Collaborator failures keep their own types and are never swallowed: the
//! orchestrator annotates the session phase and returns the typed error to
//! the caller, which decides presentation.

use docchat_core::error::DocChatError;
use docchat_rag::error::{IngestionError, RetrievalError};

use crate::phase::Phase;

/// Errors from session orchestration.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Empty or malformed user-supplied data.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Operation invoked while the session is in the wrong phase.
    #[error("operation '{operation}' is not allowed in phase {phase}")]
    PreconditionFailed {
        operation: &'static str,
        phase: Phase,
    },

    /// The ingestion collaborator failed; the cause is opaque.
    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    /// The retrieval collaborator failed; the cause is opaque.
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    /// Document persistence failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<DocChatError> for SessionError {
    fn from(err: DocChatError) -> Self {
        SessionError::Storage(err.to_string())
    }
}
