//! Collaborator failure types.
//!
//! Both carry an opaque cause string: the orchestrator annotates session
//! state and propagates these without interpreting them.

use thiserror::Error;

/// Failure reported by an ingestion service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ingestion failed: {cause}")]
pub struct IngestionError {
    pub cause: String,
}

impl IngestionError {
    pub fn new<S: Into<String>>(cause: S) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}

/// Failure reported by a retrieval service, including propagated backend
/// timeouts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("retrieval failed: {cause}")]
pub struct RetrievalError {
    pub cause: String,
}

impl RetrievalError {
    pub fn new<S: Into<String>>(cause: S) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}
