//! The session: complete state of one user's document-chat interaction.

use tracing::debug;

use docchat_core::types::{ChatTurn, DocumentRef, IndexHandle};

use crate::error::SessionError;
use crate::phase::Phase;

/// The unit of work for one user interaction context.
///
/// Owned exclusively by the orchestrator and mutated only through its
/// operations. Invariants:
///
/// - `index_handle` is set iff `phase` is `Ready` or `Chatting`.
/// - `history` is non-empty only in `Ready`/`Chatting` (a question can only
///   be answered once an index exists).
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub(crate) document: Option<DocumentRef>,
    pub(crate) index_handle: Option<IndexHandle>,
    pub(crate) history: Vec<ChatTurn>,
    pub(crate) phase: Phase,
}

impl Session {
    /// Create an empty session in `Idle`.
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently staged document, if any.
    pub fn document(&self) -> Option<&DocumentRef> {
        self.document.as_ref()
    }

    /// The handle of the built vector index, if one exists.
    pub fn index_handle(&self) -> Option<&IndexHandle> {
        self.index_handle.as_ref()
    }

    /// The conversation so far, in chronological order.
    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Check the session invariants.
    pub fn is_consistent(&self) -> bool {
        let indexed = self.phase.has_index();
        self.index_handle.is_some() == indexed && (self.history.is_empty() || indexed)
    }

    /// Move to `target` if the transition table allows it.
    pub(crate) fn transition(
        &mut self,
        operation: &'static str,
        target: Phase,
    ) -> Result<(), SessionError> {
        if self.phase.can_transition_to(&target) {
            debug!(operation, "Session phase: {} -> {}", self.phase, target);
            self.phase = target;
            Ok(())
        } else {
            Err(SessionError::PreconditionFailed {
                operation,
                phase: self.phase,
            })
        }
    }
}
