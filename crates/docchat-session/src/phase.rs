//! Session lifecycle phases with validated transitions.
//!
//! `Idle` is the initial phase. There is no terminal phase: the session is
//! interactive and cyclical, and `Failed` is recoverable by re-staging,
//! retrying ingestion, or resetting.

use std::fmt;

/// Lifecycle phase of a document-chat session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No document staged. Ready to accept an upload.
    #[default]
    Idle,
    /// A document is staged but not yet ingested.
    DocumentStaged,
    /// Ingestion is running for the staged document.
    Embedding,
    /// A vector index exists; the session can answer questions.
    Ready,
    /// At least one question has been answered against the current index.
    Chatting,
    /// Ingestion failed; recoverable via stage/build/reset.
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::DocumentStaged => write!(f, "DocumentStaged"),
            Phase::Embedding => write!(f, "Embedding"),
            Phase::Ready => write!(f, "Ready"),
            Phase::Chatting => write!(f, "Chatting"),
            Phase::Failed => write!(f, "Failed"),
        }
    }
}

impl Phase {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &Phase) -> bool {
        match target {
            // Staging (or re-staging) a document is allowed from any phase,
            // as is a reset.
            Phase::DocumentStaged | Phase::Idle => true,
            // Ingestion starts from a staged document, re-runs from an
            // indexed session, or retries after a failure.
            Phase::Embedding => matches!(
                self,
                Phase::DocumentStaged | Phase::Ready | Phase::Chatting | Phase::Failed
            ),
            // Only ingestion completion leaves Embedding.
            Phase::Ready | Phase::Failed => matches!(self, Phase::Embedding),
            // A first answer enters Chatting; further answers self-loop.
            Phase::Chatting => matches!(self, Phase::Ready | Phase::Chatting),
        }
    }

    /// True if a vector index must exist in this phase.
    pub fn has_index(&self) -> bool {
        matches!(self, Phase::Ready | Phase::Chatting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Phase; 6] = [
        Phase::Idle,
        Phase::DocumentStaged,
        Phase::Embedding,
        Phase::Ready,
        Phase::Chatting,
        Phase::Failed,
    ];

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Idle.to_string(), "Idle");
        assert_eq!(Phase::DocumentStaged.to_string(), "DocumentStaged");
        assert_eq!(Phase::Embedding.to_string(), "Embedding");
        assert_eq!(Phase::Ready.to_string(), "Ready");
        assert_eq!(Phase::Chatting.to_string(), "Chatting");
        assert_eq!(Phase::Failed.to_string(), "Failed");
    }

    #[test]
    fn test_default_is_idle() {
        assert_eq!(Phase::default(), Phase::Idle);
    }

    #[test]
    fn test_staging_allowed_from_any_phase() {
        for from in ALL {
            assert!(
                from.can_transition_to(&Phase::DocumentStaged),
                "staging should be allowed from {}",
                from
            );
        }
    }

    #[test]
    fn test_reset_allowed_from_any_phase() {
        for from in ALL {
            assert!(from.can_transition_to(&Phase::Idle));
        }
    }

    #[test]
    fn test_embedding_entry_points() {
        assert!(Phase::DocumentStaged.can_transition_to(&Phase::Embedding));
        assert!(Phase::Ready.can_transition_to(&Phase::Embedding));
        assert!(Phase::Chatting.can_transition_to(&Phase::Embedding));
        assert!(Phase::Failed.can_transition_to(&Phase::Embedding));

        assert!(!Phase::Idle.can_transition_to(&Phase::Embedding));
        assert!(!Phase::Embedding.can_transition_to(&Phase::Embedding));
    }

    #[test]
    fn test_only_embedding_reaches_ready_or_failed() {
        for from in ALL {
            let expected = from == Phase::Embedding;
            assert_eq!(from.can_transition_to(&Phase::Ready), expected);
            assert_eq!(from.can_transition_to(&Phase::Failed), expected);
        }
    }

    #[test]
    fn test_chatting_entry_points() {
        assert!(Phase::Ready.can_transition_to(&Phase::Chatting));
        assert!(Phase::Chatting.can_transition_to(&Phase::Chatting));

        assert!(!Phase::Idle.can_transition_to(&Phase::Chatting));
        assert!(!Phase::DocumentStaged.can_transition_to(&Phase::Chatting));
        assert!(!Phase::Embedding.can_transition_to(&Phase::Chatting));
        assert!(!Phase::Failed.can_transition_to(&Phase::Chatting));
    }

    #[test]
    fn test_has_index() {
        assert!(Phase::Ready.has_index());
        assert!(Phase::Chatting.has_index());
        assert!(!Phase::Idle.has_index());
        assert!(!Phase::DocumentStaged.has_index());
        assert!(!Phase::Embedding.has_index());
        assert!(!Phase::Failed.has_index());
    }
}
