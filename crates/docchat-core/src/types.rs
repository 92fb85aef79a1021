use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Documents
// =============================================================================

/// Reference to a staged document.
///
/// Returned by the document store when bytes are staged, and required by the
/// ingestion service to build a vector index. Exactly one document is active
/// per session; staging a new one replaces the previous reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Unique identity of this staging event.
    pub id: Uuid,
    /// Original filename as supplied by the uploader.
    pub filename: String,
    /// Size of the staged bytes.
    pub size: u64,
    /// Location of the staged file on disk.
    pub path: PathBuf,
    /// When the document was staged.
    pub staged_at: DateTime<Utc>,
}

/// Opaque identifier naming a built vector index/collection.
///
/// Produced by the ingestion service and consumed by the retrieval service;
/// the orchestrator stores it but never interprets it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexHandle(String);

impl IndexHandle {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IndexHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Conversation
// =============================================================================

/// The speaker of a chat turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single turn in a conversation: who spoke and what they said.
///
/// The session history is an append-only, chronologically ordered sequence of
/// these turns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    /// Creates a user turn with the given text.
    pub fn user<S: Into<String>>(text: S) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Creates an assistant turn with the given text.
    pub fn assistant<S: Into<String>>(text: S) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_ref() -> DocumentRef {
        DocumentRef {
            id: Uuid::new_v4(),
            filename: "report.pdf".to_string(),
            size: 10_240,
            path: PathBuf::from("/tmp/staging/report.pdf"),
            staged_at: Utc::now(),
        }
    }

    #[test]
    fn test_document_ref_roundtrip() {
        let doc = make_ref();
        let json = serde_json::to_string(&doc).unwrap();
        let parsed: DocumentRef = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, parsed);
    }

    #[test]
    fn test_index_handle_display_and_accessor() {
        let handle = IndexHandle::new("vector_db");
        assert_eq!(handle.as_str(), "vector_db");
        assert_eq!(handle.to_string(), "vector_db");
    }

    #[test]
    fn test_index_handle_serializes_transparent() {
        let handle = IndexHandle::new("vector_db");
        let json = serde_json::to_string(&handle).unwrap();
        assert_eq!(json, "\"vector_db\"");
        let parsed: IndexHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, handle);
    }

    #[test]
    fn test_chat_turn_constructors() {
        let user = ChatTurn::user("What is the title?");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.text, "What is the title?");

        let assistant = ChatTurn::assistant("The title is Foo.");
        assert_eq!(assistant.role, Role::Assistant);
        assert_eq!(assistant.text, "The title is Foo.");
    }

    #[test]
    fn test_role_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_chat_turn_roundtrip() {
        let turn = ChatTurn::assistant("grounded answer");
        let json = serde_json::to_string(&turn).unwrap();
        let parsed: ChatTurn = serde_json::from_str(&json).unwrap();
        assert_eq!(turn, parsed);
    }
}
