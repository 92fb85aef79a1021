//! Collaborator contracts for retrieval-augmented document chat, plus local
//! reference backends.
//!
//! The session orchestrator depends only on the [`IngestionService`] and
//! [`RetrievalService`] traits. The `Local*` implementations in this crate
//! back those traits with an in-process vector store so the system runs
//! end-to-end without external infrastructure; remote backends (e.g. a
//! hosted vector store plus an LLM endpoint) implement the same traits.

pub mod chunker;
pub mod embedding;
pub mod error;
pub mod index;
pub mod ingestion;
pub mod retrieval;

pub use chunker::chunk_text;
pub use embedding::{EmbeddingService, HashEmbedding};
pub use error::{IngestionError, RetrievalError};
pub use index::{SearchHit, VectorIndex, VectorStore};
pub use ingestion::{IngestionService, LocalIngestionService};
pub use retrieval::{LocalRetrievalService, RetrievalService};
