//! Retrieval service contract and the local reference backend.
//!
//! Retrieval answers a query against a built vector index plus the
//! conversation history. From the orchestrator's point of view it is a pure
//! function of `(handle, query, history)`; this local backend composes an
//! extractive answer from the best-matching passages rather than calling a
//! language model.

use tracing::debug;

use docchat_core::config::RetrievalConfig;
use docchat_core::types::{ChatTurn, IndexHandle};

use crate::embedding::EmbeddingService;
use crate::error::RetrievalError;
use crate::index::{SearchHit, VectorStore};

/// Answers a query against a vector index plus conversation history.
///
/// Must tolerate an empty history. Expected to be the slower collaborator;
/// backend timeouts are propagated as [`RetrievalError`].
pub trait RetrievalService: Send + Sync {
    /// Produce a grounded answer for `query` against the index named by
    /// `handle`. `history` is the full conversation in chronological order,
    /// ending with the current user turn.
    fn answer(
        &self,
        handle: &IndexHandle,
        query: &str,
        history: &[ChatTurn],
    ) -> impl std::future::Future<Output = Result<String, RetrievalError>> + Send;
}

/// In-process retrieval backend over a [`VectorStore`].
pub struct LocalRetrievalService<E: EmbeddingService> {
    store: VectorStore,
    embedder: E,
    config: RetrievalConfig,
}

impl<E: EmbeddingService> LocalRetrievalService<E> {
    pub fn new(store: VectorStore, embedder: E, config: RetrievalConfig) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    /// The configuration this service was constructed with.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }
}

impl<E: EmbeddingService> RetrievalService for LocalRetrievalService<E> {
    async fn answer(
        &self,
        handle: &IndexHandle,
        query: &str,
        history: &[ChatTurn],
    ) -> Result<String, RetrievalError> {
        let index = self.store.get(handle.as_str()).ok_or_else(|| {
            RetrievalError::new(format!("unknown index handle '{}'", handle))
        })?;

        let query_vec = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| RetrievalError::new(e.to_string()))?;

        let hits = index
            .search(&query_vec, self.config.top_k)
            .map_err(|e| RetrievalError::new(e.to_string()))?;

        debug!(
            handle = %handle,
            hits = hits.len(),
            history_turns = history.len(),
            "Retrieval query answered"
        );

        Ok(compose_answer(&hits))
    }
}

/// Compose an extractive answer from scored passages.
fn compose_answer(hits: &[SearchHit]) -> String {
    let passages: Vec<(&str, f64)> = hits
        .iter()
        .filter_map(|h| h.metadata["text"].as_str().map(|t| (t, h.score)))
        .collect();

    if passages.is_empty() {
        return "I couldn't find anything in the document relevant to that question.".to_string();
    }

    let avg_score = passages.iter().map(|(_, s)| s).sum::<f64>() / passages.len() as f64;

    let body = if passages.len() == 1 {
        format!("Based on the document: {}", snippet(passages[0].0))
    } else {
        let mut out = String::from("Based on the document, the most relevant passages are:\n");
        for (i, (text, _)) in passages.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, snippet(text)));
        }
        out.trim_end().to_string()
    };

    if avg_score < 0.3 {
        format!("I'm not very confident, but {}", lowercase_first(&body))
    } else {
        body
    }
}

/// Trim a passage to a readable excerpt.
fn snippet(text: &str) -> String {
    const MAX_CHARS: usize = 300;
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_CHARS {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(MAX_CHARS).collect();
        format!("{}…", cut.trim_end())
    }
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
