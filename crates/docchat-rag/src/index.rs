//! In-memory vector index and the named-collection store above it.
//!
//! Search is brute-force cosine similarity, O(n) per query, which is fine
//! for a single document's worth of chunks. The [`VectorStore`] maps
//! collection names to indexes; replacing a collection under the same name
//! is how re-ingestion overwrites a prior index while keeping its handle
//! stable.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use uuid::Uuid;

use docchat_core::error::DocChatError;

/// A single hit returned from a vector search.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The ID of the matching entry.
    pub id: Uuid,
    /// Cosine similarity score.
    pub score: f64,
    /// Metadata associated with the entry (chunk text, position, source).
    pub metadata: Value,
}

#[derive(Debug, Clone)]
struct VectorEntry {
    embedding: Vec<f32>,
    metadata: Value,
}

/// In-memory vector index using brute-force cosine similarity.
///
/// Thread-safe via interior `RwLock`; clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Arc<RwLock<HashMap<Uuid, VectorEntry>>>,
}

impl VectorIndex {
    /// Create a new empty vector index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a vector with associated metadata, overwriting any existing
    /// entry with the same ID.
    pub fn insert(&self, id: Uuid, embedding: Vec<f32>, metadata: Value) -> Result<(), DocChatError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| DocChatError::Storage(format!("index lock poisoned: {}", e)))?;
        entries.insert(
            id,
            VectorEntry {
                embedding,
                metadata,
            },
        );
        Ok(())
    }

    /// Search for the k nearest neighbors to the query vector by cosine
    /// similarity, sorted by descending score.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, DocChatError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| DocChatError::Storage(format!("index lock poisoned: {}", e)))?;

        let mut scored: Vec<SearchHit> = entries
            .iter()
            .map(|(id, entry)| SearchHit {
                id: *id,
                score: cosine_similarity(query, &entry.embedding),
                metadata: entry.metadata.clone(),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);

        Ok(scored)
    }

    /// Delete an entry by ID. Ok regardless of whether it existed.
    pub fn delete(&self, id: Uuid) -> Result<(), DocChatError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| DocChatError::Storage(format!("index lock poisoned: {}", e)))?;
        entries.remove(&id);
        Ok(())
    }

    /// Number of vectors currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// True if the index contains no vectors.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Store of named vector collections.
///
/// A collection name is the opaque index handle exposed to callers;
/// replacing a collection under the same name overwrites the prior index.
#[derive(Debug, Clone, Default)]
pub struct VectorStore {
    collections: Arc<RwLock<HashMap<String, VectorIndex>>>,
}

impl VectorStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `index` under `name`, replacing any existing collection.
    pub fn replace(&self, name: &str, index: VectorIndex) -> Result<(), DocChatError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| DocChatError::Storage(format!("store lock poisoned: {}", e)))?;
        collections.insert(name.to_string(), index);
        Ok(())
    }

    /// Look up a collection by name. The returned index shares storage with
    /// the stored one.
    pub fn get(&self, name: &str) -> Option<VectorIndex> {
        self.collections
            .read()
            .ok()
            .and_then(|c| c.get(name).cloned())
    }

    /// True if a collection with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.collections
            .read()
            .map(|c| c.contains_key(name))
            .unwrap_or(false)
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 on length mismatch or zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();

    let mag_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}
