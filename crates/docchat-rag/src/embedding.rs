//! Embedding service trait and the bundled local implementation.
//!
//! Real model backends (sentence transformers, hosted APIs) live outside
//! this workspace and implement [`EmbeddingService`]; their inference
//! internals are not this system's concern. `HashEmbedding` provides
//! deterministic unit vectors so the local backends and the test suite run
//! without a model.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use docchat_core::error::DocChatError;

/// Service for generating text embeddings.
///
/// Implementations convert text into fixed-dimensional vectors. Used for
/// both ingestion (chunk vectors) and retrieval (query vectors).
pub trait EmbeddingService: Send + Sync {
    /// Generate an embedding vector for the given text.
    fn embed(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>, DocChatError>> + Send;

    /// Return the dimensionality of vectors produced by this service.
    fn dimensions(&self) -> usize;
}

/// Deterministic hash-based embedding service.
///
/// The output is derived from a hash of the input text, so identical inputs
/// always produce identical unit vectors. Different texts map to effectively
/// uncorrelated directions, which is enough for the local vector index to
/// rank an exact or near-exact passage first.
#[derive(Debug, Clone, Default)]
pub struct HashEmbedding;

impl HashEmbedding {
    pub const DIMENSIONS: usize = 384;

    pub fn new() -> Self {
        Self
    }

    fn hash_to_vector(text: &str) -> Vec<f32> {
        let mut result = Vec::with_capacity(Self::DIMENSIONS);
        for i in 0..Self::DIMENSIONS {
            let mut hasher = DefaultHasher::new();
            text.hash(&mut hasher);
            i.hash(&mut hasher);
            let h = hasher.finish();
            let val = ((h as f64) / (u64::MAX as f64)) * 2.0 - 1.0;
            result.push(val as f32);
        }

        // L2-normalize so cosine similarity stays within [-1, 1] despite
        // floating-point rounding.
        let norm: f32 = result.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut result {
                *val /= norm;
            }
        }

        result
    }
}

impl EmbeddingService for HashEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DocChatError> {
        if text.is_empty() {
            return Err(DocChatError::Embedding(
                "cannot embed empty text".to_string(),
            ));
        }
        Ok(Self::hash_to_vector(text))
    }

    fn dimensions(&self) -> usize {
        Self::DIMENSIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embedding_dimension() {
        let service = HashEmbedding::new();
        let vec = service.embed("hello world").await.unwrap();
        assert_eq!(vec.len(), HashEmbedding::DIMENSIONS);
    }

    #[tokio::test]
    async fn test_embedding_deterministic() {
        let service = HashEmbedding::new();
        let v1 = service.embed("same text").await.unwrap();
        let v2 = service.embed("same text").await.unwrap();
        assert_eq!(v1, v2);
    }

    #[tokio::test]
    async fn test_embedding_different_inputs() {
        let service = HashEmbedding::new();
        let v1 = service.embed("text one").await.unwrap();
        let v2 = service.embed("text two").await.unwrap();
        assert_ne!(v1, v2);
    }

    #[tokio::test]
    async fn test_embedding_empty_text_errors() {
        let service = HashEmbedding::new();
        let result = service.embed("").await;
        assert!(matches!(result, Err(DocChatError::Embedding(_))));
    }

    #[tokio::test]
    async fn test_embedding_is_unit_vector() {
        let service = HashEmbedding::new();
        let vec = service.embed("normalize me").await.unwrap();
        let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "norm was {}", norm);
    }

    #[test]
    fn test_dimensions_accessor() {
        let service = HashEmbedding::new();
        assert_eq!(service.dimensions(), 384);
    }
}
