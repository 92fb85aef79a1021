//! Ingestion service contract and the local reference backend.
//!
//! Ingestion converts a staged document into a persisted vector index and
//! returns the opaque handle that names it. The handle is stable across
//! re-ingestion: it is derived from the configured collection name, and
//! re-running ingestion replaces the collection under that same name.

use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use docchat_core::config::IngestionConfig;
use docchat_core::types::{DocumentRef, IndexHandle};

use crate::chunker::chunk_text;
use crate::embedding::EmbeddingService;
use crate::error::IngestionError;
use crate::index::{VectorIndex, VectorStore};

/// Converts a document into a persisted vector index.
///
/// Safe to call repeatedly for the same document; latency may be seconds,
/// and the caller blocks until the result is available.
pub trait IngestionService: Send + Sync {
    /// Build (or rebuild) the vector index for `document`.
    fn create_index(
        &self,
        document: &DocumentRef,
    ) -> impl std::future::Future<Output = Result<IndexHandle, IngestionError>> + Send;
}

/// In-process ingestion backend over a [`VectorStore`].
///
/// Pipeline: read staged bytes -> extract text -> chunk -> embed -> build a
/// fresh index -> replace the named collection.
pub struct LocalIngestionService<E: EmbeddingService> {
    store: VectorStore,
    embedder: E,
    config: IngestionConfig,
}

impl<E: EmbeddingService> LocalIngestionService<E> {
    pub fn new(store: VectorStore, embedder: E, config: IngestionConfig) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    /// The configuration this service was constructed with.
    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }
}

impl<E: EmbeddingService> IngestionService for LocalIngestionService<E> {
    async fn create_index(&self, document: &DocumentRef) -> Result<IndexHandle, IngestionError> {
        let bytes = tokio::fs::read(&document.path).await.map_err(|e| {
            IngestionError::new(format!(
                "read staged document {}: {}",
                document.path.display(),
                e
            ))
        })?;

        let text = extract_text(&bytes);
        if text.trim().is_empty() {
            return Err(IngestionError::new(format!(
                "document '{}' yields no extractable text",
                document.filename
            )));
        }

        let chunks = chunk_text(&text, self.config.chunk_size, self.config.chunk_overlap)
            .map_err(|e| IngestionError::new(e.to_string()))?;
        debug!(
            document = %document.id,
            chunks = chunks.len(),
            "Document chunked for ingestion"
        );

        let index = VectorIndex::new();
        for (position, chunk) in chunks.iter().enumerate() {
            let mut embedding = self
                .embedder
                .embed(chunk)
                .await
                .map_err(|e| IngestionError::new(e.to_string()))?;
            if self.config.normalize_embeddings {
                l2_normalize(&mut embedding);
            }

            index
                .insert(
                    Uuid::new_v4(),
                    embedding,
                    json!({
                        "text": chunk,
                        "position": position,
                        "source": &document.filename,
                    }),
                )
                .map_err(|e| IngestionError::new(e.to_string()))?;
        }

        // Replace-under-same-name: re-ingestion overwrites the prior index
        // while the handle stays stable.
        self.store
            .replace(&self.config.collection_name, index)
            .map_err(|e| IngestionError::new(e.to_string()))?;

        info!(
            document = %document.id,
            collection = %self.config.collection_name,
            chunks = chunks.len(),
            "Vector index built"
        );

        Ok(IndexHandle::new(&self.config.collection_name))
    }
}

/// Extract indexable text from raw document bytes.
///
/// The local backend indexes whatever text the bytes contain; full
/// format-aware extraction (PDF object streams, OCR) belongs to external
/// ingestion backends behind the same trait.
fn extract_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .map(|c| {
            if c == '\u{FFFD}' || (c.is_control() && !c.is_whitespace()) {
                ' '
            } else {
                c
            }
        })
        .collect()
}

/// Scale a vector to unit length in place. Zero vectors are left unchanged.
fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedding;
    use chrono::Utc;
    use std::io::Write;
    use std::path::PathBuf;

    fn stage_fixture(dir: &tempfile::TempDir, content: &[u8]) -> DocumentRef {
        let path = dir.path().join("fixture.pdf");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content).unwrap();
        DocumentRef {
            id: Uuid::new_v4(),
            filename: "fixture.pdf".to_string(),
            size: content.len() as u64,
            path,
            staged_at: Utc::now(),
        }
    }

    fn make_service(store: VectorStore) -> LocalIngestionService<HashEmbedding> {
        LocalIngestionService::new(store, HashEmbedding::new(), IngestionConfig::default())
    }

    #[tokio::test]
    async fn test_create_index_returns_collection_handle() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::new();
        let service = make_service(store.clone());
        let doc = stage_fixture(&dir, b"A short document about Rust ownership and borrowing.");

        let handle = service.create_index(&doc).await.unwrap();
        assert_eq!(handle.as_str(), "vector_db");
        assert!(store.contains("vector_db"));
        assert!(store.get("vector_db").unwrap().len() >= 1);
    }

    #[tokio::test]
    async fn test_reingestion_replaces_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::new();
        let service = make_service(store.clone());

        let long = stage_fixture(&dir, "alpha beta ".repeat(500).as_bytes());
        let h1 = service.create_index(&long).await.unwrap();
        let count_long = store.get("vector_db").unwrap().len();
        assert!(count_long > 1);

        let short = stage_fixture(&dir, b"tiny document");
        let h2 = service.create_index(&short).await.unwrap();
        let count_short = store.get("vector_db").unwrap().len();

        // Same stable handle, fresh contents.
        assert_eq!(h1, h2);
        assert_eq!(count_short, 1);
    }

    #[tokio::test]
    async fn test_missing_file_errors() {
        let store = VectorStore::new();
        let service = make_service(store);
        let doc = DocumentRef {
            id: Uuid::new_v4(),
            filename: "gone.pdf".to_string(),
            size: 0,
            path: PathBuf::from("/nonexistent/gone.pdf"),
            staged_at: Utc::now(),
        };

        let result = service.create_index(&doc).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().cause.contains("gone.pdf"));
    }

    #[tokio::test]
    async fn test_textless_document_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::new();
        let service = make_service(store.clone());
        let doc = stage_fixture(&dir, &[0u8, 1, 2, 3, 4, 5]);

        let result = service.create_index(&doc).await;
        assert!(result.is_err());
        assert!(!store.contains("vector_db"));
    }

    #[tokio::test]
    async fn test_chunk_metadata_carries_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::new();
        let service = make_service(store.clone());
        let doc = stage_fixture(&dir, b"The title of this report is Quarterly Review.");

        service.create_index(&doc).await.unwrap();
        let index = store.get("vector_db").unwrap();
        let query = HashEmbedding::new()
            .embed("The title of this report is Quarterly Review.")
            .await
            .unwrap();
        let hits = index.search(&query, 1).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].metadata["text"]
            .as_str()
            .unwrap()
            .contains("Quarterly Review"));
        assert_eq!(hits[0].metadata["source"], "fixture.pdf");
    }

    #[test]
    fn test_extract_text_filters_binary_noise() {
        let text = extract_text(b"hello\x00\x01world\n");
        assert!(text.contains("hello"));
        assert!(text.contains("world"));
        assert!(text.contains('\n'));
        assert!(!text.contains('\x00'));
    }

    #[test]
    fn test_l2_normalize() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        l2_normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }
}
