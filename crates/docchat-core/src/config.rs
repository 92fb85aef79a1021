use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{DocChatError, Result};

/// Top-level configuration for the DocChat application.
///
/// Loaded from `~/.docchat/config.toml` by default. The `ingestion` and
/// `retrieval` sections are the configuration surfaces of the two external
/// collaborators; the orchestrator passes them through unchanged and never
/// interprets them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocChatConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl DocChatConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DocChatConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| DocChatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for staged documents and other state.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.docchat/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Document staging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory where staged documents are persisted, relative to `data_dir`
    /// unless absolute.
    pub staging_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            staging_dir: "staging".to_string(),
        }
    }
}

/// Ingestion service configuration surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Embedding model identifier.
    pub model_identifier: String,
    /// Compute device for the embedding model: "cpu" or "cuda".
    pub compute_device: String,
    /// Whether to L2-normalize embeddings.
    pub normalize_embeddings: bool,
    /// Endpoint of the vector store.
    pub store_endpoint: String,
    /// Name of the vector collection; also the stable index handle for
    /// re-ingestion.
    pub collection_name: String,
    /// Chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            model_identifier: "BAAI/bge-small-en".to_string(),
            compute_device: "cpu".to_string(),
            normalize_embeddings: true,
            store_endpoint: "http://localhost:6333".to_string(),
            collection_name: "vector_db".to_string(),
            chunk_size: 1000,
            chunk_overlap: 250,
        }
    }
}

/// Retrieval service configuration surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Embedding model identifier used for query vectors.
    pub model_identifier: String,
    /// Compute device for the embedding model.
    pub compute_device: String,
    /// Language model identifier used to generate answers.
    pub llm_model_identifier: String,
    /// Sampling temperature for the language model.
    pub llm_temperature: f64,
    /// Endpoint of the vector store.
    pub store_endpoint: String,
    /// Name of the vector collection to answer from.
    pub collection_name: String,
    /// Number of passages retrieved per query.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            model_identifier: "BAAI/bge-small-en".to_string(),
            compute_device: "cpu".to_string(),
            llm_model_identifier: "llama3.2:3b".to_string(),
            llm_temperature: 0.7,
            store_endpoint: "http://localhost:6333".to_string(),
            collection_name: "vector_db".to_string(),
            top_k: 4,
        }
    }
}
