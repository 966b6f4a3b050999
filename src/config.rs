/// Configuration for the retrieval core
use crate::domain::EmbeddingModel;
use std::path::PathBuf;

/// Settings for connecting and indexing.
///
/// Plain struct with defaults; the embedding/UI layers above decide where
/// the values come from.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Qdrant server URL
    pub qdrant_url: String,
    /// Collection name in qdrant
    pub collection_name: String,
    /// Embedding model to use
    pub model: EmbeddingModel,
    /// Target chunk length in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
    /// Records per upsert batch
    pub batch_size: usize,
    /// Durable registry file for the indexed-ministries set
    pub registry_path: PathBuf,
    /// Actor tag written into the registry file
    pub registry_actor: String,
    /// Upper bound on records scanned when rebuilding the registry
    pub scan_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            qdrant_url: "http://localhost:6334".to_string(),
            collection_name: "ministry_documents".to_string(),
            model: EmbeddingModel::default(),
            chunk_size: 1000,
            chunk_overlap: 200,
            batch_size: 100,
            registry_path: PathBuf::from("data/vector_db/indexed_ministries.json"),
            registry_actor: "ministry-qa".to_string(),
            scan_limit: 100_000,
        }
    }
}
