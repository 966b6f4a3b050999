/// Facade wiring the embedder, vector index, registry, and services
/// together from configuration
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::application::dto::{ChunkInput, SearchOutcome};
use crate::application::ports::VectorIndex;
use crate::application::services::{IndexingService, IndexingStats, RetrievalService};
use crate::config::AppConfig;
use crate::domain::RetrievalError;
use crate::infrastructure::chunking::TextChunker;
use crate::infrastructure::embeddings::FastEmbedService;
use crate::infrastructure::persistence::MinistryRegistry;
use crate::infrastructure::vector_index::QdrantVectorIndex;

/// Entry point the UI/LLM layers talk to.
///
/// Construction is fatal on an unreachable backend; per-query and per-chunk
/// trouble after that degrades and logs instead of raising.
pub struct DocumentStore {
    indexing: IndexingService<FastEmbedService, QdrantVectorIndex>,
    retrieval: RetrievalService<FastEmbedService, QdrantVectorIndex>,
    registry: Arc<Mutex<MinistryRegistry>>,
    index: Arc<QdrantVectorIndex>,
}

impl DocumentStore {
    /// Connect to the backends and load (or rebuild) the ministry registry.
    pub async fn connect(config: AppConfig) -> Result<Self> {
        info!(collection = %config.collection_name, "initializing document store");

        let embedder = Arc::new(
            FastEmbedService::new(config.model)
                .await
                .context("failed to initialize embedding service")?,
        );
        let index = Arc::new(
            QdrantVectorIndex::new(
                &config.qdrant_url,
                &config.collection_name,
                config.model.dimension_count(),
                config.batch_size,
            )
            .await
            .context("failed to initialize vector index")?,
        );

        let mut registry =
            MinistryRegistry::new(config.registry_path.clone(), config.registry_actor.clone());
        registry.load(index.as_ref(), config.scan_limit).await;
        let registry = Arc::new(Mutex::new(registry));

        let chunker = TextChunker::new(config.chunk_size, config.chunk_overlap);
        let indexing = IndexingService::new(
            Arc::clone(&embedder),
            Arc::clone(&index),
            Arc::clone(&registry),
            chunker,
            config.batch_size,
        );
        let retrieval = RetrievalService::new(embedder, Arc::clone(&index));

        Ok(DocumentStore {
            indexing,
            retrieval,
            registry,
            index,
        })
    }

    /// Index pre-chunked records for one ministry.
    pub async fn index_ministry(
        &self,
        ministry: &str,
        chunks: Vec<ChunkInput>,
    ) -> Result<IndexingStats> {
        self.indexing.index_ministry(ministry, chunks).await
    }

    /// Chunk and index a full document's extracted text.
    pub async fn index_document(
        &self,
        ministry: &str,
        source: &str,
        text: &str,
        base_metadata: Map<String, Value>,
    ) -> Result<IndexingStats> {
        self.indexing
            .index_document(ministry, source, text, base_metadata)
            .await
    }

    /// Search one ministry's documents.
    pub async fn search(
        &self,
        query: &str,
        ministry: &str,
        n_results: usize,
    ) -> Result<SearchOutcome, RetrievalError> {
        self.retrieval.search(query, ministry, n_results).await
    }

    /// Ministries with at least one indexed chunk, per the registry.
    pub async fn ministries(&self) -> Vec<String> {
        self.registry
            .lock()
            .await
            .ministries()
            .iter()
            .cloned()
            .collect()
    }

    pub async fn is_indexed(&self, ministry: &str) -> bool {
        self.registry.lock().await.is_indexed(ministry)
    }

    /// Remove every stored record and empty the registry (full rebuild).
    pub async fn clear(&self) -> Result<()> {
        self.index.delete_all().await?;
        self.registry.lock().await.clear();
        info!("cleared document store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: These tests require a running Qdrant instance
    // Run with: docker run -p 6333:6333 -p 6334:6334 qdrant/qdrant

    #[tokio::test]
    #[ignore] // Requires running Qdrant instance
    async fn test_connect_and_search_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            collection_name: format!("test_{}", uuid::Uuid::new_v4()),
            registry_path: dir.path().join("indexed_ministries.json"),
            ..Default::default()
        };

        let store = DocumentStore::connect(config).await.unwrap();
        let outcome = store.search("budget", "Ministry of Finance", 5).await;

        assert!(outcome.is_ok());
        assert!(outcome.unwrap().is_empty());
    }
}
