/// Pipeline that drives chunking, embedding, and vector storage
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::application::dto::ChunkInput;
use crate::application::ports::{Embedder, VectorIndex};
use crate::domain::{ChunkId, ChunkMetadata, DocumentChunk};
use crate::infrastructure::chunking::TextChunker;
use crate::infrastructure::persistence::MinistryRegistry;

/// Indexes ministry document chunks into the vector store.
///
/// One ministry's run is the retry unit: an upsert failure propagates and
/// the caller may re-run `index_ministry` in full. Content-derived ids make
/// the re-run an overwrite rather than a duplicate.
pub struct IndexingService<E, V> {
    embedder: Arc<E>,
    index: Arc<V>,
    registry: Arc<Mutex<MinistryRegistry>>,
    chunker: TextChunker,
    batch_size: usize,
}

impl<E: Embedder, V: VectorIndex> IndexingService<E, V> {
    pub fn new(
        embedder: Arc<E>,
        index: Arc<V>,
        registry: Arc<Mutex<MinistryRegistry>>,
        chunker: TextChunker,
        batch_size: usize,
    ) -> Self {
        IndexingService {
            embedder,
            index,
            registry,
            chunker,
            batch_size: batch_size.max(1),
        }
    }

    /// Index a batch of pre-chunked records for one ministry.
    ///
    /// Invalid chunks (empty text) are logged and skipped; the run never
    /// aborts because of one bad chunk. On completion the ministry is
    /// recorded in the registry.
    pub async fn index_ministry(
        &self,
        ministry: &str,
        chunks: Vec<ChunkInput>,
    ) -> Result<IndexingStats> {
        if chunks.is_empty() {
            warn!(%ministry, "no chunks to index");
            return Ok(IndexingStats::default());
        }

        let mut stats = IndexingStats::default();
        let mut batch: Vec<DocumentChunk> = Vec::new();

        for (position, input) in chunks.into_iter().enumerate() {
            let text = input.text.trim();
            if text.is_empty() {
                debug!(%ministry, position, "skipping empty chunk");
                stats.chunks_skipped += 1;
                continue;
            }

            let mut metadata = ChunkMetadata::sanitize(input.metadata);
            metadata.ensure_ministry(ministry);

            let source = metadata
                .get("source")
                .and_then(Value::as_str)
                .unwrap_or(ministry)
                .to_string();
            let id = match &input.id {
                Some(id) => ChunkId::from_external(id),
                None => ChunkId::from_content(&source, position, text),
            };

            match DocumentChunk::new(id, text, metadata) {
                Ok(chunk) => batch.push(chunk),
                Err(error) => {
                    warn!(%ministry, position, %error, "skipping invalid chunk");
                    stats.chunks_skipped += 1;
                    continue;
                }
            }

            if batch.len() >= self.batch_size {
                self.flush_batch(&mut batch, &mut stats).await?;
            }
        }

        self.flush_batch(&mut batch, &mut stats).await?;

        self.registry.lock().await.mark_indexed(ministry);

        info!(
            %ministry,
            stored = stats.chunks_stored,
            skipped = stats.chunks_skipped,
            "indexing run completed"
        );
        Ok(stats)
    }

    /// Chunk a full document's extracted text and index the pieces.
    ///
    /// Attaches the position metadata the UI layer links back to the source
    /// file with.
    pub async fn index_document(
        &self,
        ministry: &str,
        source: &str,
        text: &str,
        base_metadata: Map<String, Value>,
    ) -> Result<IndexingStats> {
        let pieces = self.chunker.chunk(text);
        if pieces.is_empty() {
            warn!(%ministry, %source, "document produced no chunks");
            return Ok(IndexingStats::default());
        }

        let total_chunks = pieces.len();
        let filename = source.rsplit('/').next().unwrap_or(source).to_string();
        let processed_at = Utc::now().to_rfc3339();

        let inputs = pieces
            .into_iter()
            .enumerate()
            .map(|(chunk_index, piece)| {
                let mut metadata = base_metadata.clone();
                metadata.insert("chunk_index".to_string(), json!(chunk_index));
                metadata.insert("total_chunks".to_string(), json!(total_chunks));
                metadata.insert("source".to_string(), json!(source));
                metadata.insert("filename".to_string(), json!(filename));
                metadata.insert("processed_at".to_string(), json!(processed_at));
                ChunkInput::new(piece).with_metadata(metadata)
            })
            .collect();

        self.index_ministry(ministry, inputs).await
    }

    /// Embed and store one batch. An error here is fatal for the run.
    async fn flush_batch(
        &self,
        batch: &mut Vec<DocumentChunk>,
        stats: &mut IndexingStats,
    ) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        debug!(count = batch.len(), "flushing chunk batch");

        let texts: Vec<&str> = batch.iter().map(|c| c.text()).collect();
        let embeddings = self
            .embedder
            .embed_batch(texts)
            .await
            .context("failed to embed chunk batch")?;

        let count = batch.len();
        let records: Vec<_> = batch.drain(..).zip(embeddings).collect();
        self.index
            .upsert(records)
            .await
            .context("failed to store chunk batch")?;

        stats.chunks_stored += count;
        Ok(())
    }
}

/// Statistics from one indexing run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexingStats {
    pub chunks_stored: usize,
    pub chunks_skipped: usize,
}
