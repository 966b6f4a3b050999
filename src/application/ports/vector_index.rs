use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::domain::{DocumentChunk, EmbeddingVector, ScoredChunk};

/// Persistent collection of (id, text, metadata, vector) records with
/// approximate nearest-neighbor search.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert records, overwriting any record with the same id.
    /// Implementations bound the batch size sent to the backend.
    async fn upsert(&self, records: Vec<(DocumentChunk, EmbeddingVector)>) -> Result<()>;

    /// Nearest-neighbor query under cosine distance, optionally restricted
    /// to one ministry by metadata equality. Returns up to `limit` matches
    /// ordered best-first.
    async fn query(
        &self,
        embedding: &EmbeddingVector,
        ministry: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ScoredChunk>>;

    /// Distinct `ministry` values across stored records, scanning at most
    /// `scan_limit` of them. Used to rebuild the registry.
    async fn distinct_ministries(&self, scan_limit: usize) -> Result<BTreeSet<String>>;

    /// Remove every record (full rebuild path).
    async fn delete_all(&self) -> Result<()>;
}
