use anyhow::Result;
use async_trait::async_trait;

use crate::domain::EmbeddingVector;

/// Turns text into fixed-dimension vectors.
///
/// Deterministic for a fixed model version. Failure propagates as a hard
/// error; implementations must never substitute a zero vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed_text(&self, text: &str) -> Result<EmbeddingVector>;

    /// Embed a batch of texts, returning vectors in input order.
    async fn embed_batch(&self, texts: Vec<&str>) -> Result<Vec<EmbeddingVector>>;

    /// Dimension count of the vectors this embedder produces.
    fn dimension_count(&self) -> usize;
}
