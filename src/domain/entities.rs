/// Entities stored in and returned by the vector index
use super::errors::{DomainError, DomainResult};
use super::value_objects::{ChunkId, ChunkMetadata, UNKNOWN_MINISTRY};
use serde::{Deserialize, Serialize};

/// A unit of indexed text.
///
/// Chunks are written once and never mutated in place; re-indexing the same
/// source produces the same content-derived ids, so writes are upserts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    id: ChunkId,
    text: String,
    metadata: ChunkMetadata,
}

impl DocumentChunk {
    /// Build a chunk, enforcing the storage invariants: text is non-empty
    /// after trimming and the metadata carries a ministry field.
    pub fn new(
        id: ChunkId,
        text: impl Into<String>,
        mut metadata: ChunkMetadata,
    ) -> DomainResult<Self> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(DomainError::InvalidValue(
                "chunk text cannot be empty".to_string(),
            ));
        }
        metadata.ensure_ministry(UNKNOWN_MINISTRY);
        Ok(DocumentChunk { id, text, metadata })
    }

    pub fn id(&self) -> &ChunkId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn metadata(&self) -> &ChunkMetadata {
        &self.metadata
    }
}

/// A raw match returned by the vector index before scoring and dedup.
///
/// `distance` is the index's cosine distance (`1 - cosine_similarity`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
    pub distance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_rejects_empty_text() {
        let id = ChunkId::from_content("a.pdf", 0, "text");
        assert!(DocumentChunk::new(id, "   \n ", ChunkMetadata::new()).is_err());
    }

    #[test]
    fn test_chunk_trims_and_defaults_ministry() {
        let id = ChunkId::from_content("a.pdf", 0, "text");
        let chunk = DocumentChunk::new(id, "  Budget details  ", ChunkMetadata::new()).unwrap();

        assert_eq!(chunk.text(), "Budget details");
        assert_eq!(chunk.metadata().ministry(), UNKNOWN_MINISTRY);
    }
}
