/// Value objects for the retrieval domain
use super::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Metadata key every stored chunk carries
pub const MINISTRY_KEY: &str = "ministry";

/// Sentinel ministry for chunks indexed without one
pub const UNKNOWN_MINISTRY: &str = "Unknown Ministry";

/// Stable identifier for a stored chunk.
///
/// Ids are UUIDs because the vector backend only accepts UUIDs or unsigned
/// integers as point ids. Content-derived ids (UUIDv5) make re-indexing the
/// same input idempotent: same input, same id, upsert overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkId(Uuid);

impl ChunkId {
    /// Derive an id from the chunk's source document, position, and text.
    pub fn from_content(source: &str, chunk_index: usize, text: &str) -> Self {
        let seed = format!("{source}\u{1f}{chunk_index}\u{1f}{text}");
        ChunkId(Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes()))
    }

    /// Accept a caller-supplied id, mapping non-UUID strings onto a
    /// deterministic UUID so the backend will take them.
    pub fn from_external(id: &str) -> Self {
        match Uuid::parse_str(id) {
            Ok(uuid) => ChunkId(uuid),
            Err(_) => ChunkId(Uuid::new_v5(&Uuid::NAMESPACE_OID, id.as_bytes())),
        }
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Flat map of scalar metadata attached to a chunk.
///
/// Always contains a `ministry` entry once sanitized; other keys
/// (`filename`, `source`, `chunk_index`, ...) are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkMetadata(Map<String, Value>);

impl ChunkMetadata {
    pub fn new() -> Self {
        ChunkMetadata(Map::new())
    }

    /// Clean an arbitrary metadata map for storage: drop nulls, keep
    /// scalars as-is, and render anything structured as a string.
    pub fn sanitize(raw: Map<String, Value>) -> Self {
        let mut cleaned = Map::new();
        for (key, value) in raw {
            match value {
                Value::Null => continue,
                Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                    cleaned.insert(key, value);
                }
                other => {
                    cleaned.insert(key, Value::String(other.to_string()));
                }
            }
        }
        ChunkMetadata(cleaned)
    }

    /// Set the ministry field if it is not already present.
    pub fn ensure_ministry(&mut self, ministry: &str) {
        if !self.0.contains_key(MINISTRY_KEY) {
            self.0
                .insert(MINISTRY_KEY.to_string(), Value::String(ministry.to_string()));
        }
    }

    pub fn ministry(&self) -> &str {
        self.0
            .get(MINISTRY_KEY)
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_MINISTRY)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ChunkMetadata {
    fn from(map: Map<String, Value>) -> Self {
        ChunkMetadata::sanitize(map)
    }
}

/// A fixed-dimension embedding produced by the embedding model
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> DomainResult<Self> {
        if values.is_empty() {
            return Err(DomainError::InvalidValue(
                "embedding vector cannot be empty".to_string(),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(DomainError::InvalidValue(
                "embedding vector contains non-finite values".to_string(),
            ));
        }
        Ok(EmbeddingVector(values))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn dimension_count(&self) -> usize {
        self.0.len()
    }

    pub fn cosine_similarity(&self, other: &Self) -> DomainResult<f32> {
        if self.0.len() != other.0.len() {
            return Err(DomainError::DimensionMismatch {
                expected: self.0.len(),
                actual: other.0.len(),
            });
        }

        let dot: f32 = self.0.iter().zip(&other.0).map(|(a, b)| a * b).sum();
        let norm_a: f32 = self.0.iter().map(|v| v * v).sum::<f32>().sqrt();
        let norm_b: f32 = other.0.iter().map(|v| v * v).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return Ok(0.0);
        }
        Ok(dot / (norm_a * norm_b))
    }
}

/// Embedding models supported by the retrieval core
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmbeddingModel {
    /// all-MiniLM-L6-v2, 384 dimensions
    #[default]
    AllMiniLML6V2,
}

impl EmbeddingModel {
    pub fn dimension_count(&self) -> usize {
        match self {
            EmbeddingModel::AllMiniLML6V2 => 384,
        }
    }
}

impl fmt::Display for EmbeddingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingModel::AllMiniLML6V2 => write!(f, "all-MiniLM-L6-v2"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chunk_id_is_content_derived() {
        let a = ChunkId::from_content("report.pdf", 0, "Budget details");
        let b = ChunkId::from_content("report.pdf", 0, "Budget details");
        let c = ChunkId::from_content("report.pdf", 1, "Budget details");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_chunk_id_from_external() {
        let uuid = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";
        let id = ChunkId::from_external(uuid);
        assert_eq!(id.to_string(), uuid);

        // Non-UUID caller ids map onto a deterministic UUID
        let mapped1 = ChunkId::from_external("doc_1718000000_0_3");
        let mapped2 = ChunkId::from_external("doc_1718000000_0_3");
        assert_eq!(mapped1, mapped2);
        assert_ne!(mapped1, id);
    }

    #[test]
    fn test_metadata_sanitize_drops_nulls_and_flattens() {
        let mut raw = Map::new();
        raw.insert("filename".to_string(), json!("q123.pdf"));
        raw.insert("session".to_string(), json!(4));
        raw.insert("verified".to_string(), json!(true));
        raw.insert("missing".to_string(), Value::Null);
        raw.insert("nested".to_string(), json!({"a": 1}));

        let metadata = ChunkMetadata::sanitize(raw);
        assert_eq!(metadata.get("filename"), Some(&json!("q123.pdf")));
        assert_eq!(metadata.get("session"), Some(&json!(4)));
        assert_eq!(metadata.get("verified"), Some(&json!(true)));
        assert!(metadata.get("missing").is_none());
        assert!(metadata.get("nested").unwrap().is_string());
    }

    #[test]
    fn test_metadata_ministry_defaulting() {
        let mut metadata = ChunkMetadata::new();
        assert_eq!(metadata.ministry(), UNKNOWN_MINISTRY);

        metadata.ensure_ministry("Ministry of Coal");
        assert_eq!(metadata.ministry(), "Ministry of Coal");

        // ensure_ministry never overwrites an existing value
        metadata.ensure_ministry("Ministry of Power");
        assert_eq!(metadata.ministry(), "Ministry of Coal");
    }

    #[test]
    fn test_embedding_vector_validation() {
        assert!(EmbeddingVector::new(vec![]).is_err());
        assert!(EmbeddingVector::new(vec![0.1, f32::NAN]).is_err());

        let vector = EmbeddingVector::new(vec![0.1; 384]).unwrap();
        assert_eq!(vector.dimension_count(), 384);
    }

    #[test]
    fn test_cosine_similarity() {
        let a = EmbeddingVector::new(vec![1.0, 0.0]).unwrap();
        let b = EmbeddingVector::new(vec![1.0, 0.0]).unwrap();
        let c = EmbeddingVector::new(vec![0.0, 1.0]).unwrap();

        assert!((a.cosine_similarity(&b).unwrap() - 1.0).abs() < 1e-6);
        assert!(a.cosine_similarity(&c).unwrap().abs() < 1e-6);

        let short = EmbeddingVector::new(vec![1.0]).unwrap();
        assert!(a.cosine_similarity(&short).is_err());
    }

    #[test]
    fn test_embedding_model_dimensions() {
        assert_eq!(EmbeddingModel::default().dimension_count(), 384);
        assert_eq!(EmbeddingModel::AllMiniLML6V2.to_string(), "all-MiniLM-L6-v2");
    }
}
