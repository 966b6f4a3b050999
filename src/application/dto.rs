/// Data transfer types crossing the application boundary
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A chunk as supplied by the upstream document source.
///
/// `id` is optional; when absent the pipeline derives a content-addressed
/// one. Metadata is an arbitrary flat map and is sanitized before storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl ChunkInput {
    pub fn new(text: impl Into<String>) -> Self {
        ChunkInput {
            id: None,
            text: text.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A ranked retrieval result handed to the downstream consumer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    pub id: String,
    pub text: String,
    pub metadata: Map<String, Value>,
    /// Raw cosine distance reported by the index
    pub distance: f32,
    /// `1 - distance`; results are sorted descending by this
    pub relevance_score: f32,
}

/// The outcome of one search call.
///
/// `filtered` is false when the results came from the unfiltered fallback
/// path and may span ministries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub results: Vec<RankedResult>,
    pub filtered: bool,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
