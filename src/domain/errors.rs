/// Error types for the retrieval core
use thiserror::Error;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Validation errors raised when constructing domain values
#[derive(Debug, Error)]
pub enum DomainError {
    /// Invalid value provided
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// Two vectors with different dimension counts were combined
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Failures the retrieval path reports to its caller.
///
/// An empty result set is not an error; it is a normal outcome. These
/// variants exist so callers can tell "legitimately nothing found" apart
/// from "the backend is down".
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The query text could not be embedded. Never substituted with a zero
    /// vector, since that would corrupt ranking.
    #[error("failed to embed query text")]
    EmbeddingFailed(#[source] anyhow::Error),
    /// Both the filtered and the unfiltered query paths failed.
    #[error("vector index unavailable")]
    BackendUnavailable(#[source] anyhow::Error),
}
