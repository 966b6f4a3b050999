/// Query path: embed, filtered nearest-neighbor search, fallback, dedup,
/// ranking
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::application::dto::{RankedResult, SearchOutcome};
use crate::application::ports::{Embedder, VectorIndex};
use crate::domain::{EmbeddingVector, RetrievalError, ScoredChunk};

/// Stateless retrieval engine. Each `search` call is independent; no
/// session or pagination state is retained.
pub struct RetrievalService<E, V> {
    embedder: Arc<E>,
    index: Arc<V>,
}

impl<E: Embedder, V: VectorIndex> RetrievalService<E, V> {
    pub fn new(embedder: Arc<E>, index: Arc<V>) -> Self {
        RetrievalService { embedder, index }
    }

    /// Search one ministry's documents for the query text.
    ///
    /// A filtered query that fails or comes back empty is retried once
    /// without the ministry filter; the outcome's `filtered` flag tells the
    /// caller which path produced the results. An empty outcome is a normal
    /// result, not an error.
    pub async fn search(
        &self,
        query: &str,
        ministry: &str,
        n_results: usize,
    ) -> Result<SearchOutcome, RetrievalError> {
        debug!(%ministry, n_results, "searching");

        let embedding = self
            .embedder
            .embed_text(query)
            .await
            .map_err(RetrievalError::EmbeddingFailed)?;

        // Over-fetch so exact-text dedup can shrink the set without
        // starving it.
        let fetch = n_results.saturating_mul(2);

        let (candidates, filtered) = match self.index.query(&embedding, Some(ministry), fetch).await
        {
            Ok(hits) if !hits.is_empty() => (hits, true),
            Ok(_) => {
                info!(%ministry, "filtered search empty, retrying without ministry filter");
                (self.unfiltered(&embedding, fetch).await?, false)
            }
            Err(error) => {
                warn!(%ministry, %error, "filtered search failed, retrying without ministry filter");
                (self.unfiltered(&embedding, fetch).await?, false)
            }
        };

        let mut results = rank(candidates);
        results.truncate(n_results);

        debug!(count = results.len(), filtered, "search completed");
        Ok(SearchOutcome { results, filtered })
    }

    async fn unfiltered(
        &self,
        embedding: &EmbeddingVector,
        fetch: usize,
    ) -> Result<Vec<ScoredChunk>, RetrievalError> {
        self.index
            .query(embedding, None, fetch)
            .await
            .map_err(RetrievalError::BackendUnavailable)
    }
}

/// Deduplicate by exact text (first occurrence wins, in index order), score
/// survivors, and sort best-first.
fn rank(candidates: Vec<ScoredChunk>) -> Vec<RankedResult> {
    let mut seen_texts = HashSet::new();
    let mut results: Vec<RankedResult> = Vec::new();

    for hit in candidates {
        if !seen_texts.insert(hit.text.clone()) {
            continue;
        }
        results.push(RankedResult {
            id: hit.id,
            relevance_score: 1.0 - hit.distance,
            distance: hit.distance,
            text: hit.text,
            metadata: hit.metadata.into_map(),
        });
    }

    results.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    results
}
