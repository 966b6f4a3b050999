/// Qdrant-backed vector index
use anyhow::{Context, Result};
use async_trait::async_trait;
use qdrant_client::{
    qdrant::{
        value::Kind, Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter,
        PointStruct, ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder,
        VectorParamsBuilder,
    },
    Payload, Qdrant,
};
use serde_json::json;
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::application::ports::VectorIndex;
use crate::domain::{ChunkMetadata, DocumentChunk, EmbeddingVector, ScoredChunk, MINISTRY_KEY};

/// Payload keys reserved for the record itself; everything else in the
/// payload is chunk metadata.
const CHUNK_ID_KEY: &str = "chunk_id";
const TEXT_KEY: &str = "text";

/// Persistent collection of ministry document chunks in qdrant, configured
/// for cosine distance.
pub struct QdrantVectorIndex {
    client: Qdrant,
    collection_name: String,
    dimension_count: usize,
    batch_size: usize,
}

impl QdrantVectorIndex {
    /// Connect and ensure the collection exists. An unreachable backend
    /// here is fatal; the caller must fix configuration and restart.
    pub async fn new(
        url: &str,
        collection_name: impl Into<String>,
        dimension_count: usize,
        batch_size: usize,
    ) -> Result<Self> {
        info!("Connecting to Qdrant at {}", url);

        let client = Qdrant::from_url(url)
            .build()
            .context("Failed to connect to Qdrant")?;

        let collection_name = collection_name.into();
        let index = QdrantVectorIndex {
            client,
            collection_name: collection_name.clone(),
            dimension_count,
            batch_size: batch_size.max(1),
        };

        if !index.collection_exists().await? {
            info!("Creating collection: {}", collection_name);
            index.create_collection().await?;
        } else {
            info!("Collection '{}' already exists", collection_name);
        }

        Ok(index)
    }

    async fn create_collection(&self) -> Result<()> {
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection_name).vectors_config(
                    VectorParamsBuilder::new(self.dimension_count as u64, Distance::Cosine),
                ),
            )
            .await
            .context("Failed to create collection")?;

        info!(
            "Created collection '{}' with {} dimensions",
            self.collection_name, self.dimension_count
        );
        Ok(())
    }

    async fn collection_exists(&self) -> Result<bool> {
        let collections = self.client.list_collections().await?;
        Ok(collections
            .collections
            .iter()
            .any(|c| c.name == self.collection_name))
    }

    /// Delete the collection (useful for testing)
    pub async fn delete_collection(&self) -> Result<()> {
        self.client
            .delete_collection(&self.collection_name)
            .await
            .context("Failed to delete collection")?;
        info!("Deleted collection: {}", self.collection_name);
        Ok(())
    }

    fn payload_for(chunk: &DocumentChunk) -> Result<Payload> {
        let mut payload = serde_json::Map::new();
        payload.insert(CHUNK_ID_KEY.to_string(), json!(chunk.id().to_string()));
        payload.insert(TEXT_KEY.to_string(), json!(chunk.text()));
        for (key, value) in chunk.metadata().as_map() {
            payload.insert(key.clone(), value.clone());
        }

        serde_json::Value::Object(payload)
            .try_into()
            .context("Failed to serialize payload")
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn upsert(&self, records: Vec<(DocumentChunk, EmbeddingVector)>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        debug!("Upserting {} records", records.len());

        for batch in records.chunks(self.batch_size) {
            let points: Result<Vec<PointStruct>> = batch
                .iter()
                .map(|(chunk, embedding)| {
                    Ok(PointStruct::new(
                        chunk.id().to_string(),
                        embedding.as_slice().to_vec(),
                        Self::payload_for(chunk)?,
                    ))
                })
                .collect();

            self.client
                .upsert_points(UpsertPointsBuilder::new(&self.collection_name, points?).wait(true))
                .await
                .context("Failed to upsert batch")?;
        }

        debug!("Upsert completed");
        Ok(())
    }

    async fn query(
        &self,
        embedding: &EmbeddingVector,
        ministry: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        debug!(?ministry, limit, "querying collection");

        let mut builder = SearchPointsBuilder::new(
            &self.collection_name,
            embedding.as_slice().to_vec(),
            limit as u64,
        )
        .with_payload(true);

        if let Some(ministry) = ministry {
            builder =
                builder.filter(Filter::must([Condition::matches(
                    MINISTRY_KEY,
                    ministry.to_string(),
                )]));
        }

        let response = self
            .client
            .search_points(builder)
            .await
            .context("Search failed")?;

        let results: Vec<ScoredChunk> = response
            .result
            .into_iter()
            .map(|point| {
                let mut payload = point.payload;
                let id = payload
                    .remove(CHUNK_ID_KEY)
                    .and_then(|v| v.as_str().map(|s| s.to_string()))
                    .unwrap_or_default();
                let text = payload
                    .remove(TEXT_KEY)
                    .and_then(|v| v.as_str().map(|s| s.to_string()))
                    .unwrap_or_default();

                let mut metadata = serde_json::Map::new();
                for (key, value) in payload {
                    if let Some(json_value) = payload_value_to_json(value) {
                        metadata.insert(key, json_value);
                    }
                }

                ScoredChunk {
                    id,
                    text,
                    metadata: ChunkMetadata::sanitize(metadata),
                    // Qdrant reports cosine similarity; the contract is
                    // distance.
                    distance: 1.0 - point.score,
                }
            })
            .collect();

        debug!("Found {} results", results.len());
        Ok(results)
    }

    async fn distinct_ministries(&self, scan_limit: usize) -> Result<BTreeSet<String>> {
        let limit = scan_limit.min(u32::MAX as usize) as u32;
        let response = self
            .client
            .scroll(
                ScrollPointsBuilder::new(&self.collection_name)
                    .limit(limit)
                    .with_payload(true),
            )
            .await
            .context("Failed to scan collection")?;

        let mut ministries = BTreeSet::new();
        for point in response.result {
            if let Some(ministry) = point.payload.get(MINISTRY_KEY).and_then(|v| v.as_str()) {
                ministries.insert(ministry.to_string());
            }
        }

        debug!("Found {} distinct ministries", ministries.len());
        Ok(ministries)
    }

    async fn delete_all(&self) -> Result<()> {
        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection_name)
                    .points(Filter::default())
                    .wait(true),
            )
            .await
            .context("Failed to delete records")?;

        info!("Deleted all records from '{}'", self.collection_name);
        Ok(())
    }
}

fn payload_value_to_json(value: qdrant_client::qdrant::Value) -> Option<serde_json::Value> {
    match value.kind? {
        Kind::StringValue(s) => Some(json!(s)),
        Kind::IntegerValue(i) => Some(json!(i)),
        Kind::DoubleValue(d) => Some(json!(d)),
        Kind::BoolValue(b) => Some(json!(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChunkId;
    use serde_json::Map;

    // Note: These tests require a running Qdrant instance
    // Run with: docker run -p 6333:6333 -p 6334:6334 qdrant/qdrant

    async fn create_test_index() -> Result<QdrantVectorIndex> {
        let collection_name = format!("test_collection_{}", uuid::Uuid::new_v4());
        QdrantVectorIndex::new("http://localhost:6334", collection_name, 4, 100).await
    }

    fn test_chunk(source: &str, position: usize, text: &str, ministry: &str) -> DocumentChunk {
        let mut metadata = Map::new();
        metadata.insert(MINISTRY_KEY.to_string(), json!(ministry));
        DocumentChunk::new(
            ChunkId::from_content(source, position, text),
            text,
            ChunkMetadata::sanitize(metadata),
        )
        .unwrap()
    }

    #[tokio::test]
    #[ignore] // Requires running Qdrant instance
    async fn test_upsert_and_filtered_query() {
        let index = create_test_index().await.unwrap();

        let records = vec![
            (
                test_chunk("a.pdf", 0, "Budget details", "Ministry of Finance"),
                EmbeddingVector::new(vec![1.0, 0.0, 0.0, 0.0]).unwrap(),
            ),
            (
                test_chunk("b.pdf", 0, "Crop yields", "Ministry of Agriculture"),
                EmbeddingVector::new(vec![0.0, 1.0, 0.0, 0.0]).unwrap(),
            ),
        ];
        index.upsert(records).await.unwrap();

        let query = EmbeddingVector::new(vec![1.0, 0.0, 0.0, 0.0]).unwrap();
        let hits = index
            .query(&query, Some("Ministry of Finance"), 10)
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "Budget details");
        assert_eq!(hits[0].metadata.ministry(), "Ministry of Finance");
        assert!(hits[0].distance < 0.01);

        let _ = index.delete_collection().await;
    }

    #[tokio::test]
    #[ignore] // Requires running Qdrant instance
    async fn test_upsert_same_id_overwrites() {
        let index = create_test_index().await.unwrap();

        let chunk = test_chunk("a.pdf", 0, "Budget details", "Ministry of Finance");
        let vector = EmbeddingVector::new(vec![1.0, 0.0, 0.0, 0.0]).unwrap();
        index.upsert(vec![(chunk.clone(), vector.clone())]).await.unwrap();
        index.upsert(vec![(chunk, vector.clone())]).await.unwrap();

        let hits = index.query(&vector, None, 10).await.unwrap();
        assert_eq!(hits.len(), 1);

        let _ = index.delete_collection().await;
    }

    #[tokio::test]
    #[ignore] // Requires running Qdrant instance
    async fn test_distinct_ministries_and_delete_all() {
        let index = create_test_index().await.unwrap();

        let records = vec![
            (
                test_chunk("a.pdf", 0, "Budget details", "A"),
                EmbeddingVector::new(vec![1.0, 0.0, 0.0, 0.0]).unwrap(),
            ),
            (
                test_chunk("b.pdf", 0, "Crop yields", "B"),
                EmbeddingVector::new(vec![0.0, 1.0, 0.0, 0.0]).unwrap(),
            ),
        ];
        index.upsert(records).await.unwrap();

        let ministries = index.distinct_ministries(10_000).await.unwrap();
        assert_eq!(
            ministries,
            ["A", "B"].iter().map(|s| s.to_string()).collect()
        );

        index.delete_all().await.unwrap();
        let ministries = index.distinct_ministries(10_000).await.unwrap();
        assert!(ministries.is_empty());

        let _ = index.delete_collection().await;
    }
}
