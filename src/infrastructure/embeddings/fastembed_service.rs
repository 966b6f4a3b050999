/// FastEmbed service for local embedding generation
use anyhow::{Context, Result};
use async_trait::async_trait;
use fastembed::{EmbeddingModel as FastEmbedModel, InitOptions, TextEmbedding};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::application::ports::Embedder;
use crate::domain::{EmbeddingModel, EmbeddingVector};

/// Generates embeddings locally with fastembed.
///
/// Deterministic for a fixed model version. Any failure is returned to the
/// caller; ranking would be corrupted by substituting a default vector.
pub struct FastEmbedService {
    model: Arc<Mutex<TextEmbedding>>,
    model_type: EmbeddingModel,
}

impl FastEmbedService {
    /// Load the model. Unavailability here is fatal for construction.
    pub async fn new(model_type: EmbeddingModel) -> Result<Self> {
        info!("Initializing FastEmbed service with model: {}", model_type);

        let fastembed_model = match model_type {
            EmbeddingModel::AllMiniLML6V2 => FastEmbedModel::AllMiniLML6V2,
        };

        let model = TextEmbedding::try_new(
            InitOptions::new(fastembed_model).with_show_download_progress(true),
        )
        .context("Failed to initialize FastEmbed model")?;

        info!("FastEmbed model initialized successfully");

        Ok(FastEmbedService {
            model: Arc::new(Mutex::new(model)),
            model_type,
        })
    }

    pub async fn new_default() -> Result<Self> {
        Self::new(EmbeddingModel::default()).await
    }

    pub fn model_type(&self) -> EmbeddingModel {
        self.model_type
    }
}

#[async_trait]
impl Embedder for FastEmbedService {
    async fn embed_text(&self, text: &str) -> Result<EmbeddingVector> {
        debug!("Generating embedding for text (length: {})", text.len());

        let mut model = self.model.lock().await;
        let embeddings = model
            .embed(vec![text], None)
            .context("Failed to generate embedding")?;

        let embedding_vec = embeddings
            .into_iter()
            .next()
            .context("No embedding returned")?;

        EmbeddingVector::new(embedding_vec)
            .map_err(|e| anyhow::anyhow!("Invalid embedding vector: {}", e))
    }

    async fn embed_batch(&self, texts: Vec<&str>) -> Result<Vec<EmbeddingVector>> {
        debug!("Generating embeddings for batch of {} texts", texts.len());

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut model = self.model.lock().await;
        let embeddings = model
            .embed(texts, None)
            .context("Failed to generate batch embeddings")?;

        let mut result = Vec::with_capacity(embeddings.len());
        for embedding_vec in embeddings {
            let embedding = EmbeddingVector::new(embedding_vec)
                .map_err(|e| anyhow::anyhow!("Invalid embedding vector: {}", e))?;
            result.push(embedding);
        }

        debug!("Generated {} embeddings successfully", result.len());
        Ok(result)
    }

    fn dimension_count(&self) -> usize {
        self.model_type.dimension_count()
    }
}
