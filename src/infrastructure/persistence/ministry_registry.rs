/// Durable registry of indexed ministries
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::application::ports::VectorIndex;

/// On-disk layout of the registry file
#[derive(Debug, Serialize, Deserialize)]
struct RegistryFile {
    ministries: Vec<String>,
    updated_at: DateTime<Utc>,
    updated_by: String,
}

/// The set of ministries with at least one indexed chunk.
///
/// Persisted separately from the vector index so the UI can list ministries
/// without querying it. The file is a reconcilable cache: it can always be
/// rebuilt by scanning stored metadata for distinct ministry values.
/// Single-writer model; cross-process mutation needs external coordination.
pub struct MinistryRegistry {
    path: PathBuf,
    actor: String,
    ministries: BTreeSet<String>,
}

impl MinistryRegistry {
    pub fn new(path: PathBuf, actor: impl Into<String>) -> Self {
        MinistryRegistry {
            path,
            actor: actor.into(),
            ministries: BTreeSet::new(),
        }
    }

    /// Load the registry from disk. A missing file triggers a rebuild by
    /// scanning the index (bounded by `scan_limit`) followed by a persist;
    /// a read error leaves the registry empty and logs. Never raises.
    pub async fn load<V: VectorIndex + ?Sized>(&mut self, index: &V, scan_limit: usize) {
        if self.path.exists() {
            match fs::read_to_string(&self.path)
                .map_err(anyhow::Error::from)
                .and_then(|contents| Ok(serde_json::from_str::<RegistryFile>(&contents)?))
            {
                Ok(file) => {
                    self.ministries = file.ministries.into_iter().collect();
                    info!(
                        count = self.ministries.len(),
                        "Loaded indexed ministries from registry file"
                    );
                }
                Err(error) => {
                    warn!(%error, "Error loading indexed ministries");
                }
            }
            return;
        }

        // No file yet; reconstruct from the index's stored metadata.
        match index.distinct_ministries(scan_limit).await {
            Ok(ministries) => {
                if ministries.is_empty() {
                    info!("No documents found in vector store");
                    return;
                }
                info!(
                    count = ministries.len(),
                    "Rebuilt indexed ministries from collection"
                );
                self.ministries = ministries;
                self.save();
            }
            Err(error) => {
                warn!(%error, "Error checking collection for ministries");
            }
        }
    }

    pub fn is_indexed(&self, ministry: &str) -> bool {
        self.ministries.contains(ministry)
    }

    /// Record a ministry as indexed (idempotent union insert) and persist.
    pub fn mark_indexed(&mut self, ministry: &str) {
        self.ministries.insert(ministry.to_string());
        self.save();
    }

    pub fn ministries(&self) -> &BTreeSet<String> {
        &self.ministries
    }

    /// Empty the registry and persist.
    pub fn clear(&mut self) {
        self.ministries.clear();
        self.save();
    }

    /// Atomically overwrite the registry file. Failure is logged, not
    /// raised; the in-memory set stays authoritative for the process.
    fn save(&self) {
        let file = RegistryFile {
            ministries: self.ministries.iter().cloned().collect(),
            updated_at: Utc::now(),
            updated_by: self.actor.clone(),
        };

        if let Err(error) = self.write_atomically(&file) {
            warn!(%error, path = %self.path.display(), "Error saving ministry registry");
        }
    }

    fn write_atomically(&self, file: &RegistryFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(file)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::domain::{DocumentChunk, EmbeddingVector, ScoredChunk};

    /// Index stub that only answers metadata scans
    struct StaticIndex(BTreeSet<String>);

    #[async_trait]
    impl VectorIndex for StaticIndex {
        async fn upsert(&self, _records: Vec<(DocumentChunk, EmbeddingVector)>) -> Result<()> {
            Ok(())
        }

        async fn query(
            &self,
            _embedding: &EmbeddingVector,
            _ministry: Option<&str>,
            _limit: usize,
        ) -> Result<Vec<ScoredChunk>> {
            Ok(Vec::new())
        }

        async fn distinct_ministries(&self, _scan_limit: usize) -> Result<BTreeSet<String>> {
            Ok(self.0.clone())
        }

        async fn delete_all(&self) -> Result<()> {
            Ok(())
        }
    }

    fn ministries(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_mark_indexed_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("indexed_ministries.json");

        let mut registry = MinistryRegistry::new(path.clone(), "test");
        registry.mark_indexed("Ministry of Coal");
        registry.mark_indexed("Ministry of Coal");
        assert!(registry.is_indexed("Ministry of Coal"));

        let mut reloaded = MinistryRegistry::new(path, "test");
        reloaded.load(&StaticIndex(BTreeSet::new()), 1000).await;
        assert_eq!(reloaded.ministries(), &ministries(&["Ministry of Coal"]));
    }

    #[tokio::test]
    async fn test_file_format_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("indexed_ministries.json");

        let mut registry = MinistryRegistry::new(path.clone(), "indexer");
        registry.mark_indexed("Ministry of Finance");

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["ministries"], serde_json::json!(["Ministry of Finance"]));
        assert_eq!(raw["updated_by"], serde_json::json!("indexer"));
        assert!(raw["updated_at"].is_string());
    }

    #[tokio::test]
    async fn test_missing_file_rebuilds_from_index_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("indexed_ministries.json");

        let mut registry = MinistryRegistry::new(path.clone(), "test");
        registry.load(&StaticIndex(ministries(&["A", "B"])), 1000).await;

        assert_eq!(registry.ministries(), &ministries(&["A", "B"]));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_unreadable_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("indexed_ministries.json");
        fs::write(&path, "not json at all").unwrap();

        let mut registry = MinistryRegistry::new(path, "test");
        registry.load(&StaticIndex(ministries(&["A"])), 1000).await;
        assert!(registry.ministries().is_empty());
    }

    #[tokio::test]
    async fn test_clear_persists_empty_registry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("indexed_ministries.json");

        let mut registry = MinistryRegistry::new(path.clone(), "test");
        registry.mark_indexed("Ministry of Coal");
        registry.clear();
        assert!(registry.ministries().is_empty());

        let mut reloaded = MinistryRegistry::new(path, "test");
        reloaded.load(&StaticIndex(BTreeSet::new()), 1000).await;
        assert!(reloaded.ministries().is_empty());
    }
}
