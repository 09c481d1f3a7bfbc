//! In-process vector backend
//!
//! Keeps every collection in memory, ranks by cosine similarity, and can
//! persist itself as a JSON snapshot after each mutation so that separate CLI
//! invocations see the same data.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{SearchHit, VectorBackend};
use crate::embedding::{cosine_similarity, Embedder};
use crate::record::Record;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
  #[serde(flatten)]
  record: Record,
  embedding: Vec<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct MemoryState {
  /// Records per collection, in insertion order
  collections: BTreeMap<String, Vec<StoredRecord>>,
}

pub struct MemoryBackend {
  embedder: Arc<dyn Embedder>,
  state: RwLock<MemoryState>,
  snapshot: Option<PathBuf>,
}

impl MemoryBackend {
  /// Create an empty, non-persistent backend
  pub fn new(embedder: Arc<dyn Embedder>) -> Self {
    Self { embedder, state: RwLock::new(MemoryState::default()), snapshot: None }
  }

  /// Create a backend persisted to `snapshot`, loading it if it exists
  pub fn open(snapshot: PathBuf, embedder: Arc<dyn Embedder>) -> Result<Self> {
    let state = if snapshot.exists() {
      let raw = std::fs::read_to_string(&snapshot)
        .with_context(|| format!("Failed to read snapshot {}", snapshot.display()))?;
      serde_json::from_str(&raw)
        .with_context(|| format!("Corrupt snapshot {}", snapshot.display()))?
    } else {
      MemoryState::default()
    };

    Ok(Self { embedder, state: RwLock::new(state), snapshot: Some(snapshot) })
  }

  /// Number of records held in a collection
  pub async fn count(&self, collection: &str) -> usize {
    self.state.read().await.collections.get(collection).map_or(0, Vec::len)
  }

  async fn embed_contents(&self, records: &[Record]) -> Result<Vec<Vec<f32>>> {
    let texts: Vec<String> = records.iter().map(|record| record.content.clone()).collect();
    let embeddings = self.embedder.embed(&texts).await?;

    if embeddings.len() != records.len() {
      bail!("Embedder returned {} vectors for {} records", embeddings.len(), records.len());
    }
    Ok(embeddings)
  }

  fn persist(&self, state: &MemoryState) -> Result<()> {
    let Some(path) = &self.snapshot else {
      return Ok(());
    };

    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_vec(state)?)
      .with_context(|| format!("Failed to write snapshot {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
      .with_context(|| format!("Failed to replace snapshot {}", path.display()))?;
    Ok(())
  }

  /// Apply `change` to a copy of the state and swap it in only once the copy
  /// has been persisted, so a failed write leaves the live state untouched.
  async fn commit<T>(&self, change: impl FnOnce(&mut MemoryState) -> Result<T>) -> Result<T> {
    let mut state = self.state.write().await;
    let mut next = state.clone();
    let value = change(&mut next)?;

    self.persist(&next)?;
    *state = next;
    Ok(value)
  }
}

fn missing_collection(name: &str) -> anyhow::Error {
  anyhow!("Collection '{name}' does not exist")
}

#[async_trait]
impl VectorBackend for MemoryBackend {
  async fn has_collection(&self, name: &str) -> Result<bool> {
    Ok(self.state.read().await.collections.contains_key(name))
  }

  async fn create_collection(&self, name: &str) -> Result<()> {
    self
      .commit(|state| {
        if state.collections.contains_key(name) {
          bail!("Collection '{name}' already exists");
        }
        state.collections.insert(name.to_string(), Vec::new());
        Ok(())
      })
      .await?;
    tracing::info!(collection = name, "created collection");
    Ok(())
  }

  async fn store(&self, collection: &str, records: Vec<Record>) -> Result<Vec<String>> {
    let embeddings = self.embed_contents(&records).await?;

    let ids: Vec<String> = records.iter().map(|record| record.id.clone()).collect();
    self
      .commit(|state| {
        let stored =
          state.collections.get_mut(collection).ok_or_else(|| missing_collection(collection))?;
        stored.extend(
          records
            .into_iter()
            .zip(embeddings)
            .map(|(record, embedding)| StoredRecord { record, embedding }),
        );
        Ok(())
      })
      .await?;
    Ok(ids)
  }

  async fn search(
    &self,
    collections: &[String],
    query: &str,
    limit: usize,
  ) -> Result<Vec<SearchHit>> {
    let query_embedding = if query.trim().is_empty() {
      None
    } else {
      let mut embedded = self.embedder.embed(&[query.to_string()]).await?;
      Some(embedded.pop().ok_or_else(|| anyhow!("Embedder returned no vector for query"))?)
    };

    let state = self.state.read().await;
    let mut hits = Vec::new();
    for name in collections {
      let stored = state.collections.get(name).ok_or_else(|| missing_collection(name))?;
      hits.extend(stored.iter().map(|item| {
        let similarity =
          query_embedding.as_deref().map_or(0.0, |query| cosine_similarity(query, &item.embedding));
        SearchHit::new(item.record.clone(), similarity)
      }));
    }

    // Stable sort keeps insertion order among equal scores
    if query_embedding.is_some() {
      hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    }
    hits.truncate(limit);
    Ok(hits)
  }

  async fn delete(&self, collections: &[String], ids: &[String]) -> Result<()> {
    self
      .commit(|state| {
        for name in collections {
          let stored = state.collections.get_mut(name).ok_or_else(|| missing_collection(name))?;
          stored.retain(|item| !ids.contains(&item.record.id));
        }
        Ok(())
      })
      .await
  }

  async fn close(&self) -> Result<()> {
    let state = self.state.read().await;
    self.persist(&state)
  }
}
