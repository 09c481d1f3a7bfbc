//! The knowledge store: configuration plus a vector backend
//!
//! Construction ensures the category collections exist; the writer and
//! retriever operations are implemented in `writer.rs` and `retriever.rs`.

use crate::backend::VectorBackend;
use crate::collections::ensure_collections;
use crate::config::StoreConfig;
use crate::error::StoreError;

pub struct KnowledgeStore {
  pub(crate) backend: Box<dyn VectorBackend>,
  pub(crate) config: StoreConfig,
}

impl KnowledgeStore {
  /// Build a store over `backend`, creating any missing category collections.
  ///
  /// Fails with `StoreError::Initialization` if the collections cannot be
  /// verified or created; no partially initialised store is returned.
  pub async fn new(
    config: StoreConfig,
    backend: Box<dyn VectorBackend>,
  ) -> Result<Self, StoreError> {
    let config = config.normalized();
    ensure_collections(backend.as_ref(), &config.collections)
      .await
      .map_err(StoreError::initialization)?;

    tracing::debug!(
      n_results = config.n_results,
      strategy = ?config.search_strategy,
      "knowledge store ready"
    );
    Ok(Self { backend, config })
  }

  pub fn config(&self) -> &StoreConfig {
    &self.config
  }

  /// Close the backend connection
  pub async fn close(self) -> Result<(), StoreError> {
    self.backend.close().await.map_err(|e| StoreError::backend("close", e))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::backend::{MemoryBackend, MockVectorBackend};
  use crate::embedding::HashingEmbedder;
  use anyhow::anyhow;
  use std::sync::Arc;

  #[tokio::test]
  async fn test_new_creates_collections_once() {
    let backend = Arc::new(MemoryBackend::new(Arc::new(HashingEmbedder::new(32))));

    KnowledgeStore::new(StoreConfig::default(), Box::new(backend.clone())).await.unwrap();
    // Second construction over the same backend must not try to recreate
    KnowledgeStore::new(StoreConfig::default(), Box::new(backend.clone())).await.unwrap();

    for name in ["c2sql", "c2ddl", "c2doc"] {
      assert!(backend.has_collection(name).await.unwrap());
    }
  }

  #[tokio::test]
  async fn test_new_fails_with_initialization_error() {
    let mut backend = MockVectorBackend::new();
    backend.expect_has_collection().returning(|_| Ok(false));
    backend.expect_create_collection().returning(|_| Err(anyhow!("disk full")));

    let result = KnowledgeStore::new(StoreConfig::default(), Box::new(backend)).await;
    match result {
      Err(StoreError::Initialization { source }) => {
        assert_eq!(source.operation(), Some("create_collection"));
      }
      Err(other) => panic!("expected initialization error, got {other}"),
      Ok(_) => panic!("expected initialization error"),
    }
  }

  #[tokio::test]
  async fn test_close_propagates_backend_error() {
    let mut backend = MockVectorBackend::new();
    backend.expect_has_collection().returning(|_| Ok(true));
    backend.expect_close().times(1).returning(|| Err(anyhow!("already closed")));

    let store = KnowledgeStore::new(StoreConfig::default(), Box::new(backend)).await.unwrap();
    let err = store.close().await.unwrap_err();
    assert_eq!(err.operation(), Some("close"));
  }
}
