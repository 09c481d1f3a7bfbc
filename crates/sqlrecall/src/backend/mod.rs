//! Vector backend abstraction
//!
//! The knowledge store talks to its index only through `VectorBackend`, so the
//! in-process index and LanceDB can be swapped without touching the writer or
//! retriever. Backends embed record content themselves via an `Embedder`.

pub mod memory;

#[cfg(feature = "lancedb")]
pub mod lancedb;

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::config::{AppConfig, BackendKind};
use crate::embedding::Embedder;
use crate::record::Record;

pub use memory::MemoryBackend;

const SNAPSHOT_FILE: &str = "store.json";

/// A record returned from a similarity query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
  pub record: Record,
  /// Higher is more similar
  pub similarity: f32,
}

impl SearchHit {
  pub fn new(record: Record, similarity: f32) -> Self {
    Self { record, similarity }
  }
}

/// Vector index interface consumed by the knowledge store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorBackend: Send + Sync {
  async fn has_collection(&self, name: &str) -> Result<bool>;

  async fn create_collection(&self, name: &str) -> Result<()>;

  /// Embed and persist records into a collection, returning their ids
  async fn store(&self, collection: &str, records: Vec<Record>) -> Result<Vec<String>>;

  /// Rank records across the given collections, most similar first.
  /// Empty query text enumerates stored records instead of ranking them.
  async fn search(&self, collections: &[String], query: &str, limit: usize)
    -> Result<Vec<SearchHit>>;

  /// Remove records by id from the given collections
  async fn delete(&self, collections: &[String], ids: &[String]) -> Result<()>;

  /// Release the connection. Called once at shutdown.
  async fn close(&self) -> Result<()>;
}

#[async_trait]
impl<T: VectorBackend + ?Sized> VectorBackend for Arc<T> {
  async fn has_collection(&self, name: &str) -> Result<bool> {
    self.as_ref().has_collection(name).await
  }

  async fn create_collection(&self, name: &str) -> Result<()> {
    self.as_ref().create_collection(name).await
  }

  async fn store(&self, collection: &str, records: Vec<Record>) -> Result<Vec<String>> {
    self.as_ref().store(collection, records).await
  }

  async fn search(
    &self,
    collections: &[String],
    query: &str,
    limit: usize,
  ) -> Result<Vec<SearchHit>> {
    self.as_ref().search(collections, query, limit).await
  }

  async fn delete(&self, collections: &[String], ids: &[String]) -> Result<()> {
    self.as_ref().delete(collections, ids).await
  }

  async fn close(&self) -> Result<()> {
    self.as_ref().close().await
  }
}

/// Open the backend selected by configuration under the root directory
pub async fn open(
  config: &AppConfig,
  root: &Path,
  embedder: Arc<dyn Embedder>,
) -> Result<Box<dyn VectorBackend>> {
  match config.backend.kind {
    BackendKind::Memory => {
      let backend = MemoryBackend::open(root.join(SNAPSHOT_FILE), embedder)?;
      Ok(Box::new(backend))
    }
    BackendKind::Lancedb => open_lancedb(root, embedder).await,
  }
}

#[cfg(feature = "lancedb")]
async fn open_lancedb(root: &Path, embedder: Arc<dyn Embedder>) -> Result<Box<dyn VectorBackend>> {
  let backend = self::lancedb::LanceDbBackend::open(root.join("lancedb"), embedder).await?;
  Ok(Box::new(backend))
}

#[cfg(not(feature = "lancedb"))]
async fn open_lancedb(
  _root: &Path,
  _embedder: Arc<dyn Embedder>,
) -> Result<Box<dyn VectorBackend>> {
  bail!("The lancedb backend requires building with the `lancedb` feature")
}
