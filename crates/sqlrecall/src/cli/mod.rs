//! Command-line front end over the knowledge store

pub mod commands;
pub mod display;

use anyhow::{Context, Result};

use crate::backend;
use crate::config::{get_root, AppConfig};
use crate::embedding;
use crate::store::KnowledgeStore;

/// Open the knowledge store described by `<root>/config.yaml`
pub async fn open_store() -> Result<KnowledgeStore> {
  let root = get_root()?;
  let config = AppConfig::load(&root)?;

  let embedder = embedding::from_config(&config.embedding)?;
  let backend = backend::open(&config, &root, embedder).await?;

  KnowledgeStore::new(config.store, backend)
    .await
    .with_context(|| format!("Failed to open knowledge store at {}", root.display()))
}
