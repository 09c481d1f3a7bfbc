//! LanceDB vector backend
//!
//! One LanceDB table per collection, each holding `id`, `content`, JSON
//! `metadata` and the fixed-size `embedding` column.

pub mod records;
pub mod search;

use anyhow::{anyhow, bail, Result};
use arrow::record_batch::RecordBatchIterator;
use async_trait::async_trait;
use lancedb::{connect, Connection, Table};
use std::path::PathBuf;
use std::sync::Arc;

use super::{SearchHit, VectorBackend};
use crate::embedding::Embedder;
use crate::record::Record;
use records::{record_schema, records_to_arrow_batch};
use search::{scan_table, search_table};

pub struct LanceDbBackend {
  connection: Connection,
  embedder: Arc<dyn Embedder>,
}

impl LanceDbBackend {
  /// Connect to the LanceDB directory, creating it if needed
  pub async fn open(data_dir: PathBuf, embedder: Arc<dyn Embedder>) -> Result<Self> {
    if !data_dir.exists() {
      std::fs::create_dir_all(&data_dir)
        .map_err(|e| anyhow!("Failed to create data directory: {}", e))?;
    }

    let connection = connect(&data_dir.to_string_lossy())
      .execute()
      .await
      .map_err(|e| anyhow!("Failed to connect to LanceDB: {}", e))?;

    Ok(Self { connection, embedder })
  }

  async fn open_table(&self, name: &str) -> Result<Table> {
    self
      .connection
      .open_table(name)
      .execute()
      .await
      .map_err(|e| anyhow!("Failed to open table '{}': {}", name, e))
  }

  async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
    self
      .embedder
      .embed(&[query.to_string()])
      .await?
      .pop()
      .ok_or_else(|| anyhow!("Embedder returned no vector for query"))
  }
}

#[async_trait]
impl VectorBackend for LanceDbBackend {
  async fn has_collection(&self, name: &str) -> Result<bool> {
    let tables = self
      .connection
      .table_names()
      .execute()
      .await
      .map_err(|e| anyhow!("Failed to list tables: {}", e))?;
    Ok(tables.iter().any(|table| table == name))
  }

  async fn create_collection(&self, name: &str) -> Result<()> {
    self
      .connection
      .create_empty_table(name, record_schema(self.embedder.dimensions()))
      .execute()
      .await
      .map_err(|e| anyhow!("Failed to create table '{}': {}", name, e))?;

    tracing::info!(table = name, "created LanceDB table");
    Ok(())
  }

  async fn store(&self, collection: &str, records: Vec<Record>) -> Result<Vec<String>> {
    let texts: Vec<String> = records.iter().map(|record| record.content.clone()).collect();
    let embeddings = self.embedder.embed(&texts).await?;
    let batch = records_to_arrow_batch(&records, &embeddings, self.embedder.dimensions())?;
    let schema = batch.schema();

    let table = self.open_table(collection).await?;
    table
      .add(RecordBatchIterator::new(vec![Ok(batch)], schema))
      .execute()
      .await
      .map_err(|e| anyhow!("Failed to store records in '{}': {}", collection, e))?;

    Ok(records.into_iter().map(|record| record.id).collect())
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
      Some(self.embed_query(query).await?)
    };

    let mut hits = Vec::new();
    for name in collections {
      let table = self.open_table(name).await?;
      let table_hits = match &query_embedding {
        Some(embedding) => search_table(&table, embedding, limit).await?,
        None => scan_table(&table, limit).await?,
      };
      hits.extend(table_hits);
    }

    if query_embedding.is_some() {
      hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    }
    hits.truncate(limit);
    Ok(hits)
  }

  async fn delete(&self, collections: &[String], ids: &[String]) -> Result<()> {
    if ids.is_empty() {
      bail!("No ids given to delete");
    }
    let predicate = id_predicate(ids);

    for name in collections {
      let table = self.open_table(name).await?;
      table
        .delete(&predicate)
        .await
        .map_err(|e| anyhow!("Failed to delete from '{}': {}", name, e))?;
    }
    Ok(())
  }

  async fn close(&self) -> Result<()> {
    Ok(())
  }
}

/// SQL filter matching any of the ids, with quotes escaped
fn id_predicate(ids: &[String]) -> String {
  let quoted: Vec<String> = ids.iter().map(|id| format!("'{}'", id.replace('\'', "''"))).collect();
  format!("id IN ({})", quoted.join(", "))
}
