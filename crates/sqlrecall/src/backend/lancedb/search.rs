//! Vector search and enumeration over LanceDB tables

use anyhow::{anyhow, Result};
use arrow::array::{Array, Float32Array};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::Table;

use super::records::records_from_batch;
use crate::backend::SearchHit;

/// Nearest neighbours of `query_embedding` in one table
pub async fn search_table(
  table: &Table,
  query_embedding: &[f32],
  limit: usize,
) -> Result<Vec<SearchHit>> {
  let batches: Vec<RecordBatch> = table
    .vector_search(query_embedding)?
    .column("embedding")
    .limit(limit)
    .execute()
    .await
    .map_err(|e| anyhow!("Vector search failed: {}", e))?
    .try_collect()
    .await
    .map_err(|e| anyhow!("Error reading search results: {}", e))?;

  hits_from_batches(&batches)
}

/// Up to `limit` rows of one table, unranked
pub async fn scan_table(table: &Table, limit: usize) -> Result<Vec<SearchHit>> {
  let batches: Vec<RecordBatch> = table
    .query()
    .limit(limit)
    .execute()
    .await
    .map_err(|e| anyhow!("Table scan failed: {}", e))?
    .try_collect()
    .await
    .map_err(|e| anyhow!("Error reading scan results: {}", e))?;

  hits_from_batches(&batches)
}

fn hits_from_batches(batches: &[RecordBatch]) -> Result<Vec<SearchHit>> {
  let mut hits = Vec::new();
  for batch in batches {
    let distances = batch
      .column_by_name("_distance")
      .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

    for (row, record) in records_from_batch(batch)?.into_iter().enumerate() {
      let similarity = distances
        .filter(|d| row < d.len() && !d.is_null(row))
        .map_or(0.0, |d| distance_to_similarity(d.value(row)));
      hits.push(SearchHit::new(record, similarity));
    }
  }
  Ok(hits)
}

/// Map LanceDB's squared L2 `_distance` onto [0, 1], higher is closer.
///
/// Unit vectors sit at squared distance `2 - 2 * cosine`, so the full range is
/// [0, 4] and the mapping stays monotonic for opposed vectors too.
fn distance_to_similarity(distance: f32) -> f32 {
  (4.0 - distance.clamp(0.0, 4.0)) / 4.0
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_distance_to_similarity_covers_opposed_vectors() {
    assert_eq!(distance_to_similarity(0.0), 1.0);
    assert_eq!(distance_to_similarity(2.0), 0.5);
    assert_eq!(distance_to_similarity(4.0), 0.0);
    assert_eq!(distance_to_similarity(5.0), 0.0);
    // Negative cosine hits stay ordered instead of collapsing to zero
    assert!(distance_to_similarity(2.5) > distance_to_similarity(3.5));
  }
}
