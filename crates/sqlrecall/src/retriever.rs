//! Similarity retrieval and training-data listing
//!
//! Every category retriever issues a single backend query and then keeps, in
//! ranking order, only the hits whose id suffix names the requested category.
//! Under `SearchStrategy::Shared` that query spans all three collections, so
//! a category can receive fewer than `n_results` hits (or none) when the
//! others dominate the ranking.

use crate::backend::SearchHit;
use crate::category::Category;
use crate::error::{require_non_empty, StoreError};
use crate::record::{QuestionSql, Record, TrainingEntry, TrainingItem};
use crate::store::KnowledgeStore;

impl KnowledgeStore {
  /// Question/SQL pairs most similar to `question`
  pub async fn get_similar_question_sql(
    &self,
    question: &str,
  ) -> Result<Vec<QuestionSql>, StoreError> {
    let hits = self.search_category(Category::QuestionSql, question).await?;
    Ok(
      decode_category(hits, Category::QuestionSql)
        .filter_map(|entry| match entry {
          TrainingEntry::QuestionSql { question, sql } => Some(QuestionSql { question, sql }),
          _ => None,
        })
        .collect(),
    )
  }

  /// DDL statements related to `question`
  pub async fn get_related_ddl(&self, question: &str) -> Result<Vec<String>, StoreError> {
    let hits = self.search_category(Category::Ddl, question).await?;
    Ok(
      decode_category(hits, Category::Ddl)
        .filter_map(|entry| match entry {
          TrainingEntry::Ddl { ddl } => Some(ddl),
          _ => None,
        })
        .collect(),
    )
  }

  /// Documentation related to `question`
  pub async fn get_related_documentation(&self, question: &str) -> Result<Vec<String>, StoreError> {
    let hits = self.search_category(Category::Documentation, question).await?;
    Ok(
      decode_category(hits, Category::Documentation)
        .filter_map(|entry| match entry {
          TrainingEntry::Documentation { text } => Some(text),
          _ => None,
        })
        .collect(),
    )
  }

  /// Everything the backend returns for an unranked query of `max_limit`.
  ///
  /// This enumerates by search, so stores holding more than `max_limit`
  /// records are listed incompletely.
  pub async fn get_training_data(&self) -> Result<Vec<TrainingItem>, StoreError> {
    let limit = self.config.max_limit;
    let hits = self
      .backend
      .search(&self.config.collections.all(), "", limit)
      .await
      .map_err(|e| StoreError::backend("search", e))?;

    if hits.len() >= limit {
      tracing::warn!(limit, "training data listing reached the result ceiling");
    }

    Ok(classify_training_items(hits))
  }

  /// Delete one training record by id. Returns `true` once the backend has
  /// accepted the delete.
  pub async fn remove_training_data(&self, id: &str) -> Result<bool, StoreError> {
    require_non_empty("id", id)?;

    let collections = match Category::from_id(id) {
      Some(category) => vec![self.config.collections.for_category(category).to_string()],
      None => self.config.collections.all(),
    };

    self
      .backend
      .delete(&collections, &[id.to_string()])
      .await
      .map_err(|e| StoreError::backend("delete", e))?;

    tracing::info!(id, "removed training record");
    Ok(true)
  }

  async fn search_category(
    &self,
    category: Category,
    query: &str,
  ) -> Result<Vec<SearchHit>, StoreError> {
    let collections = self.config.search_collections(category);
    let hits = self
      .backend
      .search(&collections, query, self.config.n_results)
      .await
      .map_err(|e| StoreError::backend("search", e))?;

    tracing::debug!(%category, hits = hits.len(), "similarity search");
    Ok(hits)
  }
}

/// Keep hits of `category` in ranking order and decode them.
///
/// A suffix match whose record cannot be decoded (a question/SQL record
/// without usable `sql` metadata) is skipped.
fn decode_category(
  hits: Vec<SearchHit>,
  category: Category,
) -> impl Iterator<Item = TrainingEntry> {
  hits
    .into_iter()
    .map(|hit| hit.record)
    .filter(move |record| record.category() == Some(category))
    .filter_map(|record: Record| {
      let entry = record.decode();
      if entry.is_none() {
        tracing::debug!(id = %record.id, "skipping record with inconsistent metadata");
      }
      entry
    })
}

/// Classify every hit into a listing item, dropping unrecognised ids
fn classify_training_items(hits: Vec<SearchHit>) -> Vec<TrainingItem> {
  hits
    .into_iter()
    .filter_map(|hit| {
      let id = hit.record.id.clone();
      let item = TrainingItem::from_record(hit.record);
      if item.is_none() {
        tracing::warn!(%id, "record id carries no known category suffix");
      }
      item
    })
    .collect()
}
