//! Validated writes of tagged training records

use crate::category::tag_new;
use crate::error::StoreError;
use crate::record::TrainingEntry;
use crate::store::KnowledgeStore;

impl KnowledgeStore {
  /// Store a question together with the SQL that answers it
  pub async fn add_question_sql(&self, question: &str, sql: &str) -> Result<String, StoreError> {
    self.train(TrainingEntry::question_sql(question, sql)).await
  }

  /// Store a schema definition statement
  pub async fn add_ddl(&self, ddl: &str) -> Result<String, StoreError> {
    self.train(TrainingEntry::ddl(ddl)).await
  }

  /// Store a piece of free-text documentation
  pub async fn add_documentation(&self, documentation: &str) -> Result<String, StoreError> {
    self.train(TrainingEntry::documentation(documentation)).await
  }

  /// Validate, tag and persist one training entry, returning its new id.
  ///
  /// Nothing reaches the backend if validation fails, and the id is only
  /// returned once the backend has accepted the record.
  pub async fn train(&self, entry: TrainingEntry) -> Result<String, StoreError> {
    entry.validate()?;

    let category = entry.category();
    let id = tag_new(category);
    let collection = self.config.collections.for_category(category);
    let record = entry.into_record(id.clone());

    self
      .backend
      .store(collection, vec![record])
      .await
      .map_err(|e| StoreError::backend("store", e))?;

    tracing::info!(%id, %category, collection, "stored training record");
    Ok(id)
  }
}

#[cfg(test)]
mod tests {
  use crate::backend::MockVectorBackend;
  use crate::category::Category;
  use crate::config::StoreConfig;
  use crate::error::StoreError;
  use crate::store::KnowledgeStore;
  use anyhow::anyhow;

  fn mock_with_collections() -> MockVectorBackend {
    let mut backend = MockVectorBackend::new();
    backend.expect_has_collection().returning(|_| Ok(true));
    backend
  }

  async fn store_over(backend: MockVectorBackend) -> KnowledgeStore {
    KnowledgeStore::new(StoreConfig::default(), Box::new(backend)).await.unwrap()
  }

  #[tokio::test]
  async fn test_empty_inputs_never_reach_backend() {
    let mut backend = mock_with_collections();
    backend.expect_store().never();
    let store = store_over(backend).await;

    for result in [
      store.add_question_sql("", "SELECT 1").await,
      store.add_question_sql("How many users?", "").await,
      store.add_ddl("").await,
      store.add_documentation("").await,
    ] {
      assert!(matches!(result, Err(StoreError::InvalidInput { .. })));
    }
  }

  #[tokio::test]
  async fn test_question_sql_record_shape() {
    let mut backend = mock_with_collections();
    backend
      .expect_store()
      .withf(|collection, records| {
        let record = &records[0];
        collection == "c2sql"
          && records.len() == 1
          && record.content == "How many users exist?"
          && record.metadata.get("sql").and_then(|v| v.as_str())
            == Some("SELECT COUNT(*) FROM users")
          && record.id.ends_with("-sql")
      })
      .times(1)
      .returning(|_, records| Ok(records.into_iter().map(|r| r.id).collect()));
    let store = store_over(backend).await;

    let id =
      store.add_question_sql("How many users exist?", "SELECT COUNT(*) FROM users").await.unwrap();
    assert_eq!(Category::from_id(&id), Some(Category::QuestionSql));
  }

  #[tokio::test]
  async fn test_ddl_and_documentation_go_to_their_collections() {
    let mut backend = mock_with_collections();
    backend
      .expect_store()
      .withf(|collection, records| {
        collection == "c2ddl" && records[0].metadata.is_empty() && records[0].id.ends_with("-ddl")
      })
      .times(1)
      .returning(|_, records| Ok(records.into_iter().map(|r| r.id).collect()));
    backend
      .expect_store()
      .withf(|collection, records| {
        collection == "c2doc" && records[0].metadata.is_empty() && records[0].id.ends_with("-doc")
      })
      .times(1)
      .returning(|_, records| Ok(records.into_iter().map(|r| r.id).collect()));
    let store = store_over(backend).await;

    assert!(store.add_ddl("CREATE TABLE users(id INT)").await.unwrap().ends_with("-ddl"));
    let doc_id = store.add_documentation("Users table stores accounts").await.unwrap();
    assert!(doc_id.ends_with("-doc"));
  }

  #[tokio::test]
  async fn test_store_failure_returns_no_id() {
    let mut backend = mock_with_collections();
    backend.expect_store().times(1).returning(|_, _| Err(anyhow!("write timeout")));
    let store = store_over(backend).await;

    let err = store.add_ddl("CREATE TABLE t(id INT)").await.unwrap_err();
    assert_eq!(err.operation(), Some("store"));
  }
}
