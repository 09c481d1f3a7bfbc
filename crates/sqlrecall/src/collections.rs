//! Ensures the category collections exist before the store is used

use crate::backend::VectorBackend;
use crate::category::Category;
use crate::config::CollectionNames;
use crate::error::StoreError;

/// Create any of the three category collections that are missing.
///
/// Safe to run repeatedly. The first failing check or create aborts the run;
/// nothing is retried.
pub async fn ensure_collections(
  backend: &dyn VectorBackend,
  names: &CollectionNames,
) -> Result<(), StoreError> {
  for category in Category::ALL {
    let name = names.for_category(category);

    let exists = backend
      .has_collection(name)
      .await
      .map_err(|e| StoreError::backend("has_collection", e))?;
    if exists {
      tracing::debug!(collection = name, %category, "collection already present");
      continue;
    }

    backend.create_collection(name).await.map_err(|e| StoreError::backend("create_collection", e))?;
    tracing::info!(collection = name, %category, "created collection");
  }

  Ok(())
}
