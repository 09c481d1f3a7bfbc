use thiserror::Error;

/// Errors surfaced by the knowledge store.
///
/// Backend failures keep the underlying cause and name the stage that failed,
/// so callers can tell a failed `search` from a failed `store` without parsing
/// the message.
#[derive(Error, Debug)]
pub enum StoreError {
  #[error("Invalid input: {field} must not be empty")]
  InvalidInput { field: &'static str },

  #[error("Vector backend failed during {operation}: {source}")]
  Backend {
    operation: &'static str,
    #[source]
    source: anyhow::Error,
  },

  #[error("Knowledge store initialization failed: {source}")]
  Initialization {
    #[source]
    source: Box<StoreError>,
  },
}

impl StoreError {
  pub fn invalid_input(field: &'static str) -> Self {
    Self::InvalidInput { field }
  }

  pub fn backend(operation: &'static str, source: anyhow::Error) -> Self {
    Self::Backend { operation, source }
  }

  pub fn initialization(source: StoreError) -> Self {
    Self::Initialization { source: Box::new(source) }
  }

  /// Name of the backend operation that failed, if this is a backend error
  pub fn operation(&self) -> Option<&'static str> {
    match self {
      Self::Backend { operation, .. } => Some(*operation),
      Self::Initialization { source } => source.operation(),
      Self::InvalidInput { .. } => None,
    }
  }
}

/// Reject empty required fields before anything reaches the backend
pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), StoreError> {
  if value.is_empty() {
    return Err(StoreError::invalid_input(field));
  }
  Ok(())
}
