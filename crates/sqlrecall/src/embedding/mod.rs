//! Embedding providers
//!
//! Backends call an `Embedder` to turn record content and query text into
//! vectors. The dimension must stay fixed for the lifetime of a deployment.

pub mod hashing;
pub mod openai;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{EmbeddingConfig, EmbeddingProvider};

pub use hashing::HashingEmbedder;
pub use openai::OpenAiEmbedder;

#[async_trait]
pub trait Embedder: Send + Sync {
  /// Embed a batch of texts, one vector per input in the same order
  async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

  fn dimensions(&self) -> usize;
}

/// Build the embedder selected by configuration
pub fn from_config(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
  match config.provider {
    EmbeddingProvider::Hashing => Ok(Arc::new(HashingEmbedder::new(config.dimensions))),
    EmbeddingProvider::Openai => Ok(Arc::new(OpenAiEmbedder::from_config(config)?)),
  }
}

/// Cosine similarity of two vectors; zero when either has no magnitude
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
  let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
  let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
  let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

  if norm_a == 0.0 || norm_b == 0.0 {
    return 0.0;
  }
  dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_cosine_similarity_bounds() {
    assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
  }

  #[test]
  fn test_cosine_similarity_zero_vector() {
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
  }

  #[test]
  fn test_from_config_defaults_to_hashing() {
    let embedder = from_config(&EmbeddingConfig::default()).unwrap();
    assert_eq!(embedder.dimensions(), 384);
  }
}
