//! Deterministic bag-of-words embedder
//!
//! Hashes lower-cased word tokens into a fixed number of buckets and
//! L2-normalises the result. Needs no model download, gives identical vectors
//! across processes, and scores texts that share words as similar, which is
//! enough for local use and tests.

use anyhow::Result;
use async_trait::async_trait;

use super::Embedder;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub struct HashingEmbedder {
  dimensions: usize,
}

impl HashingEmbedder {
  pub fn new(dimensions: usize) -> Self {
    Self { dimensions: dimensions.max(1) }
  }

  pub fn embed_text(&self, text: &str) -> Vec<f32> {
    let mut vector = vec![0.0_f32; self.dimensions];

    for token in tokenize(text) {
      let hash = fnv1a(token.as_bytes());
      let bucket = (hash % self.dimensions as u64) as usize;
      let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
      vector[bucket] += sign;
    }

    normalize(&mut vector);
    vector
  }
}

#[async_trait]
impl Embedder for HashingEmbedder {
  async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    Ok(texts.iter().map(|text| self.embed_text(text)).collect())
  }

  fn dimensions(&self) -> usize {
    self.dimensions
  }
}

/// Lower-cased alphanumeric words with a trailing plural `s` dropped
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
  text.split(|c: char| !c.is_alphanumeric()).filter(|word| !word.is_empty()).map(|word| {
    let word = word.to_lowercase();
    match word.strip_suffix('s') {
      Some(stem) if stem.len() >= 3 && !stem.ends_with('s') => stem.to_string(),
      _ => word,
    }
  })
}

fn fnv1a(bytes: &[u8]) -> u64 {
  bytes.iter().fold(FNV_OFFSET, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME))
}

fn normalize(vector: &mut [f32]) {
  let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
  if norm > 0.0 {
    vector.iter_mut().for_each(|x| *x /= norm);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::embedding::cosine_similarity;

  #[test]
  fn test_embedding_has_configured_dimension_and_unit_norm() {
    let embedder = HashingEmbedder::new(64);
    let vector = embedder.embed_text("How many users exist?");
    assert_eq!(vector.len(), 64);

    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-5);
  }

  #[test]
  fn test_embedding_is_deterministic() {
    let embedder = HashingEmbedder::new(128);
    assert_eq!(embedder.embed_text("users schema"), embedder.embed_text("users schema"));
  }

  #[test]
  fn test_shared_words_score_higher() {
    let embedder = HashingEmbedder::new(256);
    let query = embedder.embed_text("user count");
    let related = embedder.embed_text("How many users exist?");
    let unrelated = embedder.embed_text("Orders are shipped weekly");

    assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
  }

  #[test]
  fn test_empty_text_embeds_to_zero_vector() {
    let embedder = HashingEmbedder::new(16);
    assert!(embedder.embed_text("").iter().all(|x| *x == 0.0));
  }

  #[test]
  fn test_tokenize_strips_plurals() {
    let tokens: Vec<String> = tokenize("Users, address; IS").collect();
    assert_eq!(tokens, vec!["user", "address", "is"]);
  }

  #[tokio::test]
  async fn test_embed_batch_preserves_order() {
    let embedder = HashingEmbedder::new(32);
    let texts = vec!["alpha".to_string(), "beta".to_string()];
    let vectors = embedder.embed(&texts).await.unwrap();
    assert_eq!(vectors, vec![embedder.embed_text("alpha"), embedder.embed_text("beta")]);
  }
}
