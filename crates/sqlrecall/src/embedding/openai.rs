//! OpenAI-compatible embeddings over HTTP

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Embedder;
use crate::config::EmbeddingConfig;

const BATCH_SIZE: usize = 100;

pub struct OpenAiEmbedder {
  model: String,
  api_key: String,
  endpoint: String,
  dimensions: usize,
  http_client: reqwest::Client,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
  model: &'a str,
  input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
  data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
  embedding: Vec<f32>,
}

impl OpenAiEmbedder {
  pub fn new(api_base: &str, model: &str, api_key: &str, dimensions: usize) -> Self {
    Self {
      model: model.to_string(),
      api_key: api_key.to_string(),
      endpoint: format!("{}/embeddings", api_base.trim_end_matches('/')),
      dimensions,
      http_client: reqwest::Client::new(),
    }
  }

  pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
    let api_key = std::env::var(&config.api_key_env)
      .with_context(|| format!("{} is not set", config.api_key_env))?;
    Ok(Self::new(&config.api_base, &config.model, &api_key, config.dimensions))
  }

  async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let request = EmbeddingRequest { model: &self.model, input: texts };

    let response = self
      .http_client
      .post(&self.endpoint)
      .bearer_auth(&self.api_key)
      .json(&request)
      .send()
      .await
      .map_err(|e| anyhow!("Embedding request failed: {}", e))?;

    if !response.status().is_success() {
      let status = response.status();
      let body = response.text().await.unwrap_or_default();
      bail!("Embedding API error ({status}): {body}");
    }

    let parsed: EmbeddingResponse = response.json().await?;
    parse_embeddings(parsed, texts.len(), self.dimensions)
  }
}

/// Check count and dimension of a response batch
fn parse_embeddings(
  response: EmbeddingResponse,
  expected: usize,
  dimensions: usize,
) -> Result<Vec<Vec<f32>>> {
  if response.data.len() != expected {
    bail!("Embedding API returned {} vectors for {} inputs", response.data.len(), expected);
  }

  response
    .data
    .into_iter()
    .map(|item| {
      if item.embedding.len() != dimensions {
        bail!(
          "Embedding dimension mismatch: expected {}, got {}",
          dimensions,
          item.embedding.len()
        );
      }
      Ok(item.embedding)
    })
    .collect()
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
  async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let mut embeddings = Vec::with_capacity(texts.len());
    for batch in texts.chunks(BATCH_SIZE) {
      embeddings.extend(self.embed_batch(batch).await?);
    }
    Ok(embeddings)
  }

  fn dimensions(&self) -> usize {
    self.dimensions
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_request_serialization() {
    let input = vec!["hello world".to_string()];
    let request = EmbeddingRequest { model: "text-embedding-3-small", input: &input };
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["model"], "text-embedding-3-small");
    assert_eq!(json["input"][0], "hello world");
  }

  #[test]
  fn test_parse_embeddings_validates_dimension() {
    let json = r#"{
      "data": [{"embedding": [0.1, 0.2, 0.3], "index": 0, "object": "embedding"}],
      "model": "text-embedding-3-small",
      "object": "list"
    }"#;

    let response: EmbeddingResponse = serde_json::from_str(json).unwrap();
    assert_eq!(parse_embeddings(response, 1, 3).unwrap(), vec![vec![0.1, 0.2, 0.3]]);

    let response: EmbeddingResponse = serde_json::from_str(json).unwrap();
    let err = parse_embeddings(response, 1, 4).unwrap_err();
    assert!(err.to_string().contains("dimension mismatch"));
  }

  #[test]
  fn test_parse_embeddings_rejects_short_batch() {
    let response: EmbeddingResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
    assert!(parse_embeddings(response, 2, 3).is_err());
  }

  #[test]
  fn test_endpoint_joins_api_base() {
    let embedder = OpenAiEmbedder::new("http://localhost:8080/v1/", "m", "k", 8);
    assert_eq!(embedder.endpoint, "http://localhost:8080/v1/embeddings");
  }
}
