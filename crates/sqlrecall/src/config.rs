//! Store and application configuration
//!
//! `StoreConfig` is the immutable value handed to `KnowledgeStore::new`.
//! `AppConfig` wraps it with the backend and embedding choices used by the
//! command-line binary, loaded from `<root>/config.yaml`.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::category::Category;

pub const DEFAULT_N_RESULTS: usize = 10;
pub const DEFAULT_MAX_LIMIT: usize = 10_000;

const ROOT_ENV_VAR: &str = "SQLRECALL_ROOT";
const CONFIG_FILE: &str = "config.yaml";

/// Names of the three category collections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionNames {
  pub sql: String,
  pub ddl: String,
  pub doc: String,
}

impl Default for CollectionNames {
  fn default() -> Self {
    Self { sql: "c2sql".to_string(), ddl: "c2ddl".to_string(), doc: "c2doc".to_string() }
  }
}

impl CollectionNames {
  pub fn for_category(&self, category: Category) -> &str {
    match category {
      Category::QuestionSql => &self.sql,
      Category::Ddl => &self.ddl,
      Category::Documentation => &self.doc,
    }
  }

  /// Distinct collection names in category order. Categories may share one
  /// collection, which is then listed once.
  pub fn all(&self) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
      let name = self.for_category(category);
      if !names.iter().any(|seen| seen == name) {
        names.push(name.to_string());
      }
    }
    names
  }
}

/// How the category retrievers query the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
  /// One query spanning every category collection, filtered by id suffix.
  /// A category can be crowded out of the top results by the others.
  #[default]
  Shared,
  /// Query only the requested category's collection.
  PerCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
  pub collections: CollectionNames,
  /// Result-count limit for the category retrievers
  pub n_results: usize,
  /// Result-count ceiling for listing all training data
  pub max_limit: usize,
  pub search_strategy: SearchStrategy,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      collections: CollectionNames::default(),
      n_results: DEFAULT_N_RESULTS,
      max_limit: DEFAULT_MAX_LIMIT,
      search_strategy: SearchStrategy::default(),
    }
  }
}

impl StoreConfig {
  pub fn with_n_results(mut self, n_results: usize) -> Self {
    self.n_results = n_results;
    self.normalized()
  }

  pub fn with_search_strategy(mut self, strategy: SearchStrategy) -> Self {
    self.search_strategy = strategy;
    self
  }

  /// Replace zero limits with their defaults
  pub fn normalized(mut self) -> Self {
    if self.n_results == 0 {
      self.n_results = DEFAULT_N_RESULTS;
    }
    if self.max_limit == 0 {
      self.max_limit = DEFAULT_MAX_LIMIT;
    }
    self
  }

  /// Collections a retriever for `category` should search
  pub fn search_collections(&self, category: Category) -> Vec<String> {
    match self.search_strategy {
      SearchStrategy::Shared => self.collections.all(),
      SearchStrategy::PerCategory => vec![self.collections.for_category(category).to_string()],
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProvider {
  #[default]
  Hashing,
  #[serde(alias = "openai_compatible")]
  Openai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
  pub provider: EmbeddingProvider,
  pub model: String,
  pub dimensions: usize,
  pub api_base: String,
  /// Environment variable holding the API key
  pub api_key_env: String,
}

impl Default for EmbeddingConfig {
  fn default() -> Self {
    Self {
      provider: EmbeddingProvider::default(),
      model: "text-embedding-3-small".to_string(),
      dimensions: 384,
      api_base: "https://api.openai.com/v1".to_string(),
      api_key_env: "OPENAI_API_KEY".to_string(),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
  /// In-process index persisted as a JSON snapshot under the root directory
  #[default]
  Memory,
  /// LanceDB tables under the root directory (requires the `lancedb` feature)
  Lancedb,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
  pub kind: BackendKind,
}

/// Configuration for the command-line binary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub store: StoreConfig,
  pub embedding: EmbeddingConfig,
  pub backend: BackendConfig,
}

impl AppConfig {
  /// Load `config.yaml` from the root directory, falling back to defaults
  pub fn load(root: &Path) -> Result<Self> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
      return Ok(Self::default());
    }

    let raw = std::fs::read_to_string(&path)
      .with_context(|| format!("Failed to read config file {}", path.display()))?;
    Self::from_yaml(&raw).with_context(|| format!("Invalid config file {}", path.display()))
  }

  pub fn from_yaml(raw: &str) -> Result<Self> {
    let mut config: AppConfig = serde_yaml::from_str(raw)?;
    config.store = config.store.normalized();
    Ok(config)
  }
}

/// Root directory for configuration and persisted data
pub fn get_root() -> Result<PathBuf> {
  if let Ok(root) = env::var(ROOT_ENV_VAR) {
    return Ok(PathBuf::from(root));
  }

  dirs::data_dir()
    .map(|dir| dir.join("sqlrecall"))
    .ok_or_else(|| anyhow!("Could not determine data directory; set {ROOT_ENV_VAR}"))
}
