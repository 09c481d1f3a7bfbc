//! Stored records and the typed views decoded from them
//!
//! `Record` is the flat shape the vector backend sees. `TrainingEntry` is the
//! tagged union the rest of the crate works with; conversion between the two
//! happens only here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::category::Category;
use crate::error::{require_non_empty, StoreError};

/// Metadata key holding the SQL of a question/SQL record
pub const SQL_METADATA_KEY: &str = "sql";

pub type Metadata = serde_json::Map<String, Value>;

/// Unit persisted by the vector backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
  pub id: String,
  /// Text that gets embedded and searched
  pub content: String,
  #[serde(default)]
  pub metadata: Metadata,
}

impl Record {
  pub fn category(&self) -> Option<Category> {
    Category::from_id(&self.id)
  }

  /// Decode into a typed entry. `None` for an unknown suffix, or for a
  /// question/SQL record whose `sql` metadata is missing or not a string.
  pub fn decode(&self) -> Option<TrainingEntry> {
    match self.category()? {
      Category::QuestionSql => Some(TrainingEntry::QuestionSql {
        question: self.content.clone(),
        sql: self.sql()?.to_string(),
      }),
      Category::Ddl => Some(TrainingEntry::Ddl { ddl: self.content.clone() }),
      Category::Documentation => {
        Some(TrainingEntry::Documentation { text: self.content.clone() })
      }
    }
  }

  fn sql(&self) -> Option<&str> {
    self.metadata.get(SQL_METADATA_KEY).and_then(Value::as_str)
  }
}

/// A training artifact as callers hand it to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrainingEntry {
  QuestionSql { question: String, sql: String },
  Ddl { ddl: String },
  Documentation { text: String },
}

impl TrainingEntry {
  pub fn question_sql(question: impl Into<String>, sql: impl Into<String>) -> Self {
    Self::QuestionSql { question: question.into(), sql: sql.into() }
  }

  pub fn ddl(ddl: impl Into<String>) -> Self {
    Self::Ddl { ddl: ddl.into() }
  }

  pub fn documentation(text: impl Into<String>) -> Self {
    Self::Documentation { text: text.into() }
  }

  pub fn category(&self) -> Category {
    match self {
      Self::QuestionSql { .. } => Category::QuestionSql,
      Self::Ddl { .. } => Category::Ddl,
      Self::Documentation { .. } => Category::Documentation,
    }
  }

  /// Check the category's required fields
  pub fn validate(&self) -> Result<(), StoreError> {
    match self {
      Self::QuestionSql { question, sql } => {
        require_non_empty("question", question)?;
        require_non_empty("sql", sql)
      }
      Self::Ddl { ddl } => require_non_empty("ddl", ddl),
      Self::Documentation { text } => require_non_empty("documentation", text),
    }
  }

  /// Flatten into the backend representation under the given id
  pub fn into_record(self, id: String) -> Record {
    let mut metadata = Metadata::new();
    let content = match self {
      Self::QuestionSql { question, sql } => {
        metadata.insert(SQL_METADATA_KEY.to_string(), Value::String(sql));
        question
      }
      Self::Ddl { ddl } => ddl,
      Self::Documentation { text } => text,
    };
    Record { id, content, metadata }
  }
}

/// A stored question together with the SQL that answers it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSql {
  pub question: String,
  pub sql: String,
}

/// Category-erased listing entry used for review and removal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingItem {
  pub id: String,
  pub category: Category,
  /// Empty unless the item is a question/SQL pair
  pub question: String,
  /// SQL for question/SQL pairs, the stored text otherwise
  pub content: String,
}

impl TrainingItem {
  /// Classify a record by its id suffix. Unlike `Record::decode`, an
  /// inconsistent question/SQL record is still listed (with empty content) so
  /// that it can be found and removed.
  pub fn from_record(record: Record) -> Option<Self> {
    let category = record.category()?;
    let item = match category {
      Category::QuestionSql => TrainingItem {
        question: record.content.clone(),
        content: record.sql().unwrap_or_default().to_string(),
        id: record.id,
        category,
      },
      Category::Ddl | Category::Documentation => {
        TrainingItem { id: record.id, category, question: String::new(), content: record.content }
      }
    };
    Some(item)
  }
}
