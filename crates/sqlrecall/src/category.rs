//! Training-data categories and the id tagging convention
//!
//! The category of a stored record is encoded only as a suffix of its id.
//! `tag_new` and `Category::from_id` are the two ends of that convention; no
//! other code should look at the suffix strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of training artifact held by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  /// Natural-language question paired with the SQL that answers it
  QuestionSql,
  /// Schema definition statement
  Ddl,
  /// Free-text documentation about the data
  Documentation,
}

impl Category {
  pub const ALL: [Category; 3] = [Category::QuestionSql, Category::Ddl, Category::Documentation];

  /// Id suffix that marks records of this category
  pub fn suffix(self) -> &'static str {
    match self {
      Category::QuestionSql => "-sql",
      Category::Ddl => "-ddl",
      Category::Documentation => "-doc",
    }
  }

  /// Recover the category from a stored record id
  pub fn from_id(id: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|category| id.ends_with(category.suffix()))
  }

  pub fn label(self) -> &'static str {
    match self {
      Category::QuestionSql => "sql",
      Category::Ddl => "ddl",
      Category::Documentation => "documentation",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// Allocate a fresh record id tagged with the category suffix
pub fn tag_new(category: Category) -> String {
  format!("{}{}", Uuid::new_v4(), category.suffix())
}
