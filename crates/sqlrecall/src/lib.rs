//! sqlrecall - Training-Data Knowledge Store for Text-to-SQL
//!
//! Persists question/SQL pairs, schema DDL and free-text documentation into a
//! vector index and retrieves the most relevant items for a new question.
//! Every stored record carries its category in the suffix of its id, which is
//! the only thing the retriever needs to sort a mixed ranked list back into
//! typed results.

pub mod backend;
pub mod category;
pub mod cli;
pub mod collections;
pub mod config;
pub mod embedding;
pub mod error;
pub mod record;
pub mod retriever;
pub mod store;
pub mod writer;

pub use category::Category;
pub use config::{CollectionNames, SearchStrategy, StoreConfig};
pub use error::StoreError;
pub use record::{QuestionSql, Record, TrainingEntry, TrainingItem};
pub use store::KnowledgeStore;
