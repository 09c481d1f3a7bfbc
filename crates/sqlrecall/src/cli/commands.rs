//! Handlers for each CLI subcommand

use anyhow::Result;
use colored::*;

use crate::cli::display::{
  category_badge, display_question_sql, display_text, display_training_item,
};
use crate::cli::open_store;
use crate::record::TrainingEntry;

/// Add a training entry of any category
pub async fn add(entry: TrainingEntry) -> Result<()> {
  let store = open_store().await?;
  let category = entry.category();
  let id = store.train(entry).await?;
  store.close().await?;

  println!("{} Added {} {}", "✓".green(), category_badge(category), id.yellow());
  Ok(())
}

/// Show question/SQL pairs similar to a question
pub async fn similar(question: &str) -> Result<()> {
  let store = open_store().await?;
  let pairs = store.get_similar_question_sql(question).await?;
  store.close().await?;

  if pairs.is_empty() {
    println!("No similar questions found.");
    return Ok(());
  }

  for (index, pair) in pairs.iter().enumerate() {
    display_question_sql(index + 1, pair);
  }
  Ok(())
}

/// Show DDL statements related to a question
pub async fn related_ddl(question: &str) -> Result<()> {
  let store = open_store().await?;
  let statements = store.get_related_ddl(question).await?;
  store.close().await?;

  print_texts(&statements, "No related DDL found.");
  Ok(())
}

/// Show documentation related to a question
pub async fn related_docs(question: &str) -> Result<()> {
  let store = open_store().await?;
  let docs = store.get_related_documentation(question).await?;
  store.close().await?;

  print_texts(&docs, "No related documentation found.");
  Ok(())
}

/// List all stored training data
pub async fn list() -> Result<()> {
  let store = open_store().await?;
  let items = store.get_training_data().await?;
  store.close().await?;

  if items.is_empty() {
    println!("No training data stored.");
    return Ok(());
  }

  for item in &items {
    display_training_item(item);
  }
  println!("\n{} items", items.len().to_string().bold());
  Ok(())
}

/// Remove one training record by id
pub async fn remove(id: &str) -> Result<()> {
  let store = open_store().await?;
  store.remove_training_data(id).await?;
  store.close().await?;

  println!("{} Removed {}", "✓".green(), id.yellow());
  Ok(())
}

fn print_texts(texts: &[String], empty_message: &str) {
  if texts.is_empty() {
    println!("{empty_message}");
    return;
  }

  for (index, text) in texts.iter().enumerate() {
    display_text(index + 1, text);
  }
}
