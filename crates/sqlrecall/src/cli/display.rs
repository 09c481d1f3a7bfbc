//! Display formatting for CLI output

use colored::*;

use crate::category::Category;
use crate::record::{QuestionSql, TrainingItem};

/// Collapse whitespace and cut text to `width` characters
pub fn truncate(text: &str, width: usize) -> String {
  let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
  if flat.chars().count() <= width {
    return flat;
  }

  let cut: String = flat.chars().take(width.saturating_sub(1)).collect();
  format!("{cut}…")
}

pub fn category_badge(category: Category) -> ColoredString {
  match category {
    Category::QuestionSql => "sql".green().bold(),
    Category::Ddl => "ddl".blue().bold(),
    Category::Documentation => "doc".magenta().bold(),
  }
}

pub fn display_question_sql(rank: usize, pair: &QuestionSql) {
  println!("{} {}", format!("{rank}.").dimmed(), pair.question.bold());
  for line in pair.sql.lines() {
    println!("   {}", line.cyan());
  }
}

pub fn display_text(rank: usize, text: &str) {
  println!("{} {}", format!("{rank}.").dimmed(), text);
}

pub fn display_training_item(item: &TrainingItem) {
  let summary = if item.question.is_empty() {
    truncate(&item.content, 72)
  } else {
    format!("{} {} {}", truncate(&item.question, 40), "→".dimmed(), truncate(&item.content, 40))
  };
  println!("[{}] {} {}", category_badge(item.category), item.id.yellow(), summary);
}
