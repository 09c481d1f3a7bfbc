//! Arrow RecordBatch conversion for stored training records

use anyhow::{anyhow, Result};
use arrow::array::{Array, FixedSizeListArray, FixedSizeListBuilder, Float32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

use crate::record::{Metadata, Record};

/// Schema shared by every category table
pub fn record_schema(embedding_dimension: usize) -> SchemaRef {
  Arc::new(Schema::new(vec![
    Field::new("id", DataType::Utf8, false),
    Field::new("content", DataType::Utf8, false),
    Field::new("metadata", DataType::Utf8, false),
    Field::new(
      "embedding",
      DataType::FixedSizeList(
        Arc::new(Field::new("item", DataType::Float32, true)),
        embedding_dimension as i32,
      ),
      false,
    ),
  ]))
}

/// Convert records and their embeddings into one RecordBatch
pub fn records_to_arrow_batch(
  records: &[Record],
  embeddings: &[Vec<f32>],
  embedding_dimension: usize,
) -> Result<RecordBatch> {
  validate_batch_shape(records, embeddings, embedding_dimension)?;

  let metadata_json = records
    .iter()
    .map(|record| serde_json::to_string(&record.metadata))
    .collect::<Result<Vec<_>, _>>()?;

  let columns: Vec<Arc<dyn Array>> = vec![
    Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.id.as_str()))),
    Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.content.as_str()))),
    Arc::new(StringArray::from_iter_values(metadata_json.iter().map(String::as_str))),
    Arc::new(create_embedding_array(embeddings, embedding_dimension)),
  ];

  RecordBatch::try_new(record_schema(embedding_dimension), columns)
    .map_err(|e| anyhow!("Failed to create RecordBatch: {}", e))
}

fn validate_batch_shape(
  records: &[Record],
  embeddings: &[Vec<f32>],
  embedding_dimension: usize,
) -> Result<()> {
  if records.is_empty() {
    return Err(anyhow!("Cannot create RecordBatch from empty records"));
  }
  if records.len() != embeddings.len() {
    return Err(anyhow!("Got {} embeddings for {} records", embeddings.len(), records.len()));
  }
  if let Some(bad) = embeddings.iter().find(|e| e.len() != embedding_dimension) {
    return Err(anyhow!(
      "Embedding dimension mismatch: expected {}, got {}",
      embedding_dimension,
      bad.len()
    ));
  }
  Ok(())
}

fn create_embedding_array(
  embeddings: &[Vec<f32>],
  embedding_dimension: usize,
) -> FixedSizeListArray {
  let mut builder = FixedSizeListBuilder::new(
    Float32Array::builder(embedding_dimension * embeddings.len()),
    embedding_dimension as i32,
  );

  for embedding in embeddings {
    builder.values().append_slice(embedding);
    builder.append(true);
  }

  builder.finish()
}

/// Read records back out of a query result batch
pub fn records_from_batch(batch: &RecordBatch) -> Result<Vec<Record>> {
  let ids = extract_string_column(batch, "id")?;
  let contents = extract_string_column(batch, "content")?;
  let metadata = extract_string_column(batch, "metadata")?;

  (0..batch.num_rows())
    .map(|row| {
      let parsed: Metadata = serde_json::from_str(metadata.value(row))
        .map_err(|e| anyhow!("Invalid metadata for '{}': {}", ids.value(row), e))?;
      Ok(Record {
        id: ids.value(row).to_string(),
        content: contents.value(row).to_string(),
        metadata: parsed,
      })
    })
    .collect()
}

fn extract_string_column<'a>(batch: &'a RecordBatch, column_name: &str) -> Result<&'a StringArray> {
  batch
    .column_by_name(column_name)
    .ok_or_else(|| anyhow!("Missing '{}' column", column_name))?
    .as_any()
    .downcast_ref::<StringArray>()
    .ok_or_else(|| anyhow!("Failed to cast '{}' column to StringArray", column_name))
}
