use std::fs;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use tempfile::tempdir;
use CommentBlaster::config::{CsvOptions, TabularOptions};
use CommentBlaster::data_model::Dataset;
use CommentBlaster::error::{PipelineError, Result};
use CommentBlaster::pipeline::format::{read_dataset, write_dataset};
use CommentBlaster::pipeline::writers::{BaseWriter, ParquetWriter};

fn sample_dataset() -> Dataset {
    Dataset::from_text_columns(
        "comments.csv",
        vec![
            (
                "id",
                vec![Some("1".to_string()), Some("2".to_string()), Some("3".to_string())],
            ),
            (
                "comment",
                vec![
                    Some("Bagus, \"mantap\"".to_string()),
                    None,
                    Some("baris\nbaru".to_string()),
                ],
            ),
        ],
    )
    .unwrap()
}

#[test]
fn test_csv_write_read_roundtrip() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("comments.csv");
    let options = TabularOptions::default();

    let original = sample_dataset();
    write_dataset(&original, &path, &options)?;
    let read_back = read_dataset(&path, &options)?;

    assert_eq!(read_back.name(), "comments.csv");
    assert_eq!(read_back.num_rows(), 3);
    assert_eq!(read_back.text_values("id")?, original.text_values("id")?);
    // Quoting, embedded newlines and nulls survive.
    assert_eq!(
        read_back.text_values("comment")?,
        original.text_values("comment")?
    );
    Ok(())
}

#[test]
fn test_csv_custom_delimiter_is_used_for_writing() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("semi.csv");
    let options = TabularOptions {
        csv: CsvOptions {
            delimiter: ';',
            ..CsvOptions::default()
        },
        ..TabularOptions::default()
    };

    let ds = Dataset::from_text_columns(
        "semi.csv",
        vec![
            ("a", vec![Some("x".to_string())]),
            ("b", vec![Some("y".to_string())]),
        ],
    )?;
    write_dataset(&ds, &path, &options)?;
    let content = fs::read_to_string(&path)?;
    assert_eq!(content.lines().next(), Some("a;b"));

    let read_back = read_dataset(&path, &options)?;
    assert_eq!(read_back.text_values("b")?, vec![Some("y".to_string())]);
    Ok(())
}

#[test]
fn test_empty_dataset_keeps_header() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("empty.csv");
    let schema = Arc::new(Schema::new(vec![
        Field::new("comment", DataType::Utf8, true),
        Field::new("comment_prep", DataType::Utf8, true),
    ]));
    let ds = Dataset::new("empty.csv", schema, vec![]);

    write_dataset(&ds, &path, &TabularOptions::default())?;
    let content = fs::read_to_string(&path)?;
    assert_eq!(content.trim_end(), "comment,comment_prep");
    Ok(())
}

#[test]
fn test_parquet_roundtrip_keeps_schema_types() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("typed.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("likes", DataType::Int64, false),
        Field::new("comment", DataType::Utf8, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![10, 0])) as ArrayRef,
            Arc::new(StringArray::from(vec![Some("keren"), None])) as ArrayRef,
        ],
    )?;
    let ds = Dataset::new("typed.parquet", schema, vec![batch]);
    write_dataset(&ds, &path, &TabularOptions::default())?;

    let read_back = read_dataset(&path, &TabularOptions::default())?;
    assert_eq!(
        read_back.schema().field_with_name("likes")?.data_type(),
        &DataType::Int64
    );
    // Non-text columns are stringified on demand.
    assert_eq!(
        read_back.text_values("likes")?,
        vec![Some("10".to_string()), Some("0".to_string())]
    );
    assert_eq!(
        read_back.text_values("comment")?,
        vec![Some("keren".to_string()), None]
    );
    Ok(())
}

#[test]
fn test_parquet_writer_multiple_batches() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("multi.parquet");
    let first = sample_dataset();
    let schema = first.schema();

    let mut writer = ParquetWriter::new(&path, schema.clone())?;
    for batch in first.batches() {
        writer.write_batch(batch)?;
        writer.write_batch(batch)?;
    }
    writer.close()?;

    let read_back = read_dataset(&path, &TabularOptions::default())?;
    assert_eq!(read_back.num_rows(), 6);
    Ok(())
}

#[test]
fn test_with_text_column_replaces_existing_column() -> Result<()> {
    let ds = sample_dataset();
    let replaced = ds.with_text_column(
        "comment",
        vec!["a".to_string(), "b".to_string(), "c".to_string()],
    )?;
    assert_eq!(replaced.schema().fields().len(), 2);
    assert_eq!(
        replaced.text_values("comment")?,
        vec![Some("a".to_string()), Some("b".to_string()), Some("c".to_string())]
    );

    let appended = ds.with_text_column(
        "sentiment",
        vec!["netral".to_string(), "netral".to_string(), "positif".to_string()],
    )?;
    assert_eq!(appended.schema().field(2).name(), "sentiment");
    // The original dataset is untouched.
    assert_eq!(ds.schema().fields().len(), 2);
    Ok(())
}

#[test]
fn test_with_text_column_rejects_wrong_length() {
    let ds = sample_dataset();
    let result = ds.with_text_column("sentiment", vec!["netral".to_string()]);
    assert!(matches!(result, Err(PipelineError::Unexpected(_))));
}

#[test]
fn test_missing_column_is_reported() {
    let ds = sample_dataset();
    match ds.text_values("review") {
        Err(PipelineError::MissingColumn { column, dataset }) => {
            assert_eq!(column, "review");
            assert_eq!(dataset, "comments.csv");
        }
        other => panic!("Expected MissingColumn, got {:?}", other),
    }
}
