use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, RecordBatch, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, FieldRef, Schema, SchemaRef};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// One tabular file held in memory: a schema plus its record batches in row order.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        Dataset {
            name: name.into(),
            schema,
            batches,
        }
    }

    /// Builds a dataset of nullable UTF-8 columns. All columns must have the same length.
    pub fn from_text_columns(
        name: impl Into<String>,
        columns: Vec<(&str, Vec<Option<String>>)>,
    ) -> Result<Self> {
        let fields: Vec<FieldRef> = columns
            .iter()
            .map(|(col, _)| Arc::new(Field::new(*col, DataType::Utf8, true)))
            .collect();
        let schema = Arc::new(Schema::new(fields));
        let arrays: Vec<ArrayRef> = columns
            .into_iter()
            .map(|(_, values)| Arc::new(StringArray::from(values)) as ArrayRef)
            .collect();
        let batch = RecordBatch::try_new(schema.clone(), arrays)?;
        Ok(Dataset::new(name, schema, vec![batch]))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }

    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.schema
            .index_of(column)
            .map_err(|_| PipelineError::MissingColumn {
                column: column.to_string(),
                dataset: self.name.clone(),
            })
    }

    /// Values of `column` coerced to strings, in row order. Nulls stay `None`.
    pub fn text_values(&self, column: &str) -> Result<Vec<Option<String>>> {
        let idx = self.column_index(column)?;
        let mut values = Vec::with_capacity(self.num_rows());
        for batch in &self.batches {
            let as_utf8 = cast(batch.column(idx), &DataType::Utf8)?;
            let strings = as_utf8.as_string::<i32>();
            for i in 0..strings.len() {
                if strings.is_null(i) {
                    values.push(None);
                } else {
                    values.push(Some(strings.value(i).to_string()));
                }
            }
        }
        Ok(values)
    }

    /// Returns a new dataset with `column` set to `values`. An existing column of
    /// that name is replaced in place, otherwise the column is appended.
    pub fn with_text_column(&self, column: &str, values: Vec<String>) -> Result<Dataset> {
        if values.len() != self.num_rows() {
            return Err(PipelineError::Unexpected(format!(
                "Column '{}' has {} values but dataset '{}' has {} rows",
                column,
                values.len(),
                self.name,
                self.num_rows()
            )));
        }

        let new_field: FieldRef = Arc::new(Field::new(column, DataType::Utf8, true));
        let existing = self.schema.index_of(column).ok();
        let mut fields: Vec<FieldRef> = self.schema.fields().iter().cloned().collect();
        match existing {
            Some(idx) => fields[idx] = new_field,
            None => fields.push(new_field),
        }
        let schema = Arc::new(Schema::new_with_metadata(
            fields,
            self.schema.metadata().clone(),
        ));

        let mut batches = Vec::with_capacity(self.batches.len());
        let mut offset = 0;
        for batch in &self.batches {
            let rows = batch.num_rows();
            let slice = &values[offset..offset + rows];
            offset += rows;
            let array = Arc::new(StringArray::from_iter_values(slice.iter())) as ArrayRef;

            let mut columns: Vec<ArrayRef> = batch.columns().to_vec();
            match existing {
                Some(idx) => columns[idx] = array,
                None => columns.push(array),
            }
            batches.push(RecordBatch::try_new(schema.clone(), columns)?);
        }

        Ok(Dataset {
            name: self.name.clone(),
            schema,
            batches,
        })
    }
}

/// Output of text normalisation for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedText {
    Tokens(Vec<String>),
    Joined(String),
}

impl NormalizedText {
    pub fn empty(concatenate: bool) -> Self {
        if concatenate {
            NormalizedText::Joined(String::new())
        } else {
            NormalizedText::Tokens(Vec::new())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            NormalizedText::Tokens(tokens) => tokens.is_empty(),
            NormalizedText::Joined(text) => text.is_empty(),
        }
    }

    /// The value stored in a tabular cell. Token lists become a JSON array.
    pub fn to_cell(&self) -> Result<String> {
        match self {
            NormalizedText::Joined(text) => Ok(text.clone()),
            NormalizedText::Tokens(tokens) => Ok(serde_json::to_string(tokens)?),
        }
    }
}

/// The closed set of sentiment classes every record ends up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_text_columns(
            "sample.csv",
            vec![
                (
                    "comment",
                    vec![Some("Bagus".to_string()), None, Some("Jelek".to_string())],
                ),
                (
                    "user",
                    vec![
                        Some("a".to_string()),
                        Some("b".to_string()),
                        Some("c".to_string()),
                    ],
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_text_values_keep_nulls() {
        let ds = sample();
        assert_eq!(ds.num_rows(), 3);
        assert_eq!(
            ds.text_values("comment").unwrap(),
            vec![Some("Bagus".to_string()), None, Some("Jelek".to_string())]
        );
    }

    #[test]
    fn test_missing_column_is_structural_error() {
        let ds = sample();
        match ds.text_values("text") {
            Err(PipelineError::MissingColumn { column, dataset }) => {
                assert_eq!(column, "text");
                assert_eq!(dataset, "sample.csv");
            }
            other => panic!("Expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_with_text_column_appends_then_replaces() {
        let ds = sample();
        let added = ds
            .with_text_column("comment_prep", vec!["x".into(), "".into(), "z".into()])
            .unwrap();
        assert_eq!(added.schema().fields().len(), 3);
        assert_eq!(added.schema().field(2).name(), "comment_prep");

        let replaced = added
            .with_text_column("comment_prep", vec!["1".into(), "2".into(), "3".into()])
            .unwrap();
        assert_eq!(replaced.schema().fields().len(), 3);
        assert_eq!(
            replaced.text_values("comment_prep").unwrap(),
            vec![Some("1".into()), Some("2".into()), Some("3".into())]
        );
        // Original is untouched.
        assert_eq!(ds.schema().fields().len(), 2);
    }

    #[test]
    fn test_with_text_column_rejects_wrong_length() {
        let ds = sample();
        assert!(ds.with_text_column("out", vec!["only one".into()]).is_err());
    }

    #[test]
    fn test_text_values_stringify_numbers() {
        use arrow::array::Int64Array;
        let schema = Arc::new(Schema::new(vec![Field::new("comment", DataType::Int64, true)]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(Int64Array::from(vec![Some(42), None])) as ArrayRef],
        )
        .unwrap();
        let ds = Dataset::new("nums", schema, vec![batch]);
        assert_eq!(
            ds.text_values("comment").unwrap(),
            vec![Some("42".to_string()), None]
        );
    }

    #[test]
    fn test_normalized_text_cells() {
        let tokens = NormalizedText::Tokens(vec!["bagus".into(), "top".into()]);
        assert_eq!(tokens.to_cell().unwrap(), r#"["bagus","top"]"#);
        assert!(NormalizedText::empty(true).is_empty());
        assert_eq!(NormalizedText::empty(false), NormalizedText::Tokens(vec![]));
    }
}
