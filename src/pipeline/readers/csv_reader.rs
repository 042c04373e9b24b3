// src/pipeline/readers/csv_reader.rs

use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::sync::Arc;

use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use tracing::debug;

use crate::config::TabularOptions;
use crate::data_model::Dataset;
use crate::error::{PipelineError, Result};
use crate::pipeline::readers::base_reader::{dataset_name, BaseReader};

/// Reads a delimited text file into a Dataset.
#[derive(Debug, Clone)]
pub struct CsvReader {
    options: TabularOptions,
}

impl CsvReader {
    pub fn new(options: TabularOptions) -> Self {
        CsvReader { options }
    }
}

impl BaseReader for CsvReader {
    fn read_dataset(&self, path: &Path) -> Result<Dataset> {
        let csv = &self.options.csv;
        let delimiter = csv.delimiter_byte().ok_or_else(|| {
            PipelineError::ConfigError(format!(
                "CSV delimiter '{}' is not a single ASCII character",
                csv.delimiter
            ))
        })?;

        let mut file = File::open(path)?;
        // Short rows are padded with nulls instead of failing the file.
        let format = Format::default()
            .with_header(csv.has_header)
            .with_delimiter(delimiter)
            .with_truncated_rows(true);
        let (inferred, rows_sampled) = format.infer_schema(&mut file, csv.infer_max_records)?;
        file.rewind()?;

        let schema = if csv.infer_types {
            inferred
        } else {
            // Column names only; every value is kept as text.
            Schema::new(
                inferred
                    .fields()
                    .iter()
                    .map(|f| Field::new(f.name(), DataType::Utf8, true))
                    .collect::<Vec<_>>(),
            )
        };
        let schema = Arc::new(schema);
        debug!(
            path = %path.display(),
            columns = schema.fields().len(),
            rows_sampled,
            "Resolved CSV schema"
        );

        let reader = ReaderBuilder::new(schema.clone())
            .with_header(csv.has_header)
            .with_delimiter(delimiter)
            .with_batch_size(self.options.batch_size)
            .with_truncated_rows(true)
            .build(file)?;

        let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Dataset::new(dataset_name(path), schema, batches))
    }
}
