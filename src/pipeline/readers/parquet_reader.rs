// src/pipeline/readers/parquet_reader.rs

use std::fs::File;
use std::path::Path;

use arrow::record_batch::RecordBatchReader;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::config::TabularOptions;
use crate::data_model::Dataset;
use crate::error::Result;
use crate::pipeline::readers::base_reader::{dataset_name, BaseReader};

/// Reads a Parquet file into a Dataset, keeping its Arrow schema.
#[derive(Debug, Clone)]
pub struct ParquetReader {
    options: TabularOptions,
}

impl ParquetReader {
    pub fn new(options: TabularOptions) -> Self {
        ParquetReader { options }
    }
}

impl BaseReader for ParquetReader {
    fn read_dataset(&self, path: &Path) -> Result<Dataset> {
        let file = File::open(path)?;
        let record_batch_reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(self.options.batch_size)
            .build()?;
        let schema = record_batch_reader.schema();

        let batches = record_batch_reader.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Dataset::new(dataset_name(path), schema, batches))
    }
}
