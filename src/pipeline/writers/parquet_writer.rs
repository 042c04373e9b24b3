use std::fs::File;
use std::path::Path;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;

use crate::error::{PipelineError, Result};
use crate::pipeline::writers::BaseWriter;

/// Writes record batches of a fixed schema to a Parquet file.
pub struct ParquetWriter {
    writer: Option<ArrowWriter<File>>,
}

impl ParquetWriter {
    pub fn new(path: &Path, schema: SchemaRef) -> Result<Self> {
        let file = File::create(path)?;
        let props = WriterProperties::builder().build();
        let writer = ArrowWriter::try_new(file, schema, Some(props))?;

        Ok(ParquetWriter {
            writer: Some(writer),
        })
    }
}

impl BaseWriter for ParquetWriter {
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        if batch.num_rows() == 0 {
            return Ok(());
        }
        match self.writer.as_mut() {
            Some(writer) => {
                writer.write(batch)?;
                Ok(())
            }
            None => Err(PipelineError::Unexpected(
                "Parquet writer already closed".to_string(),
            )),
        }
    }

    fn close(mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.close()?;
        }
        Ok(())
    }
}
