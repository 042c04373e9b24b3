use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use arrow::csv::{Writer, WriterBuilder};
use arrow::record_batch::RecordBatch;

use crate::config::CsvOptions;
use crate::error::{PipelineError, Result};
use crate::pipeline::writers::BaseWriter;

/// Writes record batches to a delimited text file, header first.
pub struct CsvWriter {
    writer: Writer<BufWriter<File>>,
}

impl CsvWriter {
    pub fn new(path: &Path, options: &CsvOptions) -> Result<Self> {
        let delimiter = options.delimiter_byte().ok_or_else(|| {
            PipelineError::ConfigError(format!(
                "CSV delimiter '{}' is not a single ASCII character",
                options.delimiter
            ))
        })?;
        let file = File::create(path)?;
        let writer = WriterBuilder::new()
            .with_header(options.has_header)
            .with_delimiter(delimiter)
            .build(BufWriter::new(file));
        Ok(CsvWriter { writer })
    }
}

impl BaseWriter for CsvWriter {
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        self.writer.write(batch)?;
        Ok(())
    }

    fn close(self) -> Result<()> {
        let mut inner = self.writer.into_inner();
        inner.flush()?;
        Ok(())
    }
}
