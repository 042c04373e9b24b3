use arrow::record_batch::RecordBatch;

use crate::error::Result;

/// Trait for writing record batches to an output sink (e.g. file).
pub trait BaseWriter {
    /// Write one batch to the sink.
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()>;

    /// Finalize and close the output writer.
    fn close(self) -> Result<()>;
}
