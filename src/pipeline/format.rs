use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use arrow::record_batch::RecordBatch;
use tracing::{debug, warn};

use crate::config::TabularOptions;
use crate::data_model::Dataset;
use crate::error::{PipelineError, Result};
use crate::pipeline::readers::{BaseReader, CsvReader, ParquetReader};
use crate::pipeline::writers::{BaseWriter, CsvWriter, ParquetWriter};

/// On-disk formats a dataset can be read from and written back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Csv,
    Parquet,
}

impl TabularFormat {
    /// Picks the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(TabularFormat::Csv),
            "parquet" => Some(TabularFormat::Parquet),
            _ => None,
        }
    }
}

impl fmt::Display for TabularFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabularFormat::Csv => write!(f, "csv"),
            TabularFormat::Parquet => write!(f, "parquet"),
        }
    }
}

fn require_format(path: &Path) -> Result<TabularFormat> {
    TabularFormat::from_path(path).ok_or_else(|| {
        PipelineError::ConfigError(format!(
            "Unsupported dataset format for '{}' (expected .csv or .parquet)",
            path.display()
        ))
    })
}

/// Reads `path` with the reader matching its extension.
pub fn read_dataset(path: &Path, options: &TabularOptions) -> Result<Dataset> {
    let format = require_format(path)?;
    debug!(path = %path.display(), %format, "Reading dataset");
    match format {
        TabularFormat::Csv => CsvReader::new(options.clone()).read_dataset(path),
        TabularFormat::Parquet => ParquetReader::new(options.clone()).read_dataset(path),
    }
}

fn write_all<W: BaseWriter>(mut writer: W, dataset: &Dataset) -> Result<()> {
    if dataset.batches().is_empty() {
        // Still emit the column header for an empty dataset.
        writer.write_batch(&RecordBatch::new_empty(dataset.schema()))?;
    }
    for batch in dataset.batches() {
        writer.write_batch(batch)?;
    }
    writer.close()
}

// Hidden sibling of `path` that receives the data until it is complete.
fn partial_path(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
        PipelineError::Unexpected(format!("'{}' has no file name", path.display()))
    })?;
    Ok(path.with_file_name(format!(".{}.partial", file_name)))
}

/// Writes `dataset` to `path` in the format matching its extension. `path` only
/// appears once the whole dataset has been written.
pub fn write_dataset(dataset: &Dataset, path: &Path, options: &TabularOptions) -> Result<()> {
    let format = require_format(path)?;
    let partial = partial_path(path)?;
    debug!(
        path = %path.display(),
        %format,
        rows = dataset.num_rows(),
        "Writing dataset"
    );
    let written = match format {
        TabularFormat::Csv => write_all(CsvWriter::new(&partial, &options.csv)?, dataset),
        TabularFormat::Parquet => {
            write_all(ParquetWriter::new(&partial, dataset.schema())?, dataset)
        }
    };
    match written {
        Ok(()) => {
            fs::rename(&partial, path)?;
            Ok(())
        }
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&partial) {
                warn!(
                    path = %partial.display(),
                    error = %cleanup,
                    "Could not remove partial output"
                );
            }
            Err(e)
        }
    }
}
