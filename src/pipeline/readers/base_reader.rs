use std::path::Path;

use crate::data_model::Dataset;
use crate::error::Result;

/// Loads one tabular file into memory.
pub trait BaseReader {
    fn read_dataset(&self, path: &Path) -> Result<Dataset>;
}

/// File name used as the dataset name in logs and errors.
pub(crate) fn dataset_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
