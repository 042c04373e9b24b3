use thiserror::Error;

/// Custom Result type for this crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The Error type for pipeline operations.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Parquet error: {source}")]
    ParquetError {
        #[from]
        source: parquet::errors::ParquetError,
    },

    #[error("Arrow error: {source}")]
    ArrowError {
        #[from]
        source: arrow::error::ArrowError,
    },

    #[error("Serialization/Deserialization error: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    #[error("HTTP error: {source}")]
    HttpError {
        #[from]
        source: reqwest::Error,
    },

    /// A dataset lacks a column the stage needs. Aborts that dataset.
    #[error("Column '{column}' not found in dataset '{dataset}'")]
    MissingColumn { column: String, dataset: String },

    /// The classification model could not be fetched or initialised.
    #[error("Failed to load model '{model_id}': {reason}")]
    ModelLoad { model_id: String, reason: String },

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Error in processing step '{step_name}': {source}")]
    StepError {
        step_name: String,
        source: Box<PipelineError>,
    },

    #[error("Failed to process '{path}': {source}")]
    FileError {
        path: String,
        source: Box<PipelineError>,
    },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl PipelineError {
    /// Strips `StepError` and `FileError` wrappers.
    pub fn root_cause(&self) -> &PipelineError {
        match self {
            PipelineError::StepError { source, .. } | PipelineError::FileError { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> u8 {
        match self.root_cause() {
            PipelineError::ConfigError(_) => 2,
            PipelineError::ModelLoad { .. } => 3,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_unwraps_nested_wrappers() {
        let err = PipelineError::FileError {
            path: "data/raw/a.csv".to_string(),
            source: Box::new(PipelineError::StepError {
                step_name: "NormalizeStep".to_string(),
                source: Box::new(PipelineError::MissingColumn {
                    column: "comment".to_string(),
                    dataset: "a.csv".to_string(),
                }),
            }),
        };
        match err.root_cause() {
            PipelineError::MissingColumn { column, .. } => assert_eq!(column, "comment"),
            other => panic!("Expected MissingColumn, got {:?}", other),
        }
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(PipelineError::ConfigError("bad".into()).exit_code(), 2);
        let load = PipelineError::ModelLoad {
            model_id: "m".into(),
            reason: "offline".into(),
        };
        assert_eq!(load.exit_code(), 3);
        assert!(load.to_string().contains("Failed to load model 'm'"));
    }
}
