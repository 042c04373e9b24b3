use std::path::PathBuf;

use clap::Parser;

use crate::config::pipeline::{load_pipeline_config, FailurePolicy, PipelineConfig};
use crate::error::Result;
use crate::utils::logging::LogFormat;

/// Command-line arguments for the `classify-all` binary (stage 2).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "classify-all",
    author,
    version,
    about = "Label every normalized dataset in a directory with a sentiment class",
    long_about = None
)]
pub struct Args {
    /// Directory holding the normalized datasets
    #[arg(short, long, env = "COMMENT_BLASTER_PROCESSED_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory the labelled datasets are written to
    #[arg(short, long, env = "COMMENT_BLASTER_ANALYZED_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Name of the column holding the text to classify
    #[arg(long)]
    pub text_column: Option<String>,

    /// Name of the derived sentiment column
    #[arg(long)]
    pub output_column: Option<String>,

    /// Number of texts submitted to the model per call
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Model identifier (e.g. mdhugol/indonesia-bert-sentiment-classification)
    #[arg(long, env = "COMMENT_BLASTER_MODEL_ID")]
    pub model_id: Option<String>,

    /// Base URL of the inference endpoint
    #[arg(long, env = "COMMENT_BLASTER_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Path to the pipeline configuration YAML file
    #[arg(short = 'c', long, env = "COMMENT_BLASTER_CONFIG")]
    pub pipeline_config: Option<PathBuf>,

    /// What to do when a file fails
    #[arg(long, value_enum)]
    pub on_error: Option<FailurePolicy>,

    /// Write Prometheus text-format metrics to this file when the run ends
    #[arg(long)]
    pub metrics_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Also write logs to this file
    #[arg(long, env = "COMMENT_BLASTER_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Validate the pipeline configuration and exit without loading the model
    #[arg(long)]
    pub validate_config: bool,
}

impl Args {
    pub fn resolve_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.pipeline_config {
            Some(path) => load_pipeline_config(path)?,
            None => PipelineConfig::default(),
        };
        self.apply_to(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_to(&self, config: &mut PipelineConfig) {
        let params = &mut config.classify;
        if let Some(dir) = &self.input_dir {
            params.input_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            params.output_dir = dir.clone();
        }
        if let Some(col) = &self.text_column {
            params.text_column = col.clone();
        }
        if let Some(col) = &self.output_column {
            params.output_column = col.clone();
        }
        if let Some(size) = self.batch_size {
            params.batch_size = size;
        }
        if let Some(model_id) = &self.model_id {
            params.model.model_id = model_id.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            params.model.endpoint = endpoint.clone();
        }
        if let Some(policy) = self.on_error {
            config.runner.on_error = policy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    #[test]
    fn test_defaults_match_stage_two_layout() {
        let args = Args::try_parse_from(["classify-all"]).unwrap();
        let config = args.resolve_config().unwrap();
        assert_eq!(config.classify.input_dir, PathBuf::from("data/processed"));
        assert_eq!(config.classify.output_dir, PathBuf::from("data/analyzed"));
        assert_eq!(config.classify.text_column, "comment_prep");
        assert_eq!(config.classify.output_column, "sentiment");
        assert_eq!(config.classify.batch_size, 32);
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let args = Args::try_parse_from(["classify-all", "--batch-size", "0"]).unwrap();
        match args.resolve_config() {
            Err(PipelineError::ConfigError(msg)) => assert!(msg.contains("batch_size")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_model_flags_override_config() {
        let args = Args::try_parse_from([
            "classify-all",
            "--model-id",
            "org/other-model",
            "--endpoint",
            "http://localhost:8080/models",
            "-b",
            "8",
        ])
        .unwrap();
        let config = args.resolve_config().unwrap();
        assert_eq!(config.classify.model.model_id, "org/other-model");
        assert_eq!(config.classify.model.endpoint, "http://localhost:8080/models");
        assert_eq!(config.classify.batch_size, 8);
    }
}
