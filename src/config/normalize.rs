use std::path::PathBuf;

use clap::Parser;

use crate::config::pipeline::{load_pipeline_config, FailurePolicy, PipelineConfig};
use crate::error::Result;
use crate::utils::logging::LogFormat;

/// Command-line arguments for the `normalize-all` binary (stage 1).
///
/// Every value left unset falls back to the pipeline config file, then to the
/// built-in defaults.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "normalize-all",
    author,
    version,
    about = "Clean and tokenize the comment column of every dataset in a directory",
    long_about = None
)]
pub struct Args {
    /// Directory holding the raw datasets
    #[arg(short, long, env = "COMMENT_BLASTER_RAW_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory the normalized datasets are written to
    #[arg(short, long, env = "COMMENT_BLASTER_PROCESSED_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Name of the column holding the raw comment text
    #[arg(long)]
    pub text_column: Option<String>,

    /// Name of the derived column holding the normalized text
    #[arg(long)]
    pub output_column: Option<String>,

    /// Emit token lists (JSON arrays) instead of space-joined text
    #[arg(long)]
    pub tokens: bool,

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

    /// Validate the pipeline configuration and exit
    #[arg(long)]
    pub validate_config: bool,
}

impl Args {
    /// Loads the config file (if any), applies the flags on top and validates the result.
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
        let params = &mut config.normalize;
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
        if self.tokens {
            params.concatenate = false;
        }
        if let Some(policy) = self.on_error {
            config.runner.on_error = policy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stage_one_layout() {
        let args = Args::try_parse_from(["normalize-all"]).unwrap();
        let config = args.resolve_config().unwrap();
        assert_eq!(config.normalize.input_dir, PathBuf::from("data/raw"));
        assert_eq!(config.normalize.output_dir, PathBuf::from("data/processed"));
        assert_eq!(config.normalize.text_column, "comment");
        assert_eq!(config.normalize.output_column, "comment_prep");
        assert!(config.normalize.concatenate);
        assert_eq!(config.runner.on_error, FailurePolicy::FailFast);
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "normalize-all",
            "--input-dir",
            "in",
            "--output-dir",
            "out",
            "--text-column",
            "text",
            "--tokens",
            "--on-error",
            "skip",
        ])
        .unwrap();
        let config = args.resolve_config().unwrap();
        assert_eq!(config.normalize.input_dir, PathBuf::from("in"));
        assert_eq!(config.normalize.output_dir, PathBuf::from("out"));
        assert_eq!(config.normalize.text_column, "text");
        assert!(!config.normalize.concatenate);
        assert_eq!(config.runner.on_error, FailurePolicy::Skip);
    }
}
