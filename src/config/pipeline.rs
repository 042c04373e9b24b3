use crate::config::tabular::TabularOptions;
use crate::data_model::Sentiment;
use crate::error::{PipelineError, Result};
use crate::pipeline::sentiment::LabelMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Overall configuration read from YAML. Every section and field is optional;
/// missing values fall back to the defaults below.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub normalize: NormalizeParams,
    pub classify: ClassifyParams,
    pub runner: RunnerParams,
}

/// How raw text is cleaned before tokenisation.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CleaningPolicy {
    /// Lowercase only.
    Simple,
    /// Strip emoji, emoticons, HTML tags and special characters, then lowercase.
    #[default]
    Enhanced,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerKind {
    /// `\w+(?:\.\w+)*|[^\w\s]+` pre-tokenisation: punctuation is split from
    /// words, but "100.000" stays whole.
    #[default]
    WordPunct,
    /// UAX #29 word segmentation, word-like segments only.
    UnicodeWords,
    Whitespace,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StopwordLanguage {
    #[default]
    Indonesian,
    English,
    None,
}

/// What the directory runner does when one file fails.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the whole run on the first failing file.
    #[default]
    FailFast,
    /// Log the failure, record it in the run summary and continue.
    Skip,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct StopwordParams {
    pub language: StopwordLanguage,
    /// Additional stopwords appended to the built-in list
    pub extra: Vec<String>,
    /// Optional file with one stopword per line
    pub file: Option<PathBuf>,
}

/// Parameters for stage 1 (text normalisation).
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct NormalizeParams {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub text_column: String,
    pub output_column: String,
    /// Join surviving tokens with single spaces instead of emitting a token list
    pub concatenate: bool,
    pub policy: CleaningPolicy,
    /// Keep '.' while stripping other special characters (enhanced policy only)
    pub keep_periods: bool,
    pub tokenizer: TokenizerKind,
    pub stopwords: StopwordParams,
    /// Also drop tokens made only of punctuation, such as "..."
    pub drop_punctuation_tokens: bool,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        NormalizeParams {
            input_dir: PathBuf::from("data/raw"),
            output_dir: PathBuf::from("data/processed"),
            text_column: "comment".to_string(),
            output_column: "comment_prep".to_string(),
            concatenate: true,
            policy: CleaningPolicy::default(),
            keep_periods: true,
            tokenizer: TokenizerKind::default(),
            stopwords: StopwordParams::default(),
            drop_punctuation_tokens: false,
        }
    }
}

/// Where and how to reach the sentiment model.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ModelParams {
    pub model_id: String,
    /// Base URL of the text-classification inference endpoint; the model id is appended.
    pub endpoint: String,
    /// Model hub used to verify the model and read its label vocabulary at load time.
    pub hub_url: String,
    pub verify_on_load: bool,
    /// Name of the environment variable holding the API token
    pub api_token_env: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            model_id: "mdhugol/indonesia-bert-sentiment-classification".to_string(),
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            hub_url: "https://huggingface.co".to_string(),
            verify_on_load: true,
            api_token_env: Some("HF_API_TOKEN".to_string()),
            timeout_secs: 120,
        }
    }
}

/// Output strings written for each sentiment class.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SentimentNames {
    pub positive: String,
    pub neutral: String,
    pub negative: String,
}

impl Default for SentimentNames {
    fn default() -> Self {
        SentimentNames {
            positive: "positif".to_string(),
            neutral: "netral".to_string(),
            negative: "negatif".to_string(),
        }
    }
}

impl SentimentNames {
    pub fn get(&self, sentiment: Sentiment) -> &str {
        match sentiment {
            Sentiment::Positive => &self.positive,
            Sentiment::Neutral => &self.neutral,
            Sentiment::Negative => &self.negative,
        }
    }
}

pub fn default_label_map() -> BTreeMap<String, Sentiment> {
    BTreeMap::from([
        ("LABEL_0".to_string(), Sentiment::Positive),
        ("LABEL_1".to_string(), Sentiment::Neutral),
        ("LABEL_2".to_string(), Sentiment::Negative),
    ])
}

/// Parameters for stage 2 (sentiment classification).
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClassifyParams {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub text_column: String,
    pub output_column: String,
    pub batch_size: usize,
    /// Capacity of the single-text memo cache; 0 disables it
    pub cache_capacity: usize,
    pub model: ModelParams,
    /// Raw model label -> sentiment class
    pub label_map: BTreeMap<String, Sentiment>,
    pub label_names: SentimentNames,
}

impl Default for ClassifyParams {
    fn default() -> Self {
        ClassifyParams {
            input_dir: PathBuf::from("data/processed"),
            output_dir: PathBuf::from("data/analyzed"),
            text_column: "comment_prep".to_string(),
            output_column: "sentiment".to_string(),
            batch_size: 32,
            cache_capacity: 10_000,
            model: ModelParams::default(),
            label_map: default_label_map(),
            label_names: SentimentNames::default(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RunnerParams {
    /// File extensions (without dot, case-insensitive) treated as datasets
    pub extensions: Vec<String>,
    pub on_error: FailurePolicy,
    pub tabular: TabularOptions,
}

impl Default for RunnerParams {
    fn default() -> Self {
        RunnerParams {
            extensions: vec!["csv".to_string(), "parquet".to_string()],
            on_error: FailurePolicy::default(),
            tabular: TabularOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Checks values serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        let n = &self.normalize;
        let c = &self.classify;
        let r = &self.runner;

        let required = [
            ("normalize.text_column", &n.text_column),
            ("normalize.output_column", &n.output_column),
            ("classify.text_column", &c.text_column),
            ("classify.output_column", &c.output_column),
            ("classify.model.model_id", &c.model.model_id),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(PipelineError::ConfigError(format!("'{}' must not be empty", key)));
            }
        }

        if c.batch_size == 0 {
            return Err(PipelineError::ConfigError(
                "'classify.batch_size' must be at least 1".to_string(),
            ));
        }
        if r.tabular.batch_size == 0 {
            return Err(PipelineError::ConfigError(
                "'runner.tabular.batch_size' must be at least 1".to_string(),
            ));
        }
        if r.tabular.csv.delimiter_byte().is_none() {
            return Err(PipelineError::ConfigError(format!(
                "CSV delimiter '{}' is not a single ASCII character",
                r.tabular.csv.delimiter
            )));
        }
        if r.extensions.is_empty() {
            return Err(PipelineError::ConfigError(
                "'runner.extensions' must list at least one file extension".to_string(),
            ));
        }
        LabelMap::from_params(c)?;
        Ok(())
    }
}

/// Loads and parses the pipeline configuration YAML file.
pub fn load_pipeline_config<P: AsRef<Path>>(config_path: P) -> Result<PipelineConfig> {
    let path_ref = config_path.as_ref();
    let config_content = fs::read_to_string(path_ref).map_err(|e| {
        PipelineError::ConfigError(format!(
            "Failed to read pipeline config file '{}': {}",
            path_ref.display(),
            e
        ))
    })?;

    // An empty file is a valid "all defaults" config.
    if config_content.trim().is_empty() {
        return Ok(PipelineConfig::default());
    }

    serde_yaml::from_str(&config_content).map_err(|e| {
        PipelineError::ConfigError(format!(
            "Failed to parse pipeline config YAML from '{}': {}",
            path_ref.display(),
            e
        ))
    })
}
