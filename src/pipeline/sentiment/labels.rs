use std::collections::{BTreeMap, HashSet};

use crate::config::pipeline::{ClassifyParams, SentimentNames};
use crate::data_model::Sentiment;
use crate::error::{PipelineError, Result};

/// Raw model label -> sentiment class -> output string.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMap {
    raw: BTreeMap<String, Sentiment>,
    names: SentimentNames,
}

impl LabelMap {
    pub fn new(raw: BTreeMap<String, Sentiment>, names: SentimentNames) -> Result<Self> {
        if raw.is_empty() {
            return Err(PipelineError::ConfigError(
                "'label_map' must map at least one model label".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for sentiment in Sentiment::ALL {
            let name = names.get(sentiment);
            if name.is_empty() {
                return Err(PipelineError::ConfigError(format!(
                    "Output label for {:?} must not be empty",
                    sentiment
                )));
            }
            if !seen.insert(name.to_string()) {
                return Err(PipelineError::ConfigError(format!(
                    "Output label '{}' is used for more than one sentiment",
                    name
                )));
            }
        }
        Ok(LabelMap { raw, names })
    }

    pub fn from_params(params: &ClassifyParams) -> Result<Self> {
        LabelMap::new(params.label_map.clone(), params.label_names.clone())
    }

    pub fn resolve(&self, raw_label: &str) -> Option<Sentiment> {
        self.raw.get(raw_label).copied()
    }

    pub fn name(&self, sentiment: Sentiment) -> &str {
        self.names.get(sentiment)
    }

    /// Labels from `advertised` that have no mapping.
    pub fn unmapped<'a>(&self, advertised: &'a [String]) -> Vec<&'a str> {
        advertised
            .iter()
            .map(String::as_str)
            .filter(|label| !self.raw.contains_key(*label))
            .collect()
    }
}

impl Default for LabelMap {
    fn default() -> Self {
        LabelMap {
            raw: crate::config::pipeline::default_label_map(),
            names: SentimentNames::default(),
        }
    }
}
