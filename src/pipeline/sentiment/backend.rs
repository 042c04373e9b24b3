use serde::Deserialize;

use crate::error::Result;

/// Top label the model assigned to one input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

/// A loaded text-classification model. One `predict_batch` call is one model
/// invocation, whatever the number of inputs.
pub trait SentimentBackend: Send + Sync {
    fn model_id(&self) -> &str;

    /// Returns exactly one prediction per input, in input order.
    fn predict_batch(&self, texts: &[String]) -> Result<Vec<Prediction>>;

    /// Raw labels the model advertises, if known.
    fn known_labels(&self) -> Vec<String> {
        Vec::new()
    }
}
