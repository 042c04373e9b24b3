use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use indicatif::ProgressBar;
use lru::LruCache;
use tracing::{debug, warn};

use crate::data_model::{Dataset, Sentiment};
use crate::error::{PipelineError, Result};
use crate::pipeline::sentiment::backend::{Prediction, SentimentBackend};
use crate::pipeline::sentiment::labels::LabelMap;
use crate::utils::prometheus_metrics::{
    BATCH_INFERENCE_DURATION_SECONDS, CLASSIFICATION_FALLBACKS_TOTAL, CLASSIFY_CACHE_HITS_TOTAL,
    MODEL_INVOCATIONS_TOTAL, RECORDS_CLASSIFIED_TOTAL,
};

/// Assigns one of the three sentiment classes to each text. Never fails on a
/// single value: anything that goes wrong resolves to `Neutral`.
pub struct SentimentClassifier {
    backend: Arc<dyn SentimentBackend>,
    labels: LabelMap,
    cache: Option<Mutex<LruCache<String, Sentiment>>>,
}

impl SentimentClassifier {
    pub fn new(backend: Arc<dyn SentimentBackend>, labels: LabelMap, cache_capacity: usize) -> Self {
        let unmapped = labels.unmapped(&backend.known_labels()).join(", ");
        if !unmapped.is_empty() {
            warn!(
                model_id = backend.model_id(),
                "Model labels without a sentiment mapping (will resolve to neutral): {}", unmapped
            );
        }
        let cache = NonZeroUsize::new(cache_capacity).map(|cap| Mutex::new(LruCache::new(cap)));
        SentimentClassifier {
            backend,
            labels,
            cache,
        }
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    fn invoke(&self, texts: &[String]) -> Result<Vec<Prediction>> {
        MODEL_INVOCATIONS_TOTAL.inc();
        let timer = BATCH_INFERENCE_DURATION_SECONDS.start_timer();
        let result = self.backend.predict_batch(texts);
        timer.observe_duration();
        result
    }

    fn resolve(&self, prediction: &Prediction) -> Sentiment {
        match self.labels.resolve(&prediction.label) {
            Some(sentiment) => sentiment,
            None => {
                warn!(label = %prediction.label, "Unmapped model label, using neutral");
                CLASSIFICATION_FALLBACKS_TOTAL.inc();
                Sentiment::Neutral
            }
        }
    }

    fn cached(&self, key: &str) -> Option<Sentiment> {
        let cache = self.cache.as_ref()?;
        let mut guard = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.get(key).copied()
    }

    fn remember(&self, key: String, sentiment: Sentiment) {
        if let Some(cache) = &self.cache {
            let mut guard = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.put(key, sentiment);
        }
    }

    /// Classifies one value. Null and blank text is `Neutral` without a model call;
    /// results are memoised by trimmed text.
    pub fn classify_one(&self, text: Option<&str>) -> Sentiment {
        let sentiment = self.classify_uncounted(text);
        RECORDS_CLASSIFIED_TOTAL.inc();
        sentiment
    }

    fn classify_uncounted(&self, text: Option<&str>) -> Sentiment {
        let trimmed = match text.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Sentiment::Neutral,
        };
        if let Some(hit) = self.cached(trimmed) {
            CLASSIFY_CACHE_HITS_TOTAL.inc();
            return hit;
        }

        let input = [trimmed.to_string()];
        match self.invoke(&input) {
            Ok(predictions) if predictions.len() == 1 => {
                let sentiment = self.resolve(&predictions[0]);
                self.remember(trimmed.to_string(), sentiment);
                sentiment
            }
            Ok(predictions) => {
                warn!(
                    returned = predictions.len(),
                    "Model returned an unexpected number of predictions, using neutral"
                );
                CLASSIFICATION_FALLBACKS_TOTAL.inc();
                Sentiment::Neutral
            }
            Err(e) => {
                warn!(error = %e, "Classification failed, using neutral");
                CLASSIFICATION_FALLBACKS_TOTAL.inc();
                Sentiment::Neutral
            }
        }
    }

    /// Classifies `values` in row order, sending non-blank values to the model in
    /// consecutive chunks of `batch_size` (one call per chunk).
    pub fn classify_texts(
        &self,
        values: &[Option<String>],
        batch_size: usize,
        progress: &ProgressBar,
    ) -> Result<Vec<Sentiment>> {
        if batch_size == 0 {
            return Err(PipelineError::ConfigError(
                "batch_size must be at least 1".to_string(),
            ));
        }

        let mut sentiments = vec![Sentiment::Neutral; values.len()];
        let pending: Vec<(usize, String)> = values
            .iter()
            .enumerate()
            .filter_map(|(row, value)| {
                let trimmed = value.as_deref()?.trim();
                (!trimmed.is_empty()).then(|| (row, trimmed.to_string()))
            })
            .collect();

        if let Some((row, first)) = pending.first() {
            debug!(row, input = %first, "First classification input");
        }
        progress.inc((values.len() - pending.len()) as u64);

        for chunk in pending.chunks(batch_size) {
            let texts: Vec<String> = chunk.iter().map(|(_, text)| text.clone()).collect();
            match self.invoke(&texts) {
                Ok(predictions) if predictions.len() == chunk.len() => {
                    for ((row, _), prediction) in chunk.iter().zip(&predictions) {
                        sentiments[*row] = self.resolve(prediction);
                    }
                }
                Ok(predictions) => {
                    warn!(
                        expected = chunk.len(),
                        returned = predictions.len(),
                        "Prediction count mismatch, batch resolved to neutral"
                    );
                    CLASSIFICATION_FALLBACKS_TOTAL.inc_by(chunk.len() as f64);
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        batch = chunk.len(),
                        first_row = chunk[0].0,
                        "Batch inference failed, batch resolved to neutral"
                    );
                    CLASSIFICATION_FALLBACKS_TOTAL.inc_by(chunk.len() as f64);
                }
            }
            progress.inc(chunk.len() as u64);
        }

        RECORDS_CLASSIFIED_TOTAL.inc_by(values.len() as f64);
        Ok(sentiments)
    }

    /// Adds `output_column` holding the configured label string of every row.
    pub fn classify_batch(
        &self,
        dataset: Dataset,
        text_column: &str,
        output_column: &str,
        batch_size: usize,
        progress: &ProgressBar,
    ) -> Result<Dataset> {
        let values = dataset.text_values(text_column)?;
        let sentiments = self.classify_texts(&values, batch_size, progress)?;
        let names = sentiments
            .into_iter()
            .map(|s| self.labels.name(s).to_string())
            .collect();
        dataset.with_text_column(output_column, names)
    }
}
