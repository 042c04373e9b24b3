// Kept in its own test binary so no other test moves the global counters.

use std::sync::Arc;

use CommentBlaster::data_model::Sentiment;
use CommentBlaster::error::Result;
use CommentBlaster::pipeline::sentiment::{
    LabelMap, Prediction, SentimentBackend, SentimentClassifier,
};
use CommentBlaster::utils::prometheus_metrics::{
    CLASSIFY_CACHE_HITS_TOTAL, RECORDS_CLASSIFIED_TOTAL,
};

struct PositiveBackend;

impl SentimentBackend for PositiveBackend {
    fn model_id(&self) -> &str {
        "fixed/positive"
    }

    fn predict_batch(&self, texts: &[String]) -> Result<Vec<Prediction>> {
        Ok(texts
            .iter()
            .map(|_| Prediction {
                label: "LABEL_0".to_string(),
                score: 0.99,
            })
            .collect())
    }
}

#[test]
fn test_every_classified_record_is_counted() {
    let c = SentimentClassifier::new(Arc::new(PositiveBackend), LabelMap::default(), 8);
    let records_before = RECORDS_CLASSIFIED_TOTAL.get();
    let hits_before = CLASSIFY_CACHE_HITS_TOTAL.get();

    assert_eq!(c.classify_one(Some("bagus")), Sentiment::Positive);
    assert_eq!(c.classify_one(Some("bagus")), Sentiment::Positive); // cache hit
    assert_eq!(c.classify_one(Some("  ")), Sentiment::Neutral);

    assert_eq!(CLASSIFY_CACHE_HITS_TOTAL.get() - hits_before, 1.0);
    assert_eq!(RECORDS_CLASSIFIED_TOTAL.get() - records_before, 3.0);
}
