// src/utils/prometheus_metrics.rs

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use prometheus::{register_counter, register_histogram, Counter, Encoder, Histogram, TextEncoder};
use tracing::info;

use crate::error::{PipelineError, Result};

// Metrics from the directory runner
pub static DATASETS_PROCESSED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "comment_blaster_datasets_processed_total",
        "Total number of dataset files written successfully."
    )
    .expect("Failed to register DATASETS_PROCESSED_TOTAL counter")
});

pub static DATASETS_FAILED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "comment_blaster_datasets_failed_total",
        "Total number of dataset files that failed to load, process or write."
    )
    .expect("Failed to register DATASETS_FAILED_TOTAL counter")
});

pub static DATASETS_SKIPPED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "comment_blaster_datasets_skipped_total",
        "Total number of directory entries skipped (not a supported dataset file)."
    )
    .expect("Failed to register DATASETS_SKIPPED_TOTAL counter")
});

// Metrics from stage 1
pub static RECORDS_NORMALIZED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "comment_blaster_records_normalized_total",
        "Total number of records passed through the text normalizer."
    )
    .expect("Failed to register RECORDS_NORMALIZED_TOTAL counter")
});

pub static TOKENIZER_FALLBACKS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "comment_blaster_tokenizer_fallbacks_total",
        "Total number of records tokenized by whitespace after a tokenizer error."
    )
    .expect("Failed to register TOKENIZER_FALLBACKS_TOTAL counter")
});

// Metrics from stage 2
pub static RECORDS_CLASSIFIED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "comment_blaster_records_classified_total",
        "Total number of records assigned a sentiment."
    )
    .expect("Failed to register RECORDS_CLASSIFIED_TOTAL counter")
});

pub static CLASSIFICATION_FALLBACKS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "comment_blaster_classification_fallbacks_total",
        "Total number of records resolved to neutral because inference failed or the label was unmapped."
    )
    .expect("Failed to register CLASSIFICATION_FALLBACKS_TOTAL counter")
});

pub static MODEL_INVOCATIONS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "comment_blaster_model_invocations_total",
        "Total number of calls made to the sentiment model."
    )
    .expect("Failed to register MODEL_INVOCATIONS_TOTAL counter")
});

pub static CLASSIFY_CACHE_HITS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "comment_blaster_classify_cache_hits_total",
        "Total number of single-text classifications answered from the cache."
    )
    .expect("Failed to register CLASSIFY_CACHE_HITS_TOTAL counter")
});

pub static BATCH_INFERENCE_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "comment_blaster_batch_inference_duration_seconds",
        "Histogram of sentiment model call latencies per batch."
    )
    .expect("Failed to register BATCH_INFERENCE_DURATION_SECONDS histogram")
});

/// Renders the default registry in the Prometheus text format.
pub fn gather_metrics_text() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| PipelineError::Unexpected(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| PipelineError::Unexpected(format!("Metrics output is not UTF-8: {}", e)))
}

/// Writes the current metrics to `path` for a textfile collector to pick up.
pub fn write_metrics_file(path: &Path) -> Result<()> {
    let text = gather_metrics_text()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    info!("Metrics written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_file_contains_registered_counters() {
        MODEL_INVOCATIONS_TOTAL.inc();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("metrics.prom");
        write_metrics_file(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("comment_blaster_model_invocations_total"));
    }
}
