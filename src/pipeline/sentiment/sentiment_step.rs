use indicatif::ProgressBar;
use tracing::{info, instrument};

use crate::config::pipeline::ClassifyParams;
use crate::data_model::Dataset;
use crate::error::Result;
use crate::executor::DatasetStep;
use crate::pipeline::sentiment::classifier::SentimentClassifier;
use crate::utils::progress::{create_progress_bar, RECORDS_TEMPLATE};

/// Stage 2: adds the sentiment label of `text_column` as `output_column`.
pub struct SentimentStep {
    classifier: SentimentClassifier,
    text_column: String,
    output_column: String,
    batch_size: usize,
    show_progress: bool,
}

impl SentimentStep {
    pub fn new(classifier: SentimentClassifier, params: &ClassifyParams) -> Self {
        SentimentStep {
            classifier,
            text_column: params.text_column.clone(),
            output_column: params.output_column.clone(),
            batch_size: params.batch_size,
            show_progress: true,
        }
    }

    /// Disables the per-dataset record progress bar.
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn classifier(&self) -> &SentimentClassifier {
        &self.classifier
    }
}

impl DatasetStep for SentimentStep {
    fn name(&self) -> &'static str {
        "SentimentStep"
    }

    #[instrument(skip_all, fields(dataset = %dataset.name(), rows = dataset.num_rows()))]
    fn process(&self, dataset: Dataset) -> Result<Dataset> {
        let progress = if self.show_progress {
            create_progress_bar(dataset.num_rows() as u64, dataset.name(), RECORDS_TEMPLATE)
        } else {
            ProgressBar::hidden()
        };
        let out = self.classifier.classify_batch(
            dataset,
            &self.text_column,
            &self.output_column,
            self.batch_size,
            &progress,
        )?;
        progress.finish_and_clear();
        info!(rows = out.num_rows(), "Sentiment labels assigned");
        Ok(out)
    }
}
