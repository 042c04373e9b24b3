use tracing::{debug, instrument};

use crate::config::pipeline::NormalizeParams;
use crate::data_model::Dataset;
use crate::error::Result;
use crate::executor::DatasetStep;
use crate::pipeline::normalize::TextNormalizer;
use crate::utils::prometheus_metrics::RECORDS_NORMALIZED_TOTAL;

const SAMPLE_ROWS: usize = 5;

/// Stage 1: adds the normalised form of `text_column` as `output_column`.
pub struct NormalizeStep {
    normalizer: TextNormalizer,
    text_column: String,
    output_column: String,
    concatenate: bool,
}

impl NormalizeStep {
    pub fn new(params: &NormalizeParams) -> Result<Self> {
        Ok(NormalizeStep {
            normalizer: TextNormalizer::new(params)?,
            text_column: params.text_column.clone(),
            output_column: params.output_column.clone(),
            concatenate: params.concatenate,
        })
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }
}

impl DatasetStep for NormalizeStep {
    fn name(&self) -> &'static str {
        "NormalizeStep"
    }

    #[instrument(skip_all, fields(dataset = %dataset.name()))]
    fn process(&self, dataset: Dataset) -> Result<Dataset> {
        let raw = dataset.text_values(&self.text_column)?;

        let cells = raw
            .iter()
            .map(|value| {
                self.normalizer
                    .normalize(value.as_deref(), self.concatenate)
                    .to_cell()
            })
            .collect::<Result<Vec<String>>>()?;
        RECORDS_NORMALIZED_TOTAL.inc_by(cells.len() as f64);

        for (original, normalized) in raw.iter().zip(&cells).take(SAMPLE_ROWS) {
            debug!(
                original = original.as_deref().unwrap_or("<null>"),
                normalized = normalized.as_str(),
                "Sample row"
            );
        }

        dataset.with_text_column(&self.output_column, cells)
    }
}
