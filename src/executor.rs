use crate::data_model::Dataset;
use crate::error::{PipelineError, Result};
use tracing::{debug, warn};

/// A transformation applied to a whole dataset (one tabular file).
pub trait DatasetStep: Send + Sync {
    fn name(&self) -> &'static str; // For logging/error reporting

    fn process(&self, dataset: Dataset) -> Result<Dataset>;
}

pub struct PipelineExecutor {
    pub(crate) steps: Vec<Box<dyn DatasetStep>>, // Holds the ordered steps
}

impl PipelineExecutor {
    pub fn new(steps: Vec<Box<dyn DatasetStep>>) -> Self {
        if steps.is_empty() {
            warn!("Pipeline created with no steps.");
        }
        PipelineExecutor { steps }
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Runs every step in order, stopping at the first failure.
    pub fn run(&self, initial: Dataset) -> Result<Dataset> {
        let mut current = initial;
        for step in &self.steps {
            debug!(dataset = current.name(), "Running step: {}", step.name());
            current = step
                .process(current)
                .map_err(|e| PipelineError::StepError {
                    step_name: step.name().to_string(),
                    source: Box::new(e),
                })?;
        }
        Ok(current)
    }
}
