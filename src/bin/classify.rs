// src/bin/classify.rs

//! # classify-all
//!
//! Stage 2 of the CommentBlaster pipeline. Loads the sentiment model once,
//! then reads every normalised dataset from the processed directory, labels
//! the normalised text column in fixed-size batches, and writes each dataset
//! under the same file name to the analyzed directory.
//!
//! Exit codes: 0 on success, 1 when a file failed, 2 on a configuration error,
//! 3 when the model cannot be loaded.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use indicatif::HumanDuration;
use tracing::{error, info};
use CommentBlaster::config::classify::Args;
use CommentBlaster::error::Result;
use CommentBlaster::executor::{DatasetStep, PipelineExecutor};
use CommentBlaster::pipeline::sentiment::{
    InferenceApiBackend, LabelMap, SentimentClassifier, SentimentStep,
};
use CommentBlaster::runner::{DirectoryRunner, RunSummary};
use CommentBlaster::utils::logging::init_tracing;
use CommentBlaster::utils::prometheus_metrics::write_metrics_file;

fn run(args: &Args) -> Result<Option<RunSummary>> {
    let config = args.resolve_config()?;
    let params = &config.classify;
    let labels = LabelMap::from_params(params)?;
    if args.validate_config {
        info!(model_id = %params.model.model_id, "Configuration is valid");
        return Ok(None);
    }

    info!(
        input_dir = %params.input_dir.display(),
        output_dir = %params.output_dir.display(),
        text_column = %params.text_column,
        output_column = %params.output_column,
        batch_size = params.batch_size,
        model_id = %params.model.model_id,
        "Starting sentiment classification"
    );

    let backend = InferenceApiBackend::load(&params.model)?;
    let classifier = SentimentClassifier::new(Arc::new(backend), labels, params.cache_capacity);
    let steps: Vec<Box<dyn DatasetStep>> = vec![Box::new(SentimentStep::new(classifier, params))];
    let executor = PipelineExecutor::new(steps);
    let runner = DirectoryRunner::new(&params.input_dir, &params.output_dir, config.runner.clone());
    runner.run(&executor).map(Some)
}

fn main() -> ExitCode {
    let args = Args::parse();
    let _log_guard = match init_tracing(args.log_format, args.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialise logging: {}", e);
            return ExitCode::from(1);
        }
    };

    let start = Instant::now();
    let outcome = run(&args);

    if let Some(path) = &args.metrics_file {
        if let Err(e) = write_metrics_file(path) {
            error!(error = %e, "Failed to write metrics file");
        }
    }

    match outcome {
        Ok(None) => ExitCode::SUCCESS,
        Ok(Some(summary)) => {
            info!(
                processed = summary.processed,
                skipped = summary.skipped,
                failed = summary.failed.len(),
                records = summary.records,
                "Classification finished in {}",
                HumanDuration(start.elapsed())
            );
            if summary.is_success() {
                ExitCode::SUCCESS
            } else {
                for failed in &summary.failed {
                    error!(path = %failed.path.display(), "Skipped after error: {}", failed.error);
                }
                ExitCode::from(1)
            }
        }
        Err(e) => {
            error!(root_cause = %e.root_cause(), "Classification failed: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
