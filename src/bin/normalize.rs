// src/bin/normalize.rs

//! # normalize-all
//!
//! Stage 1 of the CommentBlaster pipeline. Reads every CSV/Parquet dataset in
//! the raw directory, normalises the comment column (cleaning, tokenisation,
//! stopword removal) into a derived column, and writes each dataset under the
//! same file name to the processed directory.
//!
//! Exit codes: 0 on success, 1 when a file failed, 2 on a configuration error.

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use indicatif::HumanDuration;
use tracing::{error, info};
use CommentBlaster::config::normalize::Args;
use CommentBlaster::error::Result;
use CommentBlaster::executor::{DatasetStep, PipelineExecutor};
use CommentBlaster::pipeline::normalize::NormalizeStep;
use CommentBlaster::runner::{DirectoryRunner, RunSummary};
use CommentBlaster::utils::logging::init_tracing;
use CommentBlaster::utils::prometheus_metrics::write_metrics_file;

fn run(args: &Args) -> Result<Option<RunSummary>> {
    let config = args.resolve_config()?;
    let step = NormalizeStep::new(&config.normalize)?;
    if args.validate_config {
        info!(
            stopwords = step.normalizer().stopwords().len(),
            "Configuration is valid"
        );
        return Ok(None);
    }

    let params = &config.normalize;
    info!(
        input_dir = %params.input_dir.display(),
        output_dir = %params.output_dir.display(),
        text_column = %params.text_column,
        output_column = %params.output_column,
        concatenate = params.concatenate,
        policy = ?params.policy,
        tokenizer = ?params.tokenizer,
        "Starting text normalisation"
    );

    let steps: Vec<Box<dyn DatasetStep>> = vec![Box::new(step)];
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
                "Normalisation finished in {}",
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
            error!(root_cause = %e.root_cause(), "Normalisation failed: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
