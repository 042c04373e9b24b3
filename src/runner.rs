// src/runner.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use indicatif::ProgressBar;
use tracing::{debug, error, info, instrument, warn};

use crate::config::pipeline::{FailurePolicy, RunnerParams};
use crate::error::{PipelineError, Result};
use crate::executor::PipelineExecutor;
use crate::pipeline::format::{read_dataset, write_dataset};
use crate::utils::progress::{create_progress_bar, FILES_TEMPLATE};
use crate::utils::prometheus_metrics::{
    DATASETS_FAILED_TOTAL, DATASETS_PROCESSED_TOTAL, DATASETS_SKIPPED_TOTAL,
};

/// A file that failed under the `skip` policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: Vec<FailedFile>,
    /// Rows written across all processed files
    pub records: usize,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Applies a pipeline to every dataset file of a directory, writing each
/// result under the same file name in the output directory.
pub struct DirectoryRunner {
    input_dir: PathBuf,
    output_dir: PathBuf,
    params: RunnerParams,
    show_progress: bool,
}

impl DirectoryRunner {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        params: RunnerParams,
    ) -> Self {
        DirectoryRunner {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            params,
            show_progress: true,
        }
    }

    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(true, |n| n.starts_with('.'));
        if hidden || !path.is_file() {
            return false;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self
                .params
                .extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext)),
            None => false,
        }
    }

    /// Input entries in sorted name order.
    fn list_entries(&self) -> Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(&self.input_dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();
        Ok(entries)
    }

    fn process_file(&self, path: &Path, executor: &PipelineExecutor) -> Result<usize> {
        let start = Instant::now();
        let dataset = read_dataset(path, &self.params.tabular)?;
        debug!(
            path = %path.display(),
            rows = dataset.num_rows(),
            columns = dataset.schema().fields().len(),
            "Loaded dataset"
        );

        let output = executor.run(dataset)?;

        let file_name = path.file_name().ok_or_else(|| {
            PipelineError::Unexpected(format!("'{}' has no file name", path.display()))
        })?;
        let target = self.output_dir.join(file_name);
        write_dataset(&output, &target, &self.params.tabular)?;

        info!(
            input = %path.display(),
            output = %target.display(),
            rows = output.num_rows(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Dataset written"
        );
        Ok(output.num_rows())
    }

    #[instrument(skip_all, fields(input = %self.input_dir.display(), output = %self.output_dir.display()))]
    pub fn run(&self, executor: &PipelineExecutor) -> Result<RunSummary> {
        let entries = self.list_entries()?;
        fs::create_dir_all(&self.output_dir)?;
        if fs::canonicalize(&self.input_dir)? == fs::canonicalize(&self.output_dir)? {
            return Err(PipelineError::ConfigError(format!(
                "Input and output directory are the same ('{}'); datasets are never rewritten in place",
                self.input_dir.display()
            )));
        }

        let (files, skipped): (Vec<PathBuf>, Vec<PathBuf>) =
            entries.into_iter().partition(|p| self.accepts(p));
        for path in &skipped {
            info!(path = %path.display(), "Skipping entry (not a supported dataset file)");
            DATASETS_SKIPPED_TOTAL.inc();
        }
        if files.is_empty() {
            warn!("No dataset files found in {}", self.input_dir.display());
        }

        let progress = if self.show_progress {
            create_progress_bar(files.len() as u64, "Processing files", FILES_TEMPLATE)
        } else {
            ProgressBar::hidden()
        };

        let mut summary = RunSummary {
            skipped: skipped.len(),
            ..RunSummary::default()
        };

        for path in &files {
            progress.set_message(format!("{}", path.display()));
            match self.process_file(path, executor) {
                Ok(rows) => {
                    summary.processed += 1;
                    summary.records += rows;
                    DATASETS_PROCESSED_TOTAL.inc();
                }
                Err(e) => {
                    DATASETS_FAILED_TOTAL.inc();
                    error!(path = %path.display(), error = %e, "Failed to process dataset");
                    match self.params.on_error {
                        FailurePolicy::FailFast => {
                            progress.abandon();
                            return Err(PipelineError::FileError {
                                path: path.display().to_string(),
                                source: Box::new(e),
                            });
                        }
                        FailurePolicy::Skip => summary.failed.push(FailedFile {
                            path: path.clone(),
                            error: e.to_string(),
                        }),
                    }
                }
            }
            progress.inc(1);
        }
        progress.finish_with_message("Done");

        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed.len(),
            records = summary.records,
            "Directory run finished"
        );
        Ok(summary)
    }
}
