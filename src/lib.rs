#![allow(non_snake_case)]

// Library behind the `normalize-all` and `classify-all` binaries.
pub mod config;
pub mod data_model;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod runner;
pub mod utils;

pub use data_model::{Dataset, NormalizedText, Sentiment};
pub use error::{PipelineError, Result};
pub use executor::{DatasetStep, PipelineExecutor};
pub use runner::{DirectoryRunner, RunSummary};
