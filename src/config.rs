// Configuration: YAML pipeline settings shared by both stages, plus per-binary CLI args.

pub mod classify;
pub mod normalize;
pub mod pipeline;
pub mod tabular;

pub use pipeline::{load_pipeline_config, PipelineConfig};
pub use tabular::{CsvOptions, TabularOptions};
