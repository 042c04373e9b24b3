pub mod backend;
pub mod classifier;
pub mod inference_api;
pub mod labels;
pub mod sentiment_step;

pub use backend::{Prediction, SentimentBackend};
pub use classifier::SentimentClassifier;
pub use inference_api::InferenceApiBackend;
pub use labels::LabelMap;
pub use sentiment_step::SentimentStep;
