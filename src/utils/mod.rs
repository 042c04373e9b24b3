// Utils

pub mod logging;
pub mod progress;
pub mod prometheus_metrics;
pub mod stopwords;
pub mod text;

pub use text::{is_punctuation_token, split_into_words, split_word_punct, PUNCTUATION};
