pub mod normalize_step;
pub mod stopword_set;
pub mod text_normalizer;

pub use normalize_step::NormalizeStep;
pub use stopword_set::build_stopword_set;
pub use text_normalizer::TextNormalizer;
