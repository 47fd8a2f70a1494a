pub mod encoder;
pub mod vocabulary;

pub use encoder::SequenceEncoder;
pub use vocabulary::{VocabVersion, Vocabulary, DEFAULT_FRONT_FEATURE};
