pub mod sequence;
pub mod value;

pub use sequence::{CompiledTemplate, EncodedSequence, ExtractedDocument, LabeledSequence};
pub use value::{observation, FeatureValue, Observation, MISSING_PLACEHOLDER};
