//! # crfprep Core
//!
//! Format and vocabulary translation for column-based CRF trainers such as
//! Wapiti. Assigns feature names stable columns, serializes per-token
//! feature dictionaries into trainer rows, and compiles feature templates
//! that reference features by name into positional macros.
//!
//! ## Quick Start
//!
//! ```rust
//! use crfprep_core::template::prepare_template;
//! use crfprep_core::types::{observation, FeatureValue};
//! use crfprep_core::vocab::{SequenceEncoder, Vocabulary};
//!
//! let seq = vec![
//!     observation([("token", FeatureValue::from("the")), ("tag", "DT".into())]),
//!     observation([("token", FeatureValue::from("dog")), ("tag", "NN".into())]),
//! ];
//!
//! let mut vocab = Vocabulary::new(["token", "tag"]);
//! vocab.fit([&seq]);
//!
//! let rows = SequenceEncoder::new(&vocab).encode_sequence(&seq);
//! assert_eq!(rows.rows(), ["the DT", "dog NN"]);
//!
//! let template = prepare_template("*:Pos-1 L=%x[-1, tag]", &vocab).unwrap();
//! assert_eq!(template, "*:Pos-1 L=%x[-1,1]");
//! ```
pub mod align;
pub mod error;
pub mod template;
pub mod types;
pub mod vocab;

// Re-export primary API
pub use align::{align, extract_labels, ContiguousGrouper, LabelGrouper, Span};
pub use error::{CrfPrepError, Result};
pub use template::{prepare_template, unigram_template, TemplateCompiler};
pub use types::{
    CompiledTemplate, EncodedSequence, ExtractedDocument, FeatureValue, LabeledSequence,
    Observation,
};
pub use vocab::{SequenceEncoder, VocabVersion, Vocabulary};
