//! # crfprep
//!
//! Feature preparation and training orchestration for column-based CRF
//! trainers. Re-exports the vocabulary, encoder and template compiler from
//! `crfprep-core` and the trainer and tagger drivers from `crfprep-trainer`.
//!
//! ```rust,no_run
//! use crfprep::{CrfTrainer, LabeledSequence, TrainerConfig};
//! use crfprep::types::{observation, FeatureValue};
//!
//! let train = vec![LabeledSequence::new(
//!     vec![observation([("token", FeatureValue::from("Tokyo"))])],
//!     vec!["B-LOC".into()],
//! )];
//!
//! let config = TrainerConfig::new("ner.model").with_template("*:w=%x[0,token]");
//! let mut trainer = CrfTrainer::new(config)?;
//! trainer.fit(&train, None, None)?;
//! # Ok::<(), crfprep::CrfPrepError>(())
//! ```
pub use crfprep_core::*;
pub use crfprep_trainer::{
    load_records, Chunker, CliTagger, CommandOutput, CommandRunner, CrfTrainer, ProcessRunner,
    SequenceRecord, Tagger, TempArtifacts, TrainerConfig,
};

/// Trainer-side modules, under their own names.
pub mod trainer {
    pub use crfprep_trainer::{artifacts, config, data, runner, tagger};
}
