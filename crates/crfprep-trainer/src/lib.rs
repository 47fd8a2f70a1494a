//! # crfprep Trainer
//!
//! Drives an external column-based CRF trainer (Wapiti by default): fits
//! the feature vocabulary, writes data and template files, runs training
//! and development checks, and labels new documents with a trained model.
pub mod artifacts;
pub mod config;
pub mod data;
pub mod runner;
pub mod tagger;
pub mod trainer;

pub use artifacts::TempArtifacts;
pub use config::TrainerConfig;
pub use data::{load_records, SequenceRecord};
pub use runner::{CommandOutput, CommandRunner, ProcessRunner};
pub use tagger::{Chunker, CliTagger, Tagger};
pub use trainer::CrfTrainer;
