//! # Tagging with a Trained Model
//!
//! Sends encoded rows to the external tagger and realigns its label column
//! with the original tokens.

use std::ffi::OsString;
use std::path::PathBuf;

use tracing::debug;

use crfprep_core::align::{align, extract_labels, LabelGrouper, Span};
use crfprep_core::types::{EncodedSequence, ExtractedDocument};
use crfprep_core::{CrfPrepError, Result, SequenceEncoder, Vocabulary};

use crate::artifacts::TempArtifacts;
use crate::config::TrainerConfig;
use crate::runner::{CommandRunner, ProcessRunner};

/// Labels a newline-joined block of unlabeled rows.
///
/// The returned text has one line per input row whose last field is the
/// predicted label; blank lines separate sequences.
pub trait Tagger {
    fn label_sequence(&self, rows: &str) -> Result<String>;
}

/// [`Tagger`] that runs the external tagger's `label` mode on a model file.
pub struct CliTagger<R: CommandRunner = ProcessRunner> {
    program: PathBuf,
    model_path: PathBuf,
    temp_dir: Option<PathBuf>,
    unlink: bool,
    runner: R,
}

impl CliTagger<ProcessRunner> {
    /// Tagger for the model and executable named in a trainer config.
    ///
    /// Temporary input files follow the config's `temp_dir` and `unlink_temp`.
    pub fn from_config(config: &TrainerConfig) -> Self {
        Self::with_runner_from_config(config, ProcessRunner::new(config.verbose))
    }
}

impl<R: CommandRunner> CliTagger<R> {
    pub fn with_runner(
        program: impl Into<PathBuf>,
        model_path: impl Into<PathBuf>,
        runner: R,
    ) -> Self {
        Self {
            program: program.into(),
            model_path: model_path.into(),
            temp_dir: None,
            unlink: true,
            runner,
        }
    }

    pub fn with_runner_from_config(config: &TrainerConfig, runner: R) -> Self {
        let mut tagger = Self::with_runner(&config.program, &config.model_path, runner);
        tagger.temp_dir = config.temp_dir.clone();
        tagger.unlink = config.unlink_temp;
        tagger
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }
}

impl<R: CommandRunner> Tagger for CliTagger<R> {
    fn label_sequence(&self, rows: &str) -> Result<String> {
        let mut artifacts = TempArtifacts::new(self.temp_dir.clone(), self.unlink);
        let input = artifacts.create("crf-input-", rows.as_bytes())?;

        let args: Vec<OsString> = vec![
            "label".into(),
            "-m".into(),
            self.model_path.as_os_str().to_owned(),
            input.into(),
        ];
        Ok(self.runner.run(&self.program, &args)?.stdout)
    }
}

/// Tags documents and returns tokens paired with predicted labels.
pub struct Chunker<T: Tagger> {
    tagger: T,
    vocab: Vocabulary,
}

impl<T: Tagger> Chunker<T> {
    /// `vocab` must be the vocabulary the model was trained with.
    pub fn new(tagger: T, vocab: Vocabulary) -> Self {
        Self { tagger, vocab }
    }

    /// Tag one document and pair every token with its label.
    ///
    /// # Errors
    ///
    /// Returns `CrfPrepError::Alignment` if the tagger output does not hold
    /// exactly one label per token.
    pub fn label(&self, doc: &ExtractedDocument) -> Result<Vec<(String, String)>> {
        let encoded = SequenceEncoder::new(&self.vocab).encode_sequence(&doc.features);
        self.label_encoded(&doc.token_texts(), &encoded)
    }

    /// Tag rows the caller already encoded and pair them with `tokens`.
    ///
    /// # Errors
    ///
    /// - `CrfPrepError::StaleVocabulary` if `encoded` was built against a
    ///   different vocabulary version than this chunker holds.
    /// - `CrfPrepError::Usage` if `tokens` and `encoded` differ in length.
    /// - `CrfPrepError::Alignment` as for [`Chunker::label`].
    pub fn label_encoded<S: AsRef<str>>(
        &self,
        tokens: &[S],
        encoded: &EncodedSequence,
    ) -> Result<Vec<(String, String)>> {
        self.vocab.ensure_current(encoded.version())?;
        if tokens.len() != encoded.len() {
            return Err(CrfPrepError::Usage(format!(
                "document has {} tokens but {} feature observations",
                tokens.len(),
                encoded.len()
            )));
        }
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let output = self.tagger.label_sequence(&encoded.to_input_block())?;
        let labels = extract_labels(&output, tokens.len())?;
        debug!(tokens = tokens.len(), "labeled document");

        align(tokens, &labels)
    }

    /// Tag one document and group the labeled tokens into spans.
    pub fn chunk<G: LabelGrouper>(&self, doc: &ExtractedDocument, grouper: &G) -> Result<Vec<Span>> {
        Ok(grouper.group(&self.label(doc)?))
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }
}
