//! Training orchestration for an external CRF trainer.

use std::ffi::OsString;
use std::path::Path;

use tracing::info;

use crfprep_core::types::{LabeledSequence, Observation};
use crfprep_core::{unigram_template, CrfPrepError, Result, TemplateCompiler, Vocabulary};

use crate::artifacts::TempArtifacts;
use crate::config::TrainerConfig;
use crate::data::{format_training_data, Dataset};
use crate::runner::{CommandRunner, ProcessRunner};

/// Fits a vocabulary, writes trainer input files and runs the external trainer.
pub struct CrfTrainer<R: CommandRunner = ProcessRunner> {
    config: TrainerConfig,
    vocab: Vocabulary,
    compiler: TemplateCompiler,
    runner: R,
}

impl CrfTrainer<ProcessRunner> {
    /// Create a trainer that runs `config.program` as a child process.
    pub fn new(config: TrainerConfig) -> Result<Self> {
        let runner = ProcessRunner::new(config.verbose);
        Self::with_runner(config, runner)
    }
}

impl<R: CommandRunner> CrfTrainer<R> {
    /// Create a trainer with a custom command runner.
    pub fn with_runner(config: TrainerConfig, runner: R) -> Result<Self> {
        Ok(Self {
            vocab: Vocabulary::new(config.front_features.iter().cloned()),
            compiler: TemplateCompiler::new()?,
            config,
            runner,
        })
    }

    /// Train a model from labeled sequences.
    ///
    /// `dev` is passed to the trainer for early stopping and then scored in
    /// check mode; the check report goes to `out_dev`, or to a temporary
    /// file when `out_dev` is `None`.
    ///
    /// # Errors
    ///
    /// - `CrfPrepError::Usage` if `out_dev` is given without `dev`, or a
    ///   sequence has a different number of labels than tokens. Nothing is
    ///   written in that case.
    /// - `CrfPrepError::UnknownFeature` if the template names a feature the
    ///   training data never contains.
    /// - `CrfPrepError::ExternalProcess` if the trainer fails.
    pub fn fit(
        &mut self,
        train: &[LabeledSequence],
        dev: Option<&[LabeledSequence]>,
        out_dev: Option<&Path>,
    ) -> Result<()> {
        if out_dev.is_some() && dev.is_none() {
            return Err(CrfPrepError::Usage(
                "an output path for development data requires development data".into(),
            ));
        }
        self.run(
            Dataset::from_sequences(train),
            dev.map(Dataset::from_sequences),
            out_dev,
        )
    }

    /// Train a model from parallel feature and label sequences.
    ///
    /// Development data must be given as both `x_dev` and `y_dev` or not at all.
    pub fn fit_parts<X, Y>(
        &mut self,
        x: &[X],
        y: &[Y],
        x_dev: Option<&[X]>,
        y_dev: Option<&[Y]>,
        out_dev: Option<&Path>,
    ) -> Result<()>
    where
        X: AsRef<[Observation]>,
        Y: AsRef<[String]>,
    {
        let dev = match (x_dev, y_dev) {
            (Some(xd), Some(yd)) => Some(Dataset::from_parts(xd, yd)?),
            (None, None) if out_dev.is_none() => None,
            _ => {
                return Err(CrfPrepError::Usage(
                    "pass both x_dev and y_dev to use development data".into(),
                ));
            }
        };
        self.run(Dataset::from_parts(x, y)?, dev, out_dev)
    }

    fn run(
        &mut self,
        train: Dataset<'_>,
        dev: Option<Dataset<'_>>,
        out_dev: Option<&Path>,
    ) -> Result<()> {
        self.vocab.reset();
        self.vocab.fit(train.features.iter().copied());

        // Everything that can fail on bad input is rendered before any file exists.
        let train_text = format_training_data(&self.vocab, &train)?;
        let dev_text = dev
            .as_ref()
            .map(|d| format_training_data(&self.vocab, d))
            .transpose()?;
        let template_text = self.template_file_contents()?;

        info!(
            sequences = train.len(),
            tokens = train.token_count(),
            features = self.vocab.len(),
            "training model"
        );

        let mut artifacts =
            TempArtifacts::new(self.config.temp_dir.clone(), self.config.unlink_temp);
        let train_path = artifacts.create("crf-data-", train_text.as_bytes())?;
        let dev_path = match &dev_text {
            Some(text) => Some(artifacts.create("crf-data-", text.as_bytes())?),
            None => None,
        };
        let template_path = artifacts.create("crf-template-", template_text.as_bytes())?;

        let mut args: Vec<OsString> = vec!["train".into(), "--pattern".into(), template_path.into()];
        args.extend(self.config.trainer_args.iter().map(OsString::from));
        if let Some(dev_path) = &dev_path {
            args.push("--devel".into());
            args.push(dev_path.into());
        }
        args.push(train_path.into());
        args.push(self.config.model_path.as_os_str().to_owned());
        self.runner.run(&self.config.program, &args)?;

        if let Some(dev_path) = dev_path {
            let out_dev = match out_dev {
                Some(path) => path.to_path_buf(),
                None => artifacts.reserve("crf-dev-out-")?,
            };
            info!(report = %out_dev.display(), "checking model on development data");
            let args: Vec<OsString> = vec![
                "label".into(),
                "-m".into(),
                self.config.model_path.as_os_str().to_owned(),
                "--check".into(),
                dev_path.into(),
                out_dev.into(),
            ];
            self.runner.run(&self.config.program, &args)?;
        }

        Ok(())
    }

    /// Compiled user template, followed by the unigram block when enabled.
    fn template_file_contents(&self) -> Result<String> {
        let compiled = self
            .compiler
            .compile(&self.config.feature_template, &self.vocab)?;
        let mut text = compiled.into_string();

        if let Some(scope) = &self.config.unigram_scope {
            let unigrams = unigram_template(&self.vocab, scope);
            text.push('\n');
            text.push_str(unigrams.as_str());
        }

        Ok(text)
    }

    /// The vocabulary fitted by the last training run.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn into_vocabulary(self) -> Vocabulary {
        self.vocab
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }
}
