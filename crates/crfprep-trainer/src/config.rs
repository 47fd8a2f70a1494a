//! # Trainer Configuration
//!
//! Settings for one training/labeling setup. Loadable from JSON; every
//! field is optional in the file and falls back to its default.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crfprep_core::template::DEFAULT_UNIGRAM_SCOPE;
use crfprep_core::vocab::DEFAULT_FRONT_FEATURE;
use crfprep_core::Result;

/// Default external trainer/tagger executable.
pub const DEFAULT_PROGRAM: &str = "wapiti";

/// Configuration for [`CrfTrainer`](crate::CrfTrainer) and [`CliTagger`](crate::CliTagger).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Where the external trainer writes the model.
    pub model_path: PathBuf,
    /// External trainer/tagger executable.
    pub program: PathBuf,
    /// Extra arguments passed through to training mode.
    pub trainer_args: Vec<String>,
    /// Feature template that references features by name.
    pub feature_template: String,
    /// Scope for the generated unigram block, or `None` to skip it.
    pub unigram_scope: Option<String>,
    /// Feature names pinned to the lowest columns, in order.
    pub front_features: Vec<String>,
    /// Directory for temporary files; the system temp dir when unset.
    pub temp_dir: Option<PathBuf>,
    /// Delete temporary files after each run.
    pub unlink_temp: bool,
    /// Log external process output at info level instead of debug.
    pub verbose: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model.wapiti"),
            program: PathBuf::from(DEFAULT_PROGRAM),
            trainer_args: Vec::new(),
            feature_template: String::new(),
            unigram_scope: Some(DEFAULT_UNIGRAM_SCOPE.to_string()),
            front_features: vec![DEFAULT_FRONT_FEATURE.to_string()],
            temp_dir: None,
            unlink_temp: true,
            verbose: true,
        }
    }
}

impl TrainerConfig {
    /// Create a configuration that writes its model to `model_path`.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_trainer_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trainer_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.feature_template = template.into();
        self
    }

    /// Set the unigram block scope; `None` disables the block.
    pub fn with_unigram_scope(mut self, scope: Option<impl Into<String>>) -> Self {
        self.unigram_scope = scope.map(Into::into);
        self
    }

    pub fn with_front_features<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.front_features = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Keep (`false`) or delete (`true`) temporary files after each run.
    pub fn with_unlink_temp(mut self, unlink: bool) -> Self {
        self.unlink_temp = unlink;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
