use thiserror::Error;

use crate::vocab::VocabVersion;

/// Errors that can occur while preparing CRF training data and templates.
#[derive(Debug, Error)]
pub enum CrfPrepError {
    /// A template macro references a feature the vocabulary has never seen.
    #[error("unknown feature name {name:?}{}", line_suffix(.line))]
    UnknownFeature {
        /// The unresolved feature name.
        name: String,
        /// 1-based template line number, when raised by the template compiler.
        line: Option<usize>,
    },

    /// Inconsistent or invalid arguments. Raised before any file is written.
    #[error("usage error: {0}")]
    Usage(String),

    /// The tagger returned a different number of labels than tokens were sent.
    #[error("label alignment error: expected {expected} labels, got {actual}")]
    Alignment {
        /// Number of tokens fed to the tagger.
        expected: usize,
        /// Number of labels extracted from its output.
        actual: usize,
    },

    /// The external trainer or tagger could not be launched or exited non-zero.
    #[error("external command `{command}` failed (exit code {code:?}): {output}")]
    ExternalProcess {
        /// The command line that was run.
        command: String,
        /// Exit code, if the process ran at all.
        code: Option<i32>,
        /// Captured stdout and stderr, or the launch error.
        output: String,
    },

    /// An encoded sequence or compiled template belongs to another vocabulary version.
    #[error("stale artifact: built against vocabulary {found}, current is {expected}")]
    StaleVocabulary {
        /// Version of the vocabulary in use.
        expected: VocabVersion,
        /// Version recorded on the artifact.
        found: VocabVersion,
    },

    /// A regex pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|l| format!(" on template line {l}"))
        .unwrap_or_default()
}

/// Result type alias for crfprep operations.
pub type Result<T> = std::result::Result<T, CrfPrepError>;
