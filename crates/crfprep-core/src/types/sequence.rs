use serde::{Deserialize, Serialize};

use super::value::Observation;
use crate::error::{CrfPrepError, Result};
use crate::vocab::VocabVersion;

/// Rows of one sequence, serialized against a specific vocabulary version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSequence {
    rows: Vec<String>,
    version: VocabVersion,
}

impl EncodedSequence {
    pub(crate) fn new(rows: Vec<String>, version: VocabVersion) -> Self {
        Self { rows, version }
    }

    /// One space-separated row per token, in token order.
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Version of the vocabulary these rows were encoded with.
    pub fn version(&self) -> VocabVersion {
        self.version
    }

    /// Appends one gold label per row and joins the rows with newlines.
    ///
    /// # Errors
    ///
    /// Returns `CrfPrepError::Usage` if the label count differs from the row
    /// count, or if a label is empty or contains whitespace.
    pub fn to_training_block<S: AsRef<str>>(&self, labels: &[S]) -> Result<String> {
        if labels.len() != self.rows.len() {
            return Err(CrfPrepError::Usage(format!(
                "sequence has {} tokens but {} labels",
                self.rows.len(),
                labels.len()
            )));
        }

        let mut lines = Vec::with_capacity(self.rows.len());
        for (row, label) in self.rows.iter().zip(labels) {
            let label = label.as_ref();
            validate_label(label)?;
            lines.push(format!("{row} {label}"));
        }
        Ok(lines.join("\n"))
    }

    /// Joins the unlabeled rows with newlines, ready to feed to a tagger.
    pub fn to_input_block(&self) -> String {
        self.rows.join("\n")
    }
}

fn validate_label(label: &str) -> Result<()> {
    if label.is_empty() || label.chars().any(char::is_whitespace) {
        return Err(CrfPrepError::Usage(format!(
            "label {label:?} must be non-empty and contain no whitespace"
        )));
    }
    Ok(())
}

/// A template whose macro columns have been resolved against a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
    text: String,
    version: VocabVersion,
}

impl CompiledTemplate {
    pub(crate) fn new(text: String, version: VocabVersion) -> Self {
        Self { text, version }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Version of the vocabulary the columns were resolved with.
    pub fn version(&self) -> VocabVersion {
        self.version
    }
}

/// One sequence of observations with its gold labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabeledSequence {
    pub features: Vec<Observation>,
    pub labels: Vec<String>,
}

impl LabeledSequence {
    pub fn new(features: Vec<Observation>, labels: Vec<String>) -> Self {
        Self { features, labels }
    }
}

/// Output of the upstream feature extractor for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Per-token feature observations, in token order.
    pub features: Vec<Observation>,
    /// Raw token texts. When empty, the `token` feature of each observation is used.
    #[serde(default)]
    pub tokens: Vec<String>,
}

impl ExtractedDocument {
    pub fn new(features: Vec<Observation>, tokens: Vec<String>) -> Self {
        Self { features, tokens }
    }

    /// Raw tokens for this document, one per observation.
    pub fn token_texts(&self) -> Vec<String> {
        if !self.tokens.is_empty() {
            return self.tokens.clone();
        }
        self.features
            .iter()
            .map(|obs| {
                obs.get("token")
                    .map(|v| v.as_str().map_or_else(|| v.to_column(), str::to_string))
                    .unwrap_or_default()
            })
            .collect()
    }
}
