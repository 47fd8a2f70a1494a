//! Data loading and trainer data-file formatting.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crfprep_core::types::{ExtractedDocument, LabeledSequence, Observation};
use crfprep_core::{CrfPrepError, Result, SequenceEncoder, Vocabulary};

/// One JSON Lines record: a sequence of observations with optional labels
/// and raw tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub features: Vec<Observation>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub tokens: Vec<String>,
}

impl SequenceRecord {
    pub fn into_labeled(self) -> LabeledSequence {
        LabeledSequence::new(self.features, self.labels)
    }

    pub fn into_document(self) -> ExtractedDocument {
        ExtractedDocument::new(self.features, self.tokens)
    }
}

/// Load sequence records from a JSON Lines file.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<SequenceRecord>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        records.push(serde_json::from_str(line)?);
    }

    Ok(records)
}

/// Parallel observation and label sequences, borrowed from the caller.
#[derive(Debug, Clone)]
pub(crate) struct Dataset<'a> {
    pub features: Vec<&'a [Observation]>,
    pub labels: Vec<&'a [String]>,
}

impl<'a> Dataset<'a> {
    pub fn from_parts<X, Y>(x: &'a [X], y: &'a [Y]) -> Result<Self>
    where
        X: AsRef<[Observation]>,
        Y: AsRef<[String]>,
    {
        if x.len() != y.len() {
            return Err(CrfPrepError::Usage(format!(
                "{} feature sequences but {} label sequences",
                x.len(),
                y.len()
            )));
        }
        Ok(Self {
            features: x.iter().map(|s| s.as_ref()).collect(),
            labels: y.iter().map(|s| s.as_ref()).collect(),
        })
    }

    pub fn from_sequences(sequences: &'a [LabeledSequence]) -> Self {
        Self {
            features: sequences.iter().map(|s| s.features.as_slice()).collect(),
            labels: sequences.iter().map(|s| s.labels.as_slice()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn token_count(&self) -> usize {
        self.features.iter().map(|f| f.len()).sum()
    }
}

/// Render a dataset in trainer format: one row per token with the label as
/// the last column, each sequence followed by a blank line.
pub(crate) fn format_training_data(vocab: &Vocabulary, data: &Dataset<'_>) -> Result<String> {
    let encoder = SequenceEncoder::new(vocab);
    let mut out = String::new();

    for (features, labels) in data.features.iter().zip(&data.labels) {
        let encoded = encoder.encode_sequence(features);
        out.push_str(&encoded.to_training_block(*labels)?);
        out.push_str("\n\n");
    }

    Ok(out)
}
