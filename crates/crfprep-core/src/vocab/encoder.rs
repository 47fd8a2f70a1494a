//! # Sequence Encoder
//!
//! Serializes per-token feature observations into space-separated rows
//! whose columns follow the vocabulary order.

use crate::types::{EncodedSequence, Observation, MISSING_PLACEHOLDER};
use crate::vocab::Vocabulary;

/// Encodes observations against a borrowed, already fitted vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct SequenceEncoder<'a> {
    vocab: &'a Vocabulary,
}

impl<'a> SequenceEncoder<'a> {
    pub fn new(vocab: &'a Vocabulary) -> Self {
        Self { vocab }
    }

    /// Encodes a single token's observation as one row.
    ///
    /// Names the vocabulary does not know are ignored; vocabulary names the
    /// observation lacks are written as the missing placeholder.
    ///
    /// # Examples
    /// ```
    /// use crfprep_core::types::{observation, FeatureValue};
    /// use crfprep_core::vocab::{SequenceEncoder, Vocabulary};
    ///
    /// let vocab = Vocabulary::new(["token", "tag"]);
    /// let obs = observation([("token", FeatureValue::from("dog"))]);
    /// assert_eq!(SequenceEncoder::new(&vocab).encode_row(&obs), "dog ~");
    /// ```
    pub fn encode_row(&self, obs: &Observation) -> String {
        self.vocab
            .names()
            .iter()
            .map(|name| {
                obs.get(name)
                    .map_or_else(|| MISSING_PLACEHOLDER.to_string(), |v| v.to_column())
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Encodes one sequence, one row per token, preserving token order.
    pub fn encode_sequence(&self, observations: &[Observation]) -> EncodedSequence {
        let rows = observations.iter().map(|obs| self.encode_row(obs)).collect();
        EncodedSequence::new(rows, self.vocab.version())
    }

    /// Encodes many sequences, preserving their order.
    pub fn encode_batch<I, S>(&self, batches: I) -> Vec<EncodedSequence>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[Observation]>,
    {
        batches
            .into_iter()
            .map(|seq| self.encode_sequence(seq.as_ref()))
            .collect()
    }
}
