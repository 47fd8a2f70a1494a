//! # Feature Vocabulary
//!
//! Assigns every observed feature name a stable column index. Pinned
//! "front" names always take the lowest indices in the order the caller
//! gave them; every other name follows in lexicographic order.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CrfPrepError, Result};
use crate::types::Observation;

/// Feature pinned to column 0 by [`Vocabulary::default`].
pub const DEFAULT_FRONT_FEATURE: &str = "token";

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of one vocabulary state.
///
/// Every fit, reset or load produces a new version, so artifacts built
/// against an older column layout can be detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VocabVersion(u64);

impl VocabVersion {
    pub(crate) fn next() -> Self {
        Self(NEXT_VERSION.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for VocabVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Ordered, de-duplicated feature names with a derived name → column map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "VocabularyFile", into = "VocabularyFile")]
pub struct Vocabulary {
    front: Vec<String>,
    observed: BTreeSet<String>,
    names: Vec<String>,
    index: HashMap<String, usize>,
    version: VocabVersion,
}

/// On-disk form: the pinned names plus the full column order.
#[derive(Serialize, Deserialize)]
struct VocabularyFile {
    front: Vec<String>,
    features: Vec<String>,
}

impl From<VocabularyFile> for Vocabulary {
    fn from(file: VocabularyFile) -> Self {
        let mut vocab = Vocabulary::new(file.front);
        let front = vocab.front.clone();
        vocab.observed = file
            .features
            .into_iter()
            .filter(|name| !front.contains(name))
            .collect();
        vocab.rebuild();
        vocab
    }
}

impl From<Vocabulary> for VocabularyFile {
    fn from(vocab: Vocabulary) -> Self {
        Self {
            front: vocab.front,
            features: vocab.names,
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new([DEFAULT_FRONT_FEATURE])
    }
}

impl Vocabulary {
    /// Creates an empty vocabulary with the given pinned front names.
    ///
    /// Duplicate front names are dropped, keeping the first occurrence.
    /// Before any data is fitted the vocabulary holds only the front names.
    pub fn new<I, S>(front: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pinned: Vec<String> = Vec::new();
        for name in front {
            let name = name.into();
            if !pinned.contains(&name) {
                pinned.push(name);
            }
        }

        let mut vocab = Self {
            front: pinned,
            observed: BTreeSet::new(),
            names: Vec::new(),
            index: HashMap::new(),
            version: VocabVersion::next(),
        };
        vocab.rebuild();
        vocab
    }

    /// Adds every feature name found in `batches` to the vocabulary.
    ///
    /// Fitting is incremental: names seen by earlier calls are kept. Call
    /// [`Vocabulary::reset`] first to start from scratch. Any previously
    /// encoded rows or compiled templates become stale.
    pub fn fit<I, S>(&mut self, batches: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[Observation]>,
    {
        for sequence in batches {
            for obs in sequence.as_ref() {
                for name in obs.keys() {
                    if !self.front.contains(name) && !self.observed.contains(name) {
                        self.observed.insert(name.clone());
                    }
                }
            }
        }
        self.rebuild();
        debug!(
            features = self.names.len(),
            version = %self.version,
            "fitted feature vocabulary"
        );
        self
    }

    /// Forgets all observed names, keeping the front configuration.
    pub fn reset(&mut self) {
        self.observed.clear();
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.names = self
            .front
            .iter()
            .chain(self.observed.iter())
            .cloned()
            .collect();
        self.index = self
            .names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        self.version = VocabVersion::next();
    }

    /// Column index of a known feature name.
    ///
    /// # Errors
    ///
    /// Returns `CrfPrepError::UnknownFeature` if the name was never observed.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.get(name).ok_or_else(|| CrfPrepError::UnknownFeature {
            name: name.to_string(),
            line: None,
        })
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Feature names in column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn front(&self) -> &[String] {
        &self.front
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn version(&self) -> VocabVersion {
        self.version
    }

    /// Checks that an artifact was built against the current column layout.
    ///
    /// # Errors
    ///
    /// Returns `CrfPrepError::StaleVocabulary` on a version mismatch.
    pub fn ensure_current(&self, version: VocabVersion) -> Result<()> {
        if version != self.version {
            return Err(CrfPrepError::StaleVocabulary {
                expected: self.version,
                found: version,
            });
        }
        Ok(())
    }

    /// Writes the vocabulary as JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Reads a vocabulary written by [`Vocabulary::save_json`].
    ///
    /// The loaded vocabulary gets a fresh version.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{observation, FeatureValue};

    fn sample() -> Vec<Vec<Observation>> {
        vec![vec![
            observation([("token", "the".into()), ("tag", FeatureValue::from("DT"))]),
            observation([
                ("token", FeatureValue::from("dog")),
                ("tag", "NN".into()),
                ("shape", "xxx".into()),
            ]),
        ]]
    }

    #[test]
    fn unfitted_vocabulary_holds_front_names() {
        let vocab = Vocabulary::new(["token", "tag"]);
        assert_eq!(vocab.names(), ["token", "tag"]);
        assert_eq!(Vocabulary::default().names(), ["token"]);
    }

    #[test]
    fn front_names_are_pinned() {
        let mut vocab = Vocabulary::new(["token", "tag"]);
        vocab.fit(&sample());
        assert_eq!(vocab.index_of("token").unwrap(), 0);
        assert_eq!(vocab.index_of("tag").unwrap(), 1);
        assert_eq!(vocab.index_of("shape").unwrap(), 2);
    }

    #[test]
    fn remaining_names_are_lexicographic() {
        let mut vocab = Vocabulary::default();
        vocab.fit([vec![observation([
            ("b", FeatureValue::Int(1)),
            ("a", FeatureValue::Int(2)),
            ("token", "x".into()),
        ])]]);
        assert_eq!(vocab.names(), ["token", "a", "b"]);
    }

    #[test]
    fn duplicate_front_names_are_dropped() {
        let vocab = Vocabulary::new(["token", "tag", "token"]);
        assert_eq!(vocab.names(), ["token", "tag"]);
    }

    #[test]
    fn fit_is_incremental() {
        let mut vocab = Vocabulary::default();
        vocab.fit([vec![observation([("a", FeatureValue::Int(1))])]]);
        vocab.fit([vec![observation([("c", FeatureValue::Int(1))])]]);
        assert_eq!(vocab.names(), ["token", "a", "c"]);
    }

    #[test]
    fn reset_then_fit_is_deterministic() {
        let mut vocab = Vocabulary::new(["token", "tag"]);
        vocab.fit(&sample());
        let first = vocab.names().to_vec();
        let first_index: Vec<_> = first.iter().map(|n| vocab.index_of(n).unwrap()).collect();

        vocab.reset();
        assert_eq!(vocab.names(), ["token", "tag"]);
        vocab.fit(&sample());

        assert_eq!(vocab.names(), first.as_slice());
        let second_index: Vec<_> = first.iter().map(|n| vocab.index_of(n).unwrap()).collect();
        assert_eq!(first_index, second_index);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let vocab = Vocabulary::default();
        assert!(matches!(
            vocab.index_of("nope"),
            Err(CrfPrepError::UnknownFeature { line: None, .. })
        ));
        assert_eq!(vocab.get("nope"), None);
    }

    #[test]
    fn every_fit_bumps_the_version() {
        let mut vocab = Vocabulary::default();
        let v0 = vocab.version();
        vocab.fit(&sample());
        let v1 = vocab.version();
        vocab.reset();
        let v2 = vocab.version();

        assert_ne!(v0, v1);
        assert_ne!(v1, v2);
        assert!(vocab.ensure_current(v2).is_ok());
        assert!(matches!(
            vocab.ensure_current(v1),
            Err(CrfPrepError::StaleVocabulary { .. })
        ));
    }

    #[test]
    fn json_round_trip_keeps_column_order() {
        let mut vocab = Vocabulary::new(["token", "tag"]);
        vocab.fit(&sample());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.json");
        vocab.save_json(&path).unwrap();
        let loaded = Vocabulary::load_json(&path).unwrap();

        assert_eq!(loaded.names(), vocab.names());
        assert_eq!(loaded.front(), vocab.front());
        assert_ne!(loaded.version(), vocab.version());
    }
}
