//! JSON document store for corpus collections.
//!
//! Each pattern collection (features, steps, pages) and each vocabulary
//! (roles, actions, entities) serializes to one JSON document, plus a
//! master index listing the collection names with usage guidance. Loading
//! is strict: a missing or corrupt document is fatal, because a generation
//! run without a trustworthy conflict registry cannot guarantee
//! non-collision.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CorpusError;

use super::{PatternCorpus, PatternKind, PatternRecord, VocabularyTerm};

/// File name of the master index document.
const INDEX_FILE: &str = "index.json";

/// Vocabulary collection names, in storage order.
const VOCABULARY_COLLECTIONS: [&str; 3] = ["roles", "actions", "entities"];

/// Master index document: collection names plus usage guidance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterIndex {
    /// Names of the pattern collections.
    pub pattern_collections: Vec<String>,
    /// Names of the vocabulary collections.
    pub vocabulary_collections: Vec<String>,
    /// Human-readable guidance for consumers of the store.
    pub guidance: Vec<String>,
    /// When the corpus was last built.
    pub built_at: DateTime<Utc>,
}

impl MasterIndex {
    fn new() -> Self {
        Self {
            pattern_collections: PatternKind::ALL
                .iter()
                .map(|k| k.collection_name().to_string())
                .collect(),
            vocabulary_collections: VOCABULARY_COLLECTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            guidance: vec![
                "Pattern collections hold one record per historical pattern; \
                 fingerprints use {string}, {number} and {properNoun} placeholders."
                    .to_string(),
                "The conflict registry is derived from the steps collection at \
                 load time and is never stored."
                    .to_string(),
                "Collections are immutable snapshots; rebuild the corpus instead \
                 of editing documents in place."
                    .to_string(),
            ],
            built_at: Utc::now(),
        }
    }
}

/// Store handle bound to one corpus directory.
#[derive(Debug, Clone)]
pub struct CorpusStore {
    dir: PathBuf,
}

impl CorpusStore {
    /// Creates a store handle for the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory this store reads and writes.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persists every collection plus the master index.
    pub fn save(&self, corpus: &PatternCorpus) -> Result<(), CorpusError> {
        fs::create_dir_all(&self.dir)?;

        for kind in PatternKind::ALL {
            self.write_document(kind.collection_name(), corpus.patterns_of_kind(kind))?;
        }

        let vocabularies: Vec<Vec<&VocabularyTerm>> = vec![
            corpus.roles.values().collect(),
            corpus.actions.values().collect(),
            corpus.entities.values().collect(),
        ];
        for (name, terms) in VOCABULARY_COLLECTIONS.iter().zip(vocabularies) {
            self.write_document(name, &terms)?;
        }

        self.write_document(INDEX_FILE.trim_end_matches(".json"), &MasterIndex::new())?;

        info!(dir = %self.dir.display(), patterns = corpus.pattern_count(), "corpus persisted");
        Ok(())
    }

    /// Loads a corpus from the store and rebuilds its conflict registry.
    ///
    /// Fatal when the index or any collection it lists is missing or
    /// corrupt.
    pub fn load(&self) -> Result<PatternCorpus, CorpusError> {
        let index = self.load_index()?;

        let mut corpus = PatternCorpus::default();

        for name in &index.pattern_collections {
            let records: Vec<PatternRecord> = self.read_document(name)?;
            match name.as_str() {
                "features" => corpus.features = records,
                "steps" => corpus.steps = records,
                "pages" => corpus.pages = records,
                other => {
                    return Err(CorpusError::CorruptCollection {
                        collection: other.to_string(),
                        message: "unknown pattern collection in index".to_string(),
                    })
                }
            }
        }

        for name in &index.vocabulary_collections {
            let terms: Vec<VocabularyTerm> = self.read_document(name)?;
            let map = terms
                .into_iter()
                .map(|t| (t.term.clone(), t))
                .collect();
            match name.as_str() {
                "roles" => corpus.roles = map,
                "actions" => corpus.actions = map,
                "entities" => corpus.entities = map,
                other => {
                    return Err(CorpusError::CorruptCollection {
                        collection: other.to_string(),
                        message: "unknown vocabulary collection in index".to_string(),
                    })
                }
            }
        }

        corpus.rebuild_conflict_registry();

        info!(
            dir = %self.dir.display(),
            patterns = corpus.pattern_count(),
            conflicts = corpus.conflicts.len(),
            "corpus loaded"
        );
        Ok(corpus)
    }

    /// Loads just the master index.
    pub fn load_index(&self) -> Result<MasterIndex, CorpusError> {
        self.read_document("index").map_err(|e| match e {
            CorpusError::MissingCollection(_) => {
                CorpusError::MissingIndex(self.dir.join(INDEX_FILE).display().to_string())
            }
            other => other,
        })
    }

    fn write_document<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), CorpusError> {
        let path = self.document_path(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)?;
        Ok(())
    }

    fn read_document<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Result<T, CorpusError> {
        let path = self.document_path(name);
        let content = fs::read_to_string(&path)
            .map_err(|_| CorpusError::MissingCollection(path.display().to_string()))?;
        serde_json::from_str(&content).map_err(|e| CorpusError::CorruptCollection {
            collection: name.to_string(),
            message: e.to_string(),
        })
    }

    fn document_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{structural_fingerprint, ComplexityTier};

    fn sample_corpus() -> PatternCorpus {
        let mut corpus = PatternCorpus::default();
        for (origin, text) in [
            ("a-steps.js", "the user clicks Save"),
            ("b-steps.js", "the user clicks Submit"),
            ("b-steps.js", "the invoice total is 100"),
        ] {
            corpus.steps.push(PatternRecord {
                origin: origin.to_string(),
                kind: PatternKind::Step,
                fingerprint: structural_fingerprint(text),
                source_text: text.to_string(),
                domain: "billing".to_string(),
                complexity: ComplexityTier::of_pattern(text),
            });
        }
        corpus.rebuild_conflict_registry();
        corpus
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CorpusStore::new(dir.path());

        let corpus = sample_corpus();
        store.save(&corpus).expect("save");

        let loaded = store.load().expect("load");
        assert_eq!(loaded.steps.len(), 3);
        // Conflict registry is rebuilt, not stored.
        assert_eq!(loaded.conflicts.len(), 1);
        assert_eq!(loaded.safe_patterns.len(), 1);
    }

    #[test]
    fn test_load_missing_index_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CorpusStore::new(dir.path());
        let err = store.load().expect_err("load should fail");
        assert!(matches!(err, CorpusError::MissingIndex(_)));
    }

    #[test]
    fn test_load_corrupt_collection_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CorpusStore::new(dir.path());
        store.save(&sample_corpus()).expect("save");

        fs::write(dir.path().join("steps.json"), "not json").expect("write");
        let err = store.load().expect_err("load should fail");
        assert!(matches!(err, CorpusError::CorruptCollection { .. }));
    }

    #[test]
    fn test_load_missing_collection_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CorpusStore::new(dir.path());
        store.save(&sample_corpus()).expect("save");

        fs::remove_file(dir.path().join("entities.json")).expect("remove");
        let err = store.load().expect_err("load should fail");
        assert!(matches!(err, CorpusError::MissingCollection(_)));
    }

    #[test]
    fn test_index_lists_all_collections() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CorpusStore::new(dir.path());
        store.save(&sample_corpus()).expect("save");

        let content = fs::read_to_string(dir.path().join("index.json")).expect("read");
        let index: MasterIndex = serde_json::from_str(&content).expect("parse");
        assert_eq!(index.pattern_collections, vec!["features", "steps", "pages"]);
        assert_eq!(
            index.vocabulary_collections,
            vec!["roles", "actions", "entities"]
        );
        assert!(!index.guidance.is_empty());
    }
}
