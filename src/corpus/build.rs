//! Corpus construction from a directory of historical test artifacts.
//!
//! Artifacts are classified by file name into a tagged union so the textual
//! accessor is resolved once at load time, then mined for pattern records
//! and vocabulary terms. The conflict registry is derived from the step
//! collection after all records are in place.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::analyzer::vocabulary;
use crate::error::CorpusError;

use super::fingerprint::structural_fingerprint;
use super::{ComplexityTier, PatternCorpus, PatternKind, PatternRecord, VocabularyTerm};

/// One historical artifact, classified by origin kind.
///
/// The variant decides which extraction rules apply; the textual accessor
/// is uniform so downstream code never inspects file names again.
#[derive(Debug, Clone)]
pub enum HistoricalArtifact {
    /// A Gherkin feature file.
    Feature { path: String, content: String },
    /// A step-definition file (binding layer).
    StepDefinition { path: String, content: String },
    /// A page-object file (interaction layer).
    PageObject { path: String, content: String },
}

impl HistoricalArtifact {
    /// Classifies a file by name; returns None for files that are not
    /// historical test artifacts.
    pub fn classify(path: &Path, content: String) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_lowercase();
        let path_str = path.display().to_string();

        if name.ends_with(".feature") {
            Some(HistoricalArtifact::Feature {
                path: path_str,
                content,
            })
        } else if name.contains("-steps.") {
            Some(HistoricalArtifact::StepDefinition {
                path: path_str,
                content,
            })
        } else if name.contains("-page.") {
            Some(HistoricalArtifact::PageObject {
                path: path_str,
                content,
            })
        } else {
            None
        }
    }

    /// The origin path of the artifact.
    pub fn path(&self) -> &str {
        match self {
            HistoricalArtifact::Feature { path, .. }
            | HistoricalArtifact::StepDefinition { path, .. }
            | HistoricalArtifact::PageObject { path, .. } => path,
        }
    }

    /// The full text of the artifact.
    pub fn text(&self) -> &str {
        match self {
            HistoricalArtifact::Feature { content, .. }
            | HistoricalArtifact::StepDefinition { content, .. }
            | HistoricalArtifact::PageObject { content, .. } => content,
        }
    }

    /// The pattern kind contributed by this artifact.
    pub fn kind(&self) -> PatternKind {
        match self {
            HistoricalArtifact::Feature { .. } => PatternKind::Feature,
            HistoricalArtifact::StepDefinition { .. } => PatternKind::Step,
            HistoricalArtifact::PageObject { .. } => PatternKind::Page,
        }
    }

    /// Extracts the pattern texts this artifact contributes.
    pub fn pattern_texts(&self) -> Vec<String> {
        match self {
            HistoricalArtifact::Feature { content, .. } => feature_titles(content),
            HistoricalArtifact::StepDefinition { content, .. } => bound_step_patterns(content),
            HistoricalArtifact::PageObject { content, .. } => page_method_names(content),
        }
    }
}

/// Builder that scans historical artifacts into a [`PatternCorpus`].
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    artifacts: Vec<HistoricalArtifact>,
}

impl CorpusBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one classified artifact.
    pub fn add_artifact(&mut self, artifact: HistoricalArtifact) -> &mut Self {
        self.artifacts.push(artifact);
        self
    }

    /// Scans a directory tree for historical artifacts.
    ///
    /// Files are classified by name; anything that is not a feature, step
    /// or page artifact is skipped. Fails when the directory does not exist
    /// or yields no artifacts at all.
    pub fn scan_directory(&mut self, dir: impl AsRef<Path>) -> Result<usize, CorpusError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(CorpusError::DirectoryNotFound(dir.display().to_string()));
        }

        let before = self.artifacts.len();
        let mut entries: Vec<_> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();
        // Deterministic corpus regardless of directory iteration order.
        entries.sort();

        for path in entries {
            let content = fs::read_to_string(&path)?;
            if let Some(artifact) = HistoricalArtifact::classify(&path, content) {
                debug!(path = %artifact.path(), kind = ?artifact.kind(), "classified artifact");
                self.artifacts.push(artifact);
            }
        }

        let added = self.artifacts.len() - before;
        if added == 0 {
            return Err(CorpusError::EmptySource(dir.display().to_string()));
        }
        Ok(added)
    }

    /// Builds the corpus: pattern records, vocabularies and the conflict
    /// registry.
    pub fn build(&self) -> PatternCorpus {
        let mut corpus = PatternCorpus::default();

        for artifact in &self.artifacts {
            // Domain resolved once per artifact from its full text.
            let domain = vocabulary::identify_domain(artifact.text());

            for text in artifact.pattern_texts() {
                let record = PatternRecord {
                    origin: artifact.path().to_string(),
                    kind: artifact.kind(),
                    fingerprint: structural_fingerprint(&text),
                    source_text: text.clone(),
                    domain: domain.clone(),
                    complexity: ComplexityTier::of_pattern(&text),
                };
                match artifact.kind() {
                    PatternKind::Feature => corpus.features.push(record),
                    PatternKind::Step => corpus.steps.push(record),
                    PatternKind::Page => corpus.pages.push(record),
                }
            }

            count_terms(
                &mut corpus.roles,
                vocabulary::extract_roles(artifact.text()),
                &domain,
            );
            count_terms(
                &mut corpus.actions,
                vocabulary::extract_actions(artifact.text()),
                &domain,
            );
            count_terms(
                &mut corpus.entities,
                vocabulary::extract_entities(artifact.text()),
                &domain,
            );
        }

        corpus.rebuild_conflict_registry();

        info!(
            artifacts = self.artifacts.len(),
            patterns = corpus.pattern_count(),
            conflicts = corpus.conflicts.len(),
            "corpus built"
        );
        corpus
    }
}

fn count_terms(
    vocab: &mut BTreeMap<String, VocabularyTerm>,
    terms: std::collections::BTreeSet<String>,
    domain: &str,
) {
    for term in terms {
        let entry = vocab.entry(term.clone()).or_insert_with(|| VocabularyTerm {
            term,
            occurrences: 0,
            domains: Default::default(),
        });
        entry.occurrences += 1;
        entry.domains.insert(domain.to_string());
    }
}

/// Feature and scenario titles from a Gherkin file.
fn feature_titles(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            trimmed
                .strip_prefix("Feature:")
                .or_else(|| trimmed.strip_prefix("Scenario:"))
                .or_else(|| trimmed.strip_prefix("Scenario Outline:"))
        })
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .collect()
}

/// Step patterns bound by Given/When/Then calls in a step-definition file.
fn bound_step_patterns(content: &str) -> Vec<String> {
    binding_re()
        .captures_iter(content)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Identifiers that look like method definitions but are control flow.
const NON_METHOD_KEYWORDS: &[&str] = &["constructor", "if", "for", "while", "switch", "catch"];

/// Method names defined by a page-object file, excluding the constructor
/// and control-flow statements that share its shape.
fn page_method_names(content: &str) -> Vec<String> {
    method_re()
        .captures_iter(content)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|name| !NON_METHOD_KEYWORDS.contains(&name.as_str()))
        .collect()
}

fn binding_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:Given|When|Then)\s*\(\s*(?:'([^']+)'|"([^"]+)")"#).expect("valid regex")
    })
}

fn method_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*(?:async\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*\([^)]*\)\s*\{")
            .expect("valid regex")
    })
}
