//! Historical pattern corpus: pattern records, vocabularies and the
//! conflict registry.
//!
//! The corpus is an immutable snapshot for the duration of a generation
//! run. It is built once from a directory of historical artifacts (see
//! [`build`]), persisted as one JSON document per collection (see
//! [`store`]), and passed into each generation call as an explicit handle —
//! never a hidden global.

pub mod build;
pub mod fingerprint;
pub mod store;

pub use build::CorpusBuilder;
pub use fingerprint::{normalize_step, structural_fingerprint};
pub use store::CorpusStore;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Minimum number of distinct origins for a fingerprint to be a conflict.
pub const CONFLICT_ORIGIN_THRESHOLD: usize = 2;

/// The kind of historical artifact a pattern originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Feature,
    Step,
    Page,
}

impl PatternKind {
    /// All kinds, in the order collections are stored.
    pub const ALL: [PatternKind; 3] = [PatternKind::Feature, PatternKind::Step, PatternKind::Page];

    /// Collection name used by the document store.
    pub fn collection_name(&self) -> &'static str {
        match self {
            PatternKind::Feature => "features",
            PatternKind::Step => "steps",
            PatternKind::Page => "pages",
        }
    }
}

/// Coarse complexity classification of a pattern or analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityTier {
    Low,
    Medium,
    High,
}

impl ComplexityTier {
    /// Tier distance, used by the complexity score component.
    pub fn distance(&self, other: ComplexityTier) -> u32 {
        (self.rank() as i32 - other.rank() as i32).unsigned_abs()
    }

    fn rank(&self) -> u8 {
        match self {
            ComplexityTier::Low => 0,
            ComplexityTier::Medium => 1,
            ComplexityTier::High => 2,
        }
    }

    /// Classifies a pattern text by word count.
    pub fn of_pattern(text: &str) -> Self {
        match text.split_whitespace().count() {
            0..=4 => ComplexityTier::Low,
            5..=8 => ComplexityTier::Medium,
            _ => ComplexityTier::High,
        }
    }
}

/// One indexed historical pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRecord {
    /// File the pattern was extracted from.
    pub origin: String,
    /// Kind of artifact the pattern came from.
    pub kind: PatternKind,
    /// Structural fingerprint (literals replaced by typed placeholders).
    pub fingerprint: String,
    /// Literal source text the fingerprint was computed from. Kept so the
    /// conflict registry can be rebuilt from the persisted collection.
    pub source_text: String,
    /// Domain tag of the originating artifact.
    pub domain: String,
    /// Complexity classification.
    pub complexity: ComplexityTier,
}

/// One vocabulary term with its occurrence statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyTerm {
    /// The term itself, lower-cased.
    pub term: String,
    /// Number of historical artifacts the term occurred in.
    pub occurrences: u32,
    /// Domains the term was observed under.
    pub domains: BTreeSet<String>,
}

/// One origin of a conflicting pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictOrigin {
    /// File that registered the pattern.
    pub origin_file: String,
    /// Literal step text as it appears in that file.
    pub literal_text: String,
}

/// A registry entry marking a normalized pattern ambiguous because two or
/// more independent origins define it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// The normalized step pattern shared by all origins.
    pub pattern: String,
    /// Origins that registered the pattern, in discovery order.
    pub origins: Vec<ConflictOrigin>,
    /// Dominant domain among the origins ("general" when mixed or unknown).
    pub domain: String,
}

/// Immutable, pre-built index of historical patterns, vocabularies and the
/// conflict registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternCorpus {
    /// Feature-level patterns (feature and scenario titles).
    pub features: Vec<PatternRecord>,
    /// Step patterns extracted from historical step definitions.
    pub steps: Vec<PatternRecord>,
    /// Page patterns (interaction method names).
    pub pages: Vec<PatternRecord>,
    /// Role vocabulary, keyed by term.
    pub roles: BTreeMap<String, VocabularyTerm>,
    /// Action vocabulary, keyed by term.
    pub actions: BTreeMap<String, VocabularyTerm>,
    /// Entity vocabulary, keyed by term.
    pub entities: BTreeMap<String, VocabularyTerm>,
    /// Conflict registry, keyed by normalized pattern.
    #[serde(skip)]
    pub conflicts: BTreeMap<String, ConflictRecord>,
    /// Normalized patterns with exactly one origin.
    #[serde(skip)]
    pub safe_patterns: BTreeSet<String>,
}

impl PatternCorpus {
    /// Returns the patterns of one kind.
    pub fn patterns_of_kind(&self, kind: PatternKind) -> &[PatternRecord] {
        match kind {
            PatternKind::Feature => &self.features,
            PatternKind::Step => &self.steps,
            PatternKind::Page => &self.pages,
        }
    }

    /// Looks up a conflict record by normalized pattern.
    pub fn conflict_for(&self, normalized: &str) -> Option<&ConflictRecord> {
        self.conflicts.get(normalized)
    }

    /// Returns true when the normalized pattern is registered under exactly
    /// one origin.
    pub fn is_safe(&self, normalized: &str) -> bool {
        self.safe_patterns.contains(normalized)
    }

    /// Returns true when any vocabulary term is tagged with both domains.
    ///
    /// Used by the matcher's domain bridge: two specific domains that share
    /// a vocabulary term are considered related.
    pub fn domains_share_term(&self, a: &str, b: &str) -> bool {
        [&self.roles, &self.actions, &self.entities]
            .into_iter()
            .flat_map(|vocab| vocab.values())
            .any(|term| term.domains.contains(a) && term.domains.contains(b))
    }

    /// Total number of indexed patterns across all kinds.
    pub fn pattern_count(&self) -> usize {
        self.features.len() + self.steps.len() + self.pages.len()
    }

    /// Rebuilds the conflict registry and safe-pattern set from the step
    /// collection. Called after loading persisted collections; conflicts are
    /// derived state and are never stored.
    pub fn rebuild_conflict_registry(&mut self) {
        let mut grouped: BTreeMap<String, Vec<ConflictOrigin>> = BTreeMap::new();
        for record in &self.steps {
            let normalized = normalize_step(&record.source_text);
            grouped.entry(normalized).or_default().push(ConflictOrigin {
                origin_file: record.origin.clone(),
                literal_text: record.source_text.clone(),
            });
        }

        self.conflicts.clear();
        self.safe_patterns.clear();

        for (pattern, origins) in grouped {
            let distinct: BTreeSet<&str> =
                origins.iter().map(|o| o.origin_file.as_str()).collect();
            if distinct.len() >= CONFLICT_ORIGIN_THRESHOLD {
                let domain = self.dominant_domain(&origins);
                self.conflicts.insert(
                    pattern.clone(),
                    ConflictRecord {
                        pattern,
                        origins,
                        domain,
                    },
                );
            } else {
                self.safe_patterns.insert(pattern);
            }
        }
    }

    /// Majority domain among the conflicting origins; "general" on a tie or
    /// when no origin has a specific domain.
    fn dominant_domain(&self, origins: &[ConflictOrigin]) -> String {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for origin in origins {
            if let Some(record) = self
                .steps
                .iter()
                .find(|r| r.origin == origin.origin_file && r.source_text == origin.literal_text)
            {
                if record.domain != crate::analyzer::vocabulary::DEFAULT_DOMAIN {
                    *counts.entry(record.domain.as_str()).or_insert(0) += 1;
                }
            }
        }

        let best = counts.iter().max_by_key(|(_, count)| **count);
        match best {
            Some((domain, count)) => {
                let ties = counts.values().filter(|c| **c == *count).count();
                if ties == 1 {
                    (*domain).to_string()
                } else {
                    crate::analyzer::vocabulary::DEFAULT_DOMAIN.to_string()
                }
            }
            None => crate::analyzer::vocabulary::DEFAULT_DOMAIN.to_string(),
        }
    }
}
