//! Pattern matching: scoring and ranking corpus entries against an analysis.
//!
//! Each candidate receives a weighted multi-factor score; candidates above
//! a per-kind threshold are ranked, merged across kinds by an
//! intent-specific priority order and truncated into a recommendation set
//! with an aggregate confidence and human-readable justifications.

pub mod similarity;

pub use similarity::{levenshtein, string_similarity};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzer::Analysis;
use crate::corpus::{ComplexityTier, PatternCorpus, PatternKind, PatternRecord};

/// Weight of the domain component.
const WEIGHT_DOMAIN: f64 = 0.25;
/// Weight of the text-similarity component.
const WEIGHT_TEXT: f64 = 0.20;
/// Weight of the entity-overlap component.
const WEIGHT_ENTITY: f64 = 0.20;
/// Weight of the action-overlap component.
const WEIGHT_ACTION: f64 = 0.15;
/// Weight of the role-overlap component.
const WEIGHT_ROLE: f64 = 0.10;
/// Weight of the complexity component.
const WEIGHT_COMPLEXITY: f64 = 0.10;

/// Domain score for an exact match.
const DOMAIN_EXACT: f64 = 1.0;
/// Domain score when the two domains share a vocabulary term.
const DOMAIN_BRIDGED: f64 = 0.7;
/// Domain score when either side is the default domain.
const DOMAIN_GENERAL: f64 = 0.3;

/// Complexity penalty per tier of distance.
const COMPLEXITY_TIER_PENALTY: f64 = 0.3;

/// Minimum score for step candidates.
const MIN_SCORE_STEP: f64 = 0.4;
/// Minimum score for feature and page candidates.
const MIN_SCORE_FEATURE_PAGE: f64 = 0.3;

/// Candidates kept per kind after threshold filtering.
const MAX_CANDIDATES_PER_KIND: usize = 10;
/// Candidates merged per kind into the recommendation set.
const MERGED_PER_KIND: usize = 3;
/// Final recommendation set size.
const MAX_RECOMMENDATIONS: usize = 10;

/// Confidence weighting between mean and best score.
const CONFIDENCE_MEAN_WEIGHT: f64 = 0.6;
const CONFIDENCE_MAX_WEIGHT: f64 = 0.4;

/// Per-candidate score breakdown. Every component and the weighted total
/// lie in [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchScore {
    pub domain_match: f64,
    pub text_similarity: f64,
    pub entity_match: f64,
    pub action_match: f64,
    pub role_match: f64,
    pub complexity_match: f64,
}

impl MatchScore {
    /// Weighted total, clamped to [0, 1].
    pub fn total(&self) -> f64 {
        let total = WEIGHT_DOMAIN * self.domain_match
            + WEIGHT_TEXT * self.text_similarity
            + WEIGHT_ENTITY * self.entity_match
            + WEIGHT_ACTION * self.action_match
            + WEIGHT_ROLE * self.role_match
            + WEIGHT_COMPLEXITY * self.complexity_match;
        total.clamp(0.0, 1.0)
    }
}

/// One recommended corpus pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Kind of the recommended pattern.
    pub kind: PatternKind,
    /// Origin file of the pattern.
    pub origin: String,
    /// Structural fingerprint of the pattern.
    pub fingerprint: String,
    /// Score breakdown.
    pub score: MatchScore,
    /// Weighted total, precomputed for sorting and reporting.
    pub total: f64,
}

/// The assembled recommendation set for one analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecommendations {
    /// Recommendations ordered by (intent priority, score).
    pub recommendations: Vec<Recommendation>,
    /// Aggregate confidence in [0, 1]; 0 when empty.
    pub confidence: f64,
    /// Ordered human-readable justification strings. Explanatory only;
    /// nothing downstream consumes them.
    pub justifications: Vec<String>,
}

/// The matching intent derived from an analysis, deciding which pattern
/// kinds are prioritized when merging recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchIntent {
    /// Interaction-heavy requirements: steps first, then pages.
    Interaction,
    /// Specification-heavy requirements: features first.
    Specification,
}

impl MatchIntent {
    /// Actions that mark an analysis as interaction-heavy.
    const INTERACTION_ACTIONS: [&'static str; 5] =
        ["click", "select", "submit", "navigate", "hover"];

    /// Derives the intent from an analysis.
    pub fn of(analysis: &Analysis) -> Self {
        let interactive = analysis
            .actions
            .iter()
            .any(|a| Self::INTERACTION_ACTIONS.contains(&a.as_str()));
        if interactive {
            MatchIntent::Interaction
        } else {
            MatchIntent::Specification
        }
    }

    /// Kind priority order for this intent (earlier = higher priority).
    pub fn priority(&self) -> [PatternKind; 3] {
        match self {
            MatchIntent::Interaction => [PatternKind::Step, PatternKind::Page, PatternKind::Feature],
            MatchIntent::Specification => {
                [PatternKind::Feature, PatternKind::Step, PatternKind::Page]
            }
        }
    }
}

/// Matcher over one immutable corpus snapshot.
pub struct PatternMatcher<'a> {
    corpus: &'a PatternCorpus,
}

impl<'a> PatternMatcher<'a> {
    /// Creates a matcher bound to a corpus snapshot.
    pub fn new(corpus: &'a PatternCorpus) -> Self {
        Self { corpus }
    }

    /// Scores one candidate pattern against the analysis.
    pub fn score(&self, analysis: &Analysis, record: &PatternRecord) -> MatchScore {
        let fingerprint_lower = record.fingerprint.to_lowercase();

        MatchScore {
            domain_match: self.domain_match(&analysis.domain, &record.domain),
            text_similarity: string_similarity(&analysis.title.to_lowercase(), &fingerprint_lower),
            entity_match: term_overlap(&analysis.entities, &fingerprint_lower),
            action_match: term_overlap(&analysis.actions, &fingerprint_lower),
            role_match: term_overlap(&analysis.roles, &fingerprint_lower),
            complexity_match: complexity_match(analysis_complexity(analysis), record.complexity),
        }
    }

    /// Ranks the candidates of one kind: threshold filter, sort descending,
    /// keep the top ten.
    pub fn rank(&self, analysis: &Analysis, kind: PatternKind) -> Vec<Recommendation> {
        let threshold = match kind {
            PatternKind::Step => MIN_SCORE_STEP,
            PatternKind::Feature | PatternKind::Page => MIN_SCORE_FEATURE_PAGE,
        };

        let mut ranked: Vec<Recommendation> = self
            .corpus
            .patterns_of_kind(kind)
            .iter()
            .map(|record| {
                let score = self.score(analysis, record);
                Recommendation {
                    kind,
                    origin: record.origin.clone(),
                    fingerprint: record.fingerprint.clone(),
                    score,
                    total: score.total(),
                }
            })
            .filter(|r| r.total >= threshold)
            .collect();

        // Descending by score; fingerprint tie-break keeps ranking
        // deterministic across runs.
        ranked.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.fingerprint.cmp(&b.fingerprint))
        });
        ranked.truncate(MAX_CANDIDATES_PER_KIND);
        ranked
    }

    /// Assembles the recommendation set: top three per kind, merged by
    /// intent priority, truncated to ten, with confidence and
    /// justifications.
    pub fn recommend(&self, analysis: &Analysis) -> MatchRecommendations {
        let intent = MatchIntent::of(analysis);
        let priority = intent.priority();

        let mut merged: Vec<Recommendation> = Vec::new();
        for kind in priority {
            let mut top = self.rank(analysis, kind);
            top.truncate(MERGED_PER_KIND);
            merged.extend(top);
        }

        // (priority, score) ordering; the merge above already grouped by
        // priority, so a stable sort on score within groups preserves it.
        merged.sort_by(|a, b| {
            let pa = priority.iter().position(|k| *k == a.kind).unwrap_or(usize::MAX);
            let pb = priority.iter().position(|k| *k == b.kind).unwrap_or(usize::MAX);
            pa.cmp(&pb).then_with(|| {
                b.total
                    .partial_cmp(&a.total)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });
        merged.truncate(MAX_RECOMMENDATIONS);

        let confidence = confidence_of(&merged);
        let justifications = self.justify(analysis, intent, &merged, confidence);

        debug!(
            recommendations = merged.len(),
            confidence,
            intent = ?intent,
            "recommendation set assembled"
        );

        MatchRecommendations {
            recommendations: merged,
            confidence,
            justifications,
        }
    }

    /// Domain component: exact match, general fallback, or a vocabulary
    /// bridge between two specific domains.
    fn domain_match(&self, analysis_domain: &str, record_domain: &str) -> f64 {
        use crate::analyzer::vocabulary::DEFAULT_DOMAIN;

        if analysis_domain == record_domain {
            DOMAIN_EXACT
        } else if analysis_domain == DEFAULT_DOMAIN || record_domain == DEFAULT_DOMAIN {
            DOMAIN_GENERAL
        } else if self.corpus.domains_share_term(analysis_domain, record_domain) {
            DOMAIN_BRIDGED
        } else {
            0.0
        }
    }

    fn justify(
        &self,
        analysis: &Analysis,
        intent: MatchIntent,
        merged: &[Recommendation],
        confidence: f64,
    ) -> Vec<String> {
        let mut justifications = Vec::new();

        if merged.is_empty() {
            justifications.push(format!(
                "No corpus pattern scored above threshold for domain '{}'",
                analysis.domain
            ));
            return justifications;
        }

        justifications.push(format!(
            "Intent {:?}: prioritizing {:?} patterns",
            intent,
            intent.priority()[0]
        ));

        if let Some(best) = merged.first() {
            justifications.push(format!(
                "Top candidate '{}' from {} scored {:.2} (domain {:.2}, text {:.2}, entities {:.2})",
                best.fingerprint,
                best.origin,
                best.total,
                best.score.domain_match,
                best.score.text_similarity,
                best.score.entity_match,
            ));
        }

        justifications.push(format!(
            "Confidence {:.2} across {} recommendations",
            confidence,
            merged.len()
        ));
        justifications
    }
}

/// Overlap ratio: |analysis terms present in the candidate text| divided by
/// max(|analysis terms|, 1).
fn term_overlap(terms: &std::collections::BTreeSet<String>, candidate_lower: &str) -> f64 {
    let shared = terms
        .iter()
        .filter(|t| candidate_lower.contains(t.as_str()))
        .count();
    shared as f64 / terms.len().max(1) as f64
}

/// Complexity component: 1.0 for the same tier, minus a fixed penalty per
/// tier of distance, floored at 0.
fn complexity_match(a: ComplexityTier, b: ComplexityTier) -> f64 {
    (1.0 - COMPLEXITY_TIER_PENALTY * a.distance(b) as f64).max(0.0)
}

/// Classifies an analysis by scenario count.
fn analysis_complexity(analysis: &Analysis) -> ComplexityTier {
    match analysis.scenarios.len() {
        0..=2 => ComplexityTier::Low,
        3..=5 => ComplexityTier::Medium,
        _ => ComplexityTier::High,
    }
}

/// Aggregate confidence: 0.6 x mean + 0.4 x max over the final set, 0 when
/// the set is empty.
fn confidence_of(recommendations: &[Recommendation]) -> f64 {
    if recommendations.is_empty() {
        return 0.0;
    }
    let totals: Vec<f64> = recommendations.iter().map(|r| r.total).collect();
    let mean = totals.iter().sum::<f64>() / totals.len() as f64;
    let max = totals.iter().cloned().fold(0.0f64, f64::max);
    (CONFIDENCE_MEAN_WEIGHT * mean + CONFIDENCE_MAX_WEIGHT * max).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::TextAnalyzer;
    use crate::corpus::structural_fingerprint;

    fn record(kind: PatternKind, origin: &str, text: &str, domain: &str) -> PatternRecord {
        PatternRecord {
            origin: origin.to_string(),
            kind,
            fingerprint: structural_fingerprint(text),
            source_text: text.to_string(),
            domain: domain.to_string(),
            complexity: ComplexityTier::of_pattern(text),
        }
    }

    fn ui_corpus() -> PatternCorpus {
        let mut corpus = PatternCorpus {
            features: vec![record(
                PatternKind::Feature,
                "layout.feature",
                "Footer visibility on the page",
                "ui",
            )],
            steps: vec![
                record(
                    PatternKind::Step,
                    "layout-steps.js",
                    "the footer should not be displayed",
                    "ui",
                ),
                record(
                    PatternKind::Step,
                    "billing-steps.js",
                    "the invoice total is 100",
                    "billing",
                ),
            ],
            pages: vec![record(
                PatternKind::Page,
                "layout-page.js",
                "verifyFooterHidden",
                "ui",
            )],
            ..Default::default()
        };
        corpus.rebuild_conflict_registry();
        corpus
    }

    fn ui_analysis() -> Analysis {
        TextAnalyzer::new()
            .analyze("Acceptance Criteria:\nThe footer should not be displayed when property X is off")
    }

    #[test]
    fn test_score_bounds_for_all_candidates() {
        let corpus = ui_corpus();
        let matcher = PatternMatcher::new(&corpus);
        let analysis = ui_analysis();

        for kind in PatternKind::ALL {
            for record in corpus.patterns_of_kind(kind) {
                let total = matcher.score(&analysis, record).total();
                assert!((0.0..=1.0).contains(&total), "total {} out of bounds", total);
            }
        }
    }

    #[test]
    fn test_matching_domain_outranks_foreign_domain() {
        let corpus = ui_corpus();
        let matcher = PatternMatcher::new(&corpus);
        let analysis = ui_analysis();

        let ui_score = matcher.score(&analysis, &corpus.steps[0]).total();
        let billing_score = matcher.score(&analysis, &corpus.steps[1]).total();
        assert!(ui_score > billing_score);
    }

    #[test]
    fn test_domain_match_components() {
        let corpus = ui_corpus();
        let matcher = PatternMatcher::new(&corpus);

        assert_eq!(matcher.domain_match("ui", "ui"), DOMAIN_EXACT);
        assert_eq!(matcher.domain_match("general", "ui"), DOMAIN_GENERAL);
        assert_eq!(matcher.domain_match("ui", "general"), DOMAIN_GENERAL);
        // No shared vocabulary term between these two specific domains.
        assert_eq!(matcher.domain_match("ui", "billing"), 0.0);
    }

    #[test]
    fn test_domain_bridge_via_shared_vocabulary_term() {
        let mut corpus = ui_corpus();
        corpus.entities.insert(
            "invoice".to_string(),
            crate::corpus::VocabularyTerm {
                term: "invoice".to_string(),
                occurrences: 2,
                domains: ["billing".to_string(), "reporting".to_string()].into(),
            },
        );
        let matcher = PatternMatcher::new(&corpus);
        assert_eq!(matcher.domain_match("billing", "reporting"), DOMAIN_BRIDGED);
    }

    #[test]
    fn test_rank_applies_step_threshold() {
        let corpus = ui_corpus();
        let matcher = PatternMatcher::new(&corpus);
        let ranked = matcher.rank(&ui_analysis(), PatternKind::Step);

        assert!(ranked.iter().all(|r| r.total >= MIN_SCORE_STEP));
        assert!(ranked.len() <= MAX_CANDIDATES_PER_KIND);
        // Descending order.
        for pair in ranked.windows(2) {
            assert!(pair[0].total >= pair[1].total);
        }
    }

    #[test]
    fn test_recommend_confidence_zero_when_empty() {
        let corpus = PatternCorpus::default();
        let matcher = PatternMatcher::new(&corpus);
        let recs = matcher.recommend(&ui_analysis());

        assert!(recs.recommendations.is_empty());
        assert_eq!(recs.confidence, 0.0);
        assert!(!recs.justifications.is_empty());
    }

    #[test]
    fn test_recommend_truncates_and_orders_by_priority() {
        let mut corpus = ui_corpus();
        // Flood the corpus with strong step candidates.
        for i in 0..20 {
            corpus.steps.push(record(
                PatternKind::Step,
                &format!("extra-{}-steps.js", i),
                "the footer property should not be displayed on the page",
                "ui",
            ));
        }
        corpus.rebuild_conflict_registry();
        let matcher = PatternMatcher::new(&corpus);
        let recs = matcher.recommend(&ui_analysis());

        assert!(recs.recommendations.len() <= MAX_RECOMMENDATIONS);
        assert!(recs.confidence > 0.0);
        // At most three per kind survive the merge.
        let steps = recs
            .recommendations
            .iter()
            .filter(|r| r.kind == PatternKind::Step)
            .count();
        assert!(steps <= MERGED_PER_KIND);
    }

    #[test]
    fn test_intent_derivation() {
        let analyzer = TextAnalyzer::new();
        let interactive = analyzer.analyze("The user should click the submit button");
        assert_eq!(MatchIntent::of(&interactive), MatchIntent::Interaction);

        let spec = analyzer.analyze("The nightly report must include totals");
        assert_eq!(MatchIntent::of(&spec), MatchIntent::Specification);
    }

    #[test]
    fn test_confidence_formula() {
        let recs = vec![
            Recommendation {
                kind: PatternKind::Step,
                origin: "a".into(),
                fingerprint: "x".into(),
                score: MatchScore {
                    domain_match: 1.0,
                    text_similarity: 1.0,
                    entity_match: 1.0,
                    action_match: 1.0,
                    role_match: 1.0,
                    complexity_match: 1.0,
                },
                total: 0.8,
            },
            Recommendation {
                kind: PatternKind::Step,
                origin: "b".into(),
                fingerprint: "y".into(),
                score: MatchScore {
                    domain_match: 0.0,
                    text_similarity: 0.0,
                    entity_match: 0.0,
                    action_match: 0.0,
                    role_match: 0.0,
                    complexity_match: 0.0,
                },
                total: 0.4,
            },
        ];
        let confidence = confidence_of(&recs);
        // 0.6 * mean(0.6) + 0.4 * max(0.8) = 0.36 + 0.32
        assert!((confidence - 0.68).abs() < 1e-9);
    }
}
