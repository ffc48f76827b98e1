//! Conflict resolution for chosen literal steps.
//!
//! Every step headed for the binding layer is normalized and checked
//! against the corpus conflict registry and an auxiliary risky-pattern
//! list. Collisions are rewritten once with a domain-qualified phrase; the
//! rewrite is not re-verified (single-pass by contract), but a rewrite that
//! still collides logs a non-fatal warning. Steps are deduplicated by
//! signature before binding so no step is bound twice in one artifact set.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analyzer::vocabulary::DEFAULT_DOMAIN;
use crate::analyzer::Scenario;
use crate::corpus::{normalize_step, PatternCorpus};

/// Normalized patterns known to be ambiguous across ecosystems even when
/// the loaded corpus does not register them.
const RISKY_PATTERNS: &[&str] = &[
    "the user clicks {properNoun}",
    "the user is logged in",
    "the user logs in",
    "the page is loaded",
    "the user navigates to {string}",
];

/// Step keyword as emitted in the behavior script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKeyword {
    Given,
    When,
    Then,
    And,
}

impl StepKeyword {
    /// Keyword text as written in Gherkin.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKeyword::Given => "Given",
            StepKeyword::When => "When",
            StepKeyword::Then => "Then",
            StepKeyword::And => "And",
        }
    }
}

/// One resolved literal step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedStep {
    /// Keyword as written in the behavior script.
    pub keyword: StepKeyword,
    /// Keyword the binding registers under ("And" resolves to the keyword
    /// of the block it extends).
    pub binding_keyword: StepKeyword,
    /// Final step text, after any conflict rewrite.
    pub text: String,
    /// Step text before resolution.
    pub original: String,
    /// Whether the step was rewritten to avoid a collision.
    pub rewritten: bool,
}

/// One scenario with its resolved steps in emission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedScenario {
    pub name: String,
    pub steps: Vec<ResolvedStep>,
}

/// Counters accumulated across one generation run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GenerationCounters {
    /// Steps rewritten because their pattern collided.
    pub conflicts_avoided: u32,
    /// Steps whose pattern matched a single-origin corpus pattern.
    pub patterns_reused: u32,
    /// Steps with no corpus counterpart at all.
    pub new_steps_generated: u32,
    /// Structural checks passed during artifact validation.
    pub validations_passed: u32,
}

/// Resolver over one corpus snapshot and the analysis domain.
pub struct ConflictResolver<'a> {
    corpus: &'a PatternCorpus,
    domain: String,
    counters: GenerationCounters,
}

impl<'a> ConflictResolver<'a> {
    /// Creates a resolver for the given corpus snapshot and analysis domain.
    pub fn new(corpus: &'a PatternCorpus, domain: impl Into<String>) -> Self {
        Self {
            corpus,
            domain: domain.into(),
            counters: GenerationCounters::default(),
        }
    }

    /// Counters accumulated so far.
    pub fn counters(&self) -> GenerationCounters {
        self.counters
    }

    /// Resolves every step of every scenario, preserving order.
    pub fn resolve_scenarios(&mut self, scenarios: &[Scenario]) -> Vec<ResolvedScenario> {
        scenarios
            .iter()
            .map(|scenario| {
                let mut steps = Vec::new();
                for text in &scenario.given {
                    steps.push(self.resolve(StepKeyword::Given, StepKeyword::Given, text));
                }
                for text in &scenario.when {
                    steps.push(self.resolve(StepKeyword::When, StepKeyword::When, text));
                }
                for text in &scenario.then {
                    steps.push(self.resolve(StepKeyword::Then, StepKeyword::Then, text));
                }
                // "And" lines extend the Then block, so they bind as Then.
                for text in &scenario.and {
                    steps.push(self.resolve(StepKeyword::And, StepKeyword::Then, text));
                }
                ResolvedScenario {
                    name: scenario.name.clone(),
                    steps,
                }
            })
            .collect()
    }

    /// Resolves one literal step.
    fn resolve(
        &mut self,
        keyword: StepKeyword,
        binding_keyword: StepKeyword,
        text: &str,
    ) -> ResolvedStep {
        let normalized = normalize_step(text);

        if let Some(conflict_domain) = self.collision_domain(&normalized) {
            let qualifier = if conflict_domain != DEFAULT_DOMAIN {
                conflict_domain
            } else {
                self.domain.clone()
            };
            let rewritten = domain_qualified_rewrite(text, &qualifier);
            self.counters.conflicts_avoided += 1;

            // Single-pass contract: the rewrite is used as-is, but a rewrite
            // that still collides is worth a warning.
            let rewritten_normalized = normalize_step(&rewritten);
            if self.collision_domain(&rewritten_normalized).is_some() {
                warn!(step = %rewritten, "rewritten step still collides with the registry");
            }

            debug!(original = %text, rewritten = %rewritten, "conflict avoided");
            return ResolvedStep {
                keyword,
                binding_keyword,
                text: rewritten,
                original: text.to_string(),
                rewritten: true,
            };
        }

        if self.corpus.is_safe(&normalized) {
            self.counters.patterns_reused += 1;
        } else {
            self.counters.new_steps_generated += 1;
        }

        ResolvedStep {
            keyword,
            binding_keyword,
            text: text.to_string(),
            original: text.to_string(),
            rewritten: false,
        }
    }

    /// Returns the qualifying domain when the normalized pattern collides
    /// with the registry or the auxiliary risky-pattern list.
    fn collision_domain(&self, normalized: &str) -> Option<String> {
        if let Some(record) = self.corpus.conflict_for(normalized) {
            return Some(record.domain.clone());
        }
        if RISKY_PATTERNS.contains(&normalized) {
            return Some(self.domain.clone());
        }
        None
    }
}

/// Deduplicates resolved steps by signature (final text), preserving first
/// appearance order across all scenarios.
pub fn distinct_steps(scenarios: &[ResolvedScenario]) -> Vec<ResolvedStep> {
    let mut seen = std::collections::HashSet::new();
    let mut distinct = Vec::new();
    for scenario in scenarios {
        for step in &scenario.steps {
            if seen.insert(step.text.clone()) {
                distinct.push(step.clone());
            }
        }
    }
    distinct
}

/// Inserts a domain-naming phrase into the step predicate:
/// "Alex clicks Save" becomes "Alex performs billing verification that
/// clicks Save".
fn domain_qualified_rewrite(text: &str, domain: &str) -> String {
    match text.split_once(char::is_whitespace) {
        Some((subject, predicate)) => format!(
            "{} performs {} verification that {}",
            subject, domain, predicate
        ),
        None => format!("{} performs {} verification", text, domain),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{structural_fingerprint, ComplexityTier, PatternKind, PatternRecord};

    fn corpus_with_conflict() -> PatternCorpus {
        let mut corpus = PatternCorpus::default();
        for (origin, text) in [
            ("billing-a-steps.js", "Alex clicks Save"),
            ("billing-b-steps.js", "Alex clicks Submit"),
            ("billing-b-steps.js", "the invoice is archived"),
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
    fn test_colliding_step_is_domain_qualified() {
        let corpus = corpus_with_conflict();
        let mut resolver = ConflictResolver::new(&corpus, "general");

        let scenario = Scenario {
            name: "Save".to_string(),
            given: vec!["Alex clicks Save".to_string()],
            when: vec![],
            then: vec![],
            and: vec![],
        };
        let resolved = resolver.resolve_scenarios(&[scenario]);

        let step = &resolved[0].steps[0];
        assert!(step.rewritten);
        assert_eq!(
            step.text,
            "Alex performs billing verification that clicks Save"
        );
        assert_ne!(normalize_step(&step.text), normalize_step(&step.original));
        assert_eq!(resolver.counters().conflicts_avoided, 1);
    }

    #[test]
    fn test_safe_pattern_counts_as_reused() {
        let corpus = corpus_with_conflict();
        let mut resolver = ConflictResolver::new(&corpus, "billing");

        let scenario = Scenario {
            name: "Archive".to_string(),
            given: vec!["the invoice is archived".to_string()],
            when: vec![],
            then: vec![],
            and: vec![],
        };
        let resolved = resolver.resolve_scenarios(&[scenario]);

        assert!(!resolved[0].steps[0].rewritten);
        assert_eq!(resolver.counters().patterns_reused, 1);
        assert_eq!(resolver.counters().conflicts_avoided, 0);
    }

    #[test]
    fn test_unknown_pattern_counts_as_new() {
        let corpus = corpus_with_conflict();
        let mut resolver = ConflictResolver::new(&corpus, "billing");

        let scenario = Scenario {
            name: "New".to_string(),
            given: vec![],
            when: vec!["the report is exported nightly".to_string()],
            then: vec![],
            and: vec![],
        };
        resolver.resolve_scenarios(&[scenario]);
        assert_eq!(resolver.counters().new_steps_generated, 1);
    }

    #[test]
    fn test_risky_pattern_uses_analysis_domain() {
        let corpus = PatternCorpus::default();
        let mut resolver = ConflictResolver::new(&corpus, "ui");

        let scenario = Scenario {
            name: "Login".to_string(),
            given: vec!["the user is logged in".to_string()],
            when: vec![],
            then: vec![],
            and: vec![],
        };
        let resolved = resolver.resolve_scenarios(&[scenario]);
        let step = &resolved[0].steps[0];

        assert!(step.rewritten);
        assert!(step.text.contains("ui verification"));
    }

    #[test]
    fn test_and_steps_bind_as_then() {
        let corpus = PatternCorpus::default();
        let mut resolver = ConflictResolver::new(&corpus, "general");

        let scenario = Scenario {
            name: "Trailer".to_string(),
            given: vec!["a precondition holds".to_string()],
            when: vec!["something happens".to_string()],
            then: vec!["an outcome is visible".to_string()],
            and: vec!["a side effect is recorded".to_string()],
        };
        let resolved = resolver.resolve_scenarios(&[scenario]);
        let and_step = resolved[0].steps.last().expect("and step");

        assert_eq!(and_step.keyword, StepKeyword::And);
        assert_eq!(and_step.binding_keyword, StepKeyword::Then);
    }

    #[test]
    fn test_distinct_steps_dedup_by_text() {
        let corpus = PatternCorpus::default();
        let mut resolver = ConflictResolver::new(&corpus, "general");

        let scenario_a = Scenario {
            name: "A".to_string(),
            given: vec!["the application is open".to_string()],
            when: vec!["the page is rendered fully".to_string()],
            then: vec!["the header should be displayed".to_string()],
            and: vec![],
        };
        let scenario_b = Scenario {
            name: "B".to_string(),
            given: vec!["the application is open".to_string()],
            when: vec!["the page is rendered fully".to_string()],
            then: vec!["the footer should be displayed".to_string()],
            and: vec![],
        };
        let resolved = resolver.resolve_scenarios(&[scenario_a, scenario_b]);
        let distinct = distinct_steps(&resolved);

        assert_eq!(distinct.len(), 4);
    }
}
