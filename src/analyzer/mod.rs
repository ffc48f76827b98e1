//! Text analysis for requirement documents.
//!
//! Turns raw requirement text into a structured [`Analysis`] record: title,
//! domain, business rules, scenarios, vocabulary sets, tags and test data
//! hints. Analysis never fails: malformed or sparse input degrades to
//! defaults so the pipeline always has something to emit.

mod rules;
pub mod vocabulary;

pub use rules::{convert_rule_to_scenario, default_scenario, extract_business_rules};

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Title used when the document yields no usable line at all.
const DEFAULT_TITLE: &str = "Generated requirement scenario";

/// Minimum trimmed length for the first line to count as a title.
const MIN_TITLE_LINE_LEN: usize = 10;

/// Maximum title length; longer candidates are truncated at a word boundary.
const MAX_TITLE_LEN: usize = 80;

/// Baseline tag present on every generated behavior script.
const BASELINE_TAG: &str = "@generated";

/// A structured analysis of one requirement document.
///
/// Derived once per generation run, consumed by the matcher, resolver and
/// emitter, and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    /// Human-readable title for the generated feature.
    pub title: String,
    /// Coarse business-area tag (e.g. "ui", "billing", "general").
    pub domain: String,
    /// Ordered business rule strings extracted from the document.
    pub business_rules: Vec<String>,
    /// Ordered scenarios converted from the business rules. Never empty.
    pub scenarios: Vec<Scenario>,
    /// Entity terms detected in the document.
    pub entities: BTreeSet<String>,
    /// Action terms detected in the document.
    pub actions: BTreeSet<String>,
    /// Role terms detected in the document.
    pub roles: BTreeSet<String>,
    /// Tags for the generated behavior script, baseline tag first.
    pub tags: Vec<String>,
    /// Literal values captured for later test data binding.
    pub test_data: TestDataHints,
}

/// One given/when/then scenario converted from a business rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name as it appears in the behavior script.
    pub name: String,
    /// Given steps, in order.
    pub given: Vec<String>,
    /// When steps, in order.
    pub when: Vec<String>,
    /// Then steps, in order.
    pub then: Vec<String>,
    /// Additional And steps appended after the Then block.
    pub and: Vec<String>,
}

/// Literal values found in the document, kept as hints for data binding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestDataHints {
    /// Quoted string literals, in order of appearance.
    pub quoted_literals: Vec<String>,
    /// Numeric literals, in order of appearance.
    pub numbers: Vec<String>,
    /// Property names mentioned as "property <name>".
    pub properties: Vec<String>,
}

/// Analyzer for raw requirement text.
///
/// Stateless and independent of the pattern corpus; all heuristics are
/// ordered lookup tables or templates evaluated in one pass.
#[derive(Debug, Default)]
pub struct TextAnalyzer;

impl TextAnalyzer {
    /// Creates a new text analyzer.
    pub fn new() -> Self {
        Self
    }

    /// Analyzes a requirement document into a structured record.
    ///
    /// Never fails: every extraction degrades to a default when nothing
    /// matches, and at least one scenario is always synthesized.
    pub fn analyze(&self, text: &str) -> Analysis {
        let title = self.extract_title(text);
        let domain = vocabulary::identify_domain(text);
        let business_rules = extract_business_rules(text);

        let mut scenarios: Vec<Scenario> = business_rules
            .iter()
            .enumerate()
            .map(|(i, rule)| convert_rule_to_scenario(rule, i))
            .collect();
        if scenarios.is_empty() {
            scenarios.push(default_scenario());
        }

        debug!(
            rules = business_rules.len(),
            scenarios = scenarios.len(),
            domain = %domain,
            "analysis complete"
        );

        Analysis {
            title,
            domain,
            business_rules,
            scenarios,
            entities: vocabulary::extract_entities(text),
            actions: vocabulary::extract_actions(text),
            roles: vocabulary::extract_roles(text),
            tags: self.generate_tags(text),
            test_data: self.extract_test_data_hints(text),
        }
    }

    /// Extracts a non-empty title from the document.
    ///
    /// Preference order: first non-trivial line, then the first
    /// "X should/must/needs to Y" sentence, then the first non-empty line,
    /// then a fixed default.
    pub fn extract_title(&self, text: &str) -> String {
        if let Some(first) = text.lines().map(clean_title_line).find(|l| !l.is_empty()) {
            if first.len() >= MIN_TITLE_LINE_LEN {
                return truncate_title(&first);
            }

            if let Some(m) = title_template_re().find(text) {
                return truncate_title(m.as_str().trim());
            }

            return truncate_title(&first);
        }

        DEFAULT_TITLE.to_string()
    }

    /// Generates tags for the behavior script: the baseline tag, a domain
    /// tag when the domain is specific, then keyword-triggered tags.
    pub fn generate_tags(&self, text: &str) -> Vec<String> {
        let mut tags = vec![BASELINE_TAG.to_string()];
        let domain = vocabulary::identify_domain(text);
        if domain != vocabulary::DEFAULT_DOMAIN {
            tags.push(format!("@{}", domain));
        }
        tags.extend(vocabulary::triggered_tags(text));
        tags
    }

    /// Captures quoted literals, numbers and property names for data binding.
    pub fn extract_test_data_hints(&self, text: &str) -> TestDataHints {
        let quoted_literals = quoted_re()
            .captures_iter(text)
            .filter_map(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str().to_string())
            .collect();

        let numbers = number_re()
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();

        let properties = property_re()
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect();

        TestDataHints {
            quoted_literals,
            numbers,
            properties,
        }
    }
}

fn clean_title_line(line: &str) -> String {
    line.trim()
        .trim_start_matches('#')
        .trim()
        .trim_end_matches(':')
        .to_string()
}

fn truncate_title(title: &str) -> String {
    if title.len() <= MAX_TITLE_LEN {
        return title.to_string();
    }
    let mut out = String::new();
    for word in title.split_whitespace() {
        if out.len() + word.len() + 1 > MAX_TITLE_LEN {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    if out.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        out
    }
}

fn title_template_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^.{3,}?\s+(?:should|must|needs to)\s+[^\n.]+").expect("valid regex")
    })
}

fn quoted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]+)"|'([^']+)'"#).expect("valid regex"))
}

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d+(?:\.\d+)?\b").expect("valid regex"))
}

fn property_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)property\s+([A-Za-z0-9_-]+)").expect("valid regex"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_acceptance_criteria_document() {
        let analyzer = TextAnalyzer::new();
        let analysis = analyzer
            .analyze("Acceptance Criteria:\nThe footer should not be displayed when property X is off");

        assert_eq!(analysis.domain, "ui");
        assert!(analysis.entities.contains("footer"));
        assert!(analysis.entities.contains("property"));
        assert!(analysis.actions.contains("display"));
        assert_eq!(analysis.scenarios.len(), 1);
        assert!(analysis.scenarios[0].then[0].contains("should not be displayed"));
    }

    #[test]
    fn test_analyze_single_word_synthesizes_default_scenario() {
        let analyzer = TextAnalyzer::new();
        let analysis = analyzer.analyze("widget");

        assert_eq!(analysis.title, "widget");
        assert_eq!(analysis.scenarios.len(), 1);
        assert_eq!(analysis.scenarios[0].name, "Basic functionality");
    }

    #[test]
    fn test_analyze_never_yields_zero_scenarios() {
        let analyzer = TextAnalyzer::new();
        for text in ["x", "   \n  \n", "!!!", "a b c"] {
            let analysis = analyzer.analyze(text);
            assert!(!analysis.scenarios.is_empty(), "input: {:?}", text);
        }
    }

    #[test]
    fn test_extract_title_first_nontrivial_line() {
        let analyzer = TextAnalyzer::new();
        let title = analyzer.extract_title("# Checkout flow improvements\nmore text");
        assert_eq!(title, "Checkout flow improvements");
    }

    #[test]
    fn test_extract_title_template_match() {
        let analyzer = TextAnalyzer::new();
        // First non-empty line is short, so the modal template is consulted.
        let title = analyzer.extract_title("Note\nThe cart must persist across sessions");
        assert_eq!(title, "The cart must persist across sessions");
    }

    #[test]
    fn test_extract_title_default() {
        let analyzer = TextAnalyzer::new();
        assert_eq!(analyzer.extract_title(""), DEFAULT_TITLE);
        assert_eq!(analyzer.extract_title("  \n \n"), DEFAULT_TITLE);
    }

    #[test]
    fn test_extract_title_truncates_long_lines() {
        let analyzer = TextAnalyzer::new();
        let long = "word ".repeat(40);
        let title = analyzer.extract_title(&long);
        assert!(title.len() <= MAX_TITLE_LEN);
        assert!(!title.is_empty());
    }

    #[test]
    fn test_generate_tags_baseline_first() {
        let analyzer = TextAnalyzer::new();
        let tags = analyzer.generate_tags("regression run for the footer");
        assert_eq!(tags[0], BASELINE_TAG);
        assert!(tags.contains(&"@ui".to_string()));
        assert!(tags.contains(&"@regression".to_string()));
    }

    #[test]
    fn test_extract_test_data_hints() {
        let analyzer = TextAnalyzer::new();
        let hints = analyzer.extract_test_data_hints(
            r#"Click "Save" after 3 retries when property darkMode is off"#,
        );
        assert_eq!(hints.quoted_literals, vec!["Save"]);
        assert_eq!(hints.numbers, vec!["3"]);
        assert_eq!(hints.properties, vec!["darkMode"]);
    }
}
