//! Business rule extraction and rule-to-scenario conversion.
//!
//! Rules are preferred from a labeled "Acceptance Criteria" section; when no
//! section exists, lines containing modal verbs are collected instead.
//! Conversion applies an ordered set of keyword-triggered templates; rules
//! matching no template get a generic fallback triple, and an empty rule set
//! synthesizes one default scenario so the pipeline never yields zero
//! scenarios.

use super::Scenario;

/// Maximum number of business rules collected from a document.
const MAX_BUSINESS_RULES: usize = 8;

/// Modal markers used when no acceptance-criteria section is present.
const MODAL_MARKERS: &[&str] = &["should", "must", "needs to", "when "];

/// Extracts ordered business rule strings from the raw document text.
pub fn extract_business_rules(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();

    // Prefer lines following a labeled "Acceptance Criteria" section.
    if let Some(start) = lines
        .iter()
        .position(|line| line.to_lowercase().contains("acceptance criteria"))
    {
        let rules: Vec<String> = lines[start + 1..]
            .iter()
            .map(|line| strip_bullet(line))
            .filter(|line| !line.is_empty())
            .take(MAX_BUSINESS_RULES)
            .collect();
        if !rules.is_empty() {
            return rules;
        }
    }

    // Fall back to scanning every line for modal verbs.
    lines
        .iter()
        .map(|line| strip_bullet(line))
        .filter(|line| {
            let lower = line.to_lowercase();
            MODAL_MARKERS.iter().any(|m| lower.contains(m))
        })
        .take(MAX_BUSINESS_RULES)
        .collect()
}

/// Strips list markers (bullets, numbering) and surrounding whitespace.
fn strip_bullet(line: &str) -> String {
    line.trim()
        .trim_start_matches(['-', '*', '•'])
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .trim_start_matches(['.', ')', ':'])
        .trim()
        .to_string()
}

/// Converts one business rule into a scenario via ordered keyword templates.
///
/// Template order matters: a rule mentioning both "not displayed" and a
/// property flag converts under the visibility template because it comes
/// first. Unmatched rules receive the generic fallback triple.
pub fn convert_rule_to_scenario(rule: &str, index: usize) -> Scenario {
    let lower = rule.to_lowercase();

    // Negative visibility: "X should not be displayed ..."
    if lower.contains("not displayed")
        || lower.contains("not be displayed")
        || lower.contains("hidden")
    {
        let subject = subject_of(rule);
        return Scenario {
            name: format!("Verify {} is not displayed", short_phrase(&subject)),
            given: vec!["the application is open".to_string()],
            when: vec![trailing_condition(rule)
                .unwrap_or_else(|| "the page is rendered".to_string())],
            then: vec![format!("{} should not be displayed", subject)],
            and: vec![],
        };
    }

    // Positive visibility: "X should be displayed/visible ..."
    if lower.contains("displayed") || lower.contains("visible") || lower.contains("shown") {
        let subject = subject_of(rule);
        return Scenario {
            name: format!("Verify {} is displayed", short_phrase(&subject)),
            given: vec!["the application is open".to_string()],
            when: vec![trailing_condition(rule)
                .unwrap_or_else(|| "the page is rendered".to_string())],
            then: vec![format!("{} should be displayed", subject)],
            and: vec![],
        };
    }

    // Flag state: "property X is on/off", "feature is enabled/disabled"
    if lower.contains("property") || lower.contains("enabled") || lower.contains("disabled") {
        let state = if lower.contains("off") || lower.contains("disabled") {
            "off"
        } else {
            "on"
        };
        let subject = subject_of(rule);
        return Scenario {
            name: format!("Verify {} with the flag {}", short_phrase(&subject), state),
            given: vec![format!("the property is turned {}", state)],
            when: vec!["the page is rendered".to_string()],
            then: vec![format!("{} reflects the {} state", subject, state)],
            and: vec![],
        };
    }

    // Interaction: clicks, selections, submissions
    if lower.contains("click") || lower.contains("select") || lower.contains("submit") {
        let subject = subject_of(rule);
        return Scenario {
            name: format!("Verify interaction with {}", short_phrase(&subject)),
            given: vec!["the application is open".to_string()],
            when: vec![format!("the user interacts with {}", subject)],
            then: vec!["the action completes successfully".to_string()],
            and: vec![],
        };
    }

    // Messages and errors
    if lower.contains("error") || lower.contains("message") || lower.contains("warning") {
        let subject = subject_of(rule);
        return Scenario {
            name: format!("Verify message for {}", short_phrase(&subject)),
            given: vec!["the application is open".to_string()],
            when: vec!["the triggering condition occurs".to_string()],
            then: vec![format!("the message for {} is displayed", subject)],
            and: vec![],
        };
    }

    // Generic fallback triple for unmatched rules.
    Scenario {
        name: format!("Verify rule {}", index + 1),
        given: vec!["the application is open".to_string()],
        when: vec!["the user performs the described action".to_string()],
        then: vec![format!("{} holds", subject_of(rule))],
        and: vec![],
    }
}

/// The default scenario synthesized when a document yields zero rules.
pub fn default_scenario() -> Scenario {
    Scenario {
        name: "Basic functionality".to_string(),
        given: vec!["the application is open".to_string()],
        when: vec!["the user exercises the basic functionality".to_string()],
        then: vec!["the application responds as expected".to_string()],
        and: vec![],
    }
}

/// Returns the subject clause of a rule: the text before the first modal
/// verb, lower-cased, or a fixed default when the rule has no modal.
fn subject_of(rule: &str) -> String {
    let lower = rule.to_lowercase();
    for modal in ["should", "must", "needs to"] {
        if let Some(pos) = lower.find(modal) {
            let subject = lower[..pos].trim();
            if !subject.is_empty() {
                return subject.to_string();
            }
        }
    }
    let trimmed = lower.trim();
    if trimmed.is_empty() {
        "the element".to_string()
    } else {
        // Use the first few words as the subject.
        trimmed
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Returns the trailing "when ..." condition of a rule, if present.
fn trailing_condition(rule: &str) -> Option<String> {
    let lower = rule.to_lowercase();
    lower.find(" when ").map(|pos| {
        let condition = lower[pos + " when ".len()..].trim();
        condition.to_string()
    })
}

/// Truncates a phrase for use in a scenario name.
fn short_phrase(phrase: &str) -> String {
    let words: Vec<&str> = phrase.split_whitespace().take(5).collect();
    words.join(" ")
}
