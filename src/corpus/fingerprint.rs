//! Structural fingerprinting of step and pattern text.
//!
//! A fingerprint replaces literal values with typed placeholders so that
//! structurally identical steps with different literals ("click Save" vs
//! "click Submit") compare equal. Replacement order matters: quoted strings
//! first (they may contain digits), then numbers, then capitalized proper
//! nouns. Normalization lower-cases the fingerprint for registry lookups.

use std::sync::OnceLock;

use regex::Regex;

/// Placeholder for quoted string literals.
pub const STRING_PLACEHOLDER: &str = "{string}";

/// Placeholder for numeric literals.
pub const NUMBER_PLACEHOLDER: &str = "{number}";

/// Placeholder for capitalized proper nouns.
pub const PROPER_NOUN_PLACEHOLDER: &str = "{properNoun}";

/// Computes the structural fingerprint of a step or pattern text.
///
/// Literals become typed placeholders and whitespace is collapsed; casing
/// of the surrounding words is preserved.
pub fn structural_fingerprint(text: &str) -> String {
    let replaced = quoted_re().replace_all(text, STRING_PLACEHOLDER);
    let replaced = number_re().replace_all(&replaced, NUMBER_PLACEHOLDER);
    let replaced = proper_noun_re().replace_all(&replaced, |caps: &regex::Captures| {
        // Words at the start of the text are capitalized by convention, not
        // because they are proper nouns; leave them alone.
        if caps.get(0).map(|m| m.start()) == Some(0) {
            caps[0].to_string()
        } else {
            PROPER_NOUN_PLACEHOLDER.to_string()
        }
    });
    collapse_whitespace(&replaced)
}

/// Normalizes a literal step for conflict-registry lookups: structural
/// fingerprint, then lower-cased with whitespace collapsed.
///
/// Placeholder substitution happens before lower-casing so proper nouns are
/// still detectable; the placeholders themselves keep their canonical casing.
pub fn normalize_step(text: &str) -> String {
    let fingerprint = structural_fingerprint(text);
    let lowered = fingerprint.to_lowercase();
    // Restore the canonical placeholder casing lost by lower-casing.
    lowered.replace("{propernoun}", PROPER_NOUN_PLACEHOLDER)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn quoted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""[^"]*"|'[^']*'"#).expect("valid regex"))
}

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d+(?:\.\d+)?\b").expect("valid regex"))
}

fn proper_noun_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Z][a-zA-Z]*\b").expect("valid regex"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_replaces_quoted_strings() {
        assert_eq!(
            structural_fingerprint(r#"the user enters "hello" in the field"#),
            "the user enters {string} in the field"
        );
    }

    #[test]
    fn test_fingerprint_replaces_numbers() {
        assert_eq!(
            structural_fingerprint("the cart shows 3 items and 19.99 total"),
            "the cart shows {number} items and {number} total"
        );
    }

    #[test]
    fn test_fingerprint_replaces_proper_nouns() {
        assert_eq!(
            structural_fingerprint("the user clicks Save"),
            "the user clicks {properNoun}"
        );
    }

    #[test]
    fn test_fingerprint_keeps_leading_capital() {
        // A sentence-initial capital is a convention, not a proper noun.
        assert_eq!(
            structural_fingerprint("Alex clicks Save"),
            "Alex clicks {properNoun}"
        );
    }

    #[test]
    fn test_fingerprint_equates_different_literals() {
        assert_eq!(
            structural_fingerprint("the user clicks Save"),
            structural_fingerprint("the user clicks Submit")
        );
    }

    #[test]
    fn test_fingerprint_collapses_whitespace() {
        assert_eq!(
            structural_fingerprint("the   user\tclicks   here"),
            "the user clicks here"
        );
    }

    #[test]
    fn test_normalize_step_lowercases_around_placeholders() {
        assert_eq!(
            normalize_step("The User Clicks Save"),
            "the {properNoun} {properNoun} {properNoun}"
        );
    }

    #[test]
    fn test_normalize_step_matches_across_case() {
        assert_eq!(
            normalize_step("the user enters 5 items"),
            normalize_step("The  user enters 12 items")
        );
    }
}
