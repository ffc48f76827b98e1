//! Curated keyword tables for domain, entity, action, role and tag detection.
//!
//! Detection is a single pass over ordered lookup tables rather than ad-hoc
//! keyword chains, so each table row is independently testable and the first
//! matching row always wins.

use std::collections::BTreeSet;

/// Domain returned when no keyword row matches.
pub const DEFAULT_DOMAIN: &str = "general";

/// Ordered (domain, trigger keywords) rows. The first row with any keyword
/// present in the lower-cased text decides the domain.
const DOMAIN_TABLE: &[(&str, &[&str])] = &[
    (
        "authentication",
        &["login", "log in", "password", "sign in", "logout", "credential", "session"],
    ),
    (
        "billing",
        &["invoice", "payment", "billing", "charge", "refund", "subscription", "checkout"],
    ),
    (
        "search",
        &["search", "filter", "query", "autocomplete", "suggestion"],
    ),
    (
        "reporting",
        &["report", "export", "dashboard", "chart", "analytics"],
    ),
    (
        "ui",
        &[
            "footer", "header", "banner", "button", "display", "page", "screen", "menu",
            "modal", "layout", "tooltip", "widget",
        ],
    ),
];

/// Entity terms recognized by substring membership.
const ENTITY_TERMS: &[&str] = &[
    "footer", "header", "banner", "button", "link", "menu", "modal", "form", "field",
    "table", "page", "property", "user", "account", "invoice", "report", "message",
    "notification", "dropdown", "checkbox", "tab", "panel", "dialog", "icon", "label",
];

/// Action terms recognized by substring membership.
const ACTION_TERMS: &[&str] = &[
    "display", "click", "select", "submit", "navigate", "login", "logout", "verify",
    "create", "update", "delete", "enable", "disable", "search", "upload", "download",
    "hover", "scroll", "toggle", "enter", "validate",
];

/// Role terms recognized by substring membership.
const ROLE_TERMS: &[&str] = &[
    "admin", "administrator", "customer", "user", "manager", "operator", "guest",
    "analyst", "agent", "supervisor",
];

/// Ordered (tag, trigger keywords) rows for supplemental tags. The baseline
/// tag is always present and lives in the analyzer, not here.
const TAG_TABLE: &[(&str, &[&str])] = &[
    ("@smoke", &["smoke"]),
    ("@regression", &["regression"]),
    ("@critical", &["critical", "high priority", "blocker"]),
    ("@accessibility", &["accessibility", "aria", "screen reader"]),
];

/// Identifies the business domain of a text via the ordered domain table.
///
/// Deterministic: the first table row with a matching keyword wins.
/// Falls back to [`DEFAULT_DOMAIN`] when nothing matches.
pub fn identify_domain(text: &str) -> String {
    let lower = text.to_lowercase();
    for (domain, keywords) in DOMAIN_TABLE {
        if keywords.iter().any(|k| lower.contains(k)) {
            return (*domain).to_string();
        }
    }
    DEFAULT_DOMAIN.to_string()
}

/// Extracts entity terms present in the text (case-insensitive substring).
pub fn extract_entities(text: &str) -> BTreeSet<String> {
    extract_terms(text, ENTITY_TERMS)
}

/// Extracts action terms present in the text (case-insensitive substring).
pub fn extract_actions(text: &str) -> BTreeSet<String> {
    extract_terms(text, ACTION_TERMS)
}

/// Extracts role terms present in the text (case-insensitive substring).
pub fn extract_roles(text: &str) -> BTreeSet<String> {
    extract_terms(text, ROLE_TERMS)
}

/// Returns supplemental tags triggered by keywords in the text, in table order.
pub fn triggered_tags(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TAG_TABLE
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(tag, _)| (*tag).to_string())
        .collect()
}

fn extract_terms(text: &str, terms: &[&str]) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    terms
        .iter()
        .filter(|term| lower.contains(*term))
        .map(|term| (*term).to_string())
        .collect()
}
