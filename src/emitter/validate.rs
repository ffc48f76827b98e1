//! Structural validation of a rendered artifact set.
//!
//! Runs before anything is written: a failed check aborts the run and no
//! partial set ever reaches disk. Checks cover required sections, the
//! shared type name, binding completeness and the method-set invariant
//! between binding and interaction layers.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::EmitterError;

use super::GeneratedArtifactSet;

/// Lifecycle methods excluded from the method-set invariant.
const LIFECYCLE_METHODS: [&str; 3] = ["authenticate", "navigate", "waitForPageReady"];

/// Result of one structural check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Name of the check that was performed.
    pub check_name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Optional message with details about the check result.
    pub message: Option<String>,
}

impl CheckResult {
    /// Create a passing check result.
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            check_name: name.into(),
            passed: true,
            message: None,
        }
    }

    /// Create a failing check result with a reason.
    pub fn fail(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            check_name: name.into(),
            passed: false,
            message: Some(reason.into()),
        }
    }
}

/// Validates the rendered set; returns the passed checks or the first
/// failure as a fatal error.
pub fn validate_artifact_set(set: &GeneratedArtifactSet) -> Result<Vec<CheckResult>, EmitterError> {
    let checks = run_checks(set);

    if let Some(failed) = checks.iter().find(|c| !c.passed) {
        return Err(EmitterError::Validation {
            artifact: failed.check_name.clone(),
            reason: failed
                .message
                .clone()
                .unwrap_or_else(|| "check failed".to_string()),
        });
    }

    Ok(checks)
}

fn run_checks(set: &GeneratedArtifactSet) -> Vec<CheckResult> {
    let mut checks = Vec::new();

    checks.push(section_check(
        "behavior.tag_line",
        set.behavior_script.starts_with('@'),
        "behavior script must start with a tag line",
    ));
    checks.push(section_check(
        "behavior.feature_line",
        set.behavior_script.contains("Feature: "),
        "behavior script is missing the Feature line",
    ));
    checks.push(section_check(
        "behavior.background",
        set.behavior_script.contains("Background:"),
        "behavior script is missing the Background block",
    ));
    checks.push(section_check(
        "behavior.scenario",
        set.behavior_script.contains("Scenario: "),
        "behavior script has no scenario",
    ));

    let import = format!(
        "const {} = require('./{}')",
        set.names.type_name,
        set.names.page_file.trim_end_matches(".js")
    );
    checks.push(section_check(
        "bindings.import",
        set.binding_layer.contains(&import),
        format!("binding layer must import {}", set.names.type_name),
    ));

    let export = format!("module.exports = {};", set.names.type_name);
    checks.push(section_check(
        "page.export",
        set.interaction_layer.contains(&export),
        format!("interaction layer must export {}", set.names.type_name),
    ));

    for method in LIFECYCLE_METHODS {
        checks.push(section_check(
            format!("page.lifecycle.{}", method),
            set.interaction_layer
                .contains(&format!("async {}(", method)),
            format!("interaction layer is missing lifecycle method {}", method),
        ));
    }

    let handler_count = set.binding_layer.matches("async function () {").count();
    let expected = set.distinct_step_count + 2;
    checks.push(section_check(
        "bindings.completeness",
        handler_count == expected,
        format!(
            "expected {} bound handlers (including Background), found {}",
            expected, handler_count
        ),
    ));

    let invoked = invoked_methods(&set.binding_layer);
    let defined = defined_methods(&set.interaction_layer);
    checks.push(section_check(
        "method_set.invariant",
        invoked == defined,
        format!(
            "binding layer invokes {:?} but interaction layer defines {:?}",
            invoked, defined
        ),
    ));

    checks
}

fn section_check(name: impl Into<String>, passed: bool, reason: impl Into<String>) -> CheckResult {
    if passed {
        CheckResult::pass(name)
    } else {
        CheckResult::fail(name, reason)
    }
}

/// Non-lifecycle method names invoked by the binding layer.
pub fn invoked_methods(binding_layer: &str) -> BTreeSet<String> {
    invoke_re()
        .captures_iter(binding_layer)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|name| !LIFECYCLE_METHODS.contains(&name.as_str()))
        .collect()
}

/// Non-lifecycle method names defined by the interaction layer.
pub fn defined_methods(interaction_layer: &str) -> BTreeSet<String> {
    define_re()
        .captures_iter(interaction_layer)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|name| !LIFECYCLE_METHODS.contains(&name.as_str()))
        .collect()
}

fn invoke_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"page\(\)\.([A-Za-z_][A-Za-z0-9_]*)\(").expect("valid regex"))
}

fn define_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"async\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(").expect("valid regex"))
}
