//! Artifact emission: rendering the three coupled output texts.
//!
//! The emitter builds one shared method table from the distinct resolved
//! steps and renders the behavior script, binding layer and interaction
//! layer from it, so the set of non-lifecycle methods invoked by the
//! binding layer equals the set defined by the interaction layer by
//! construction. Structural validation runs on the rendered set before
//! anything is written.

pub mod naming;
mod templates;
pub mod validate;

pub use naming::{derive_method_name, instance_name, sanitize_base_name, type_name};
pub use validate::{validate_artifact_set, CheckResult};

use serde::{Deserialize, Serialize};
use tera::{Context, Tera};
use tracing::debug;

use crate::analyzer::Analysis;
use crate::error::EmitterError;
use crate::resolver::{distinct_steps, ResolvedScenario, ResolvedStep, StepKeyword};

/// Ordered keyword-trigger rows for interaction method bodies. The first
/// row matching the originating step text decides the body; unmatched
/// steps get the no-op body.
const BODY_TABLE: &[(&[&str], &str)] = &[
    (
        &["not displayed", "not be displayed", "not visible", "hidden"],
        "    await this.waitForPageReady();\n    const displayed = await browser.isDisplayed(this.root);\n    return displayed === false;",
    ),
    (
        &["displayed", "visible", "shown"],
        "    await this.waitForPageReady();\n    const displayed = await browser.isDisplayed(this.root);\n    return displayed === true;",
    ),
    (
        &["turned on", "is on", "enabled"],
        "    await browser.setFlag(this.root, true);\n    return true;",
    ),
    (
        &["turned off", "is off", "disabled"],
        "    await browser.setFlag(this.root, false);\n    return true;",
    ),
    (
        &["click", "select", "submit", "press", "enter", "interact"],
        "    await this.waitForPageReady();\n    await browser.perform(this.root);\n    return true;",
    ),
    (
        &["verify", "should", "match", "contain"],
        "    await this.waitForPageReady();\n    return await browser.verify(this.root);",
    ),
];

/// Body for steps matching no trigger row.
const DEFAULT_BODY: &str = "    return true;";

/// Derived names binding the three artifacts together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactNames {
    /// Sanitized identifier shared by all three artifacts.
    pub base_name: String,
    /// PascalCase type exported by the interaction layer and imported by
    /// the binding layer.
    pub type_name: String,
    /// camelCase instance variable in the binding layer.
    pub instance_name: String,
    /// Behavior script file name.
    pub feature_file: String,
    /// Binding layer file name.
    pub steps_file: String,
    /// Interaction layer file name.
    pub page_file: String,
}

impl ArtifactNames {
    /// Derives all names from a source file name.
    pub fn derive(source_file_name: &str) -> Result<Self, EmitterError> {
        let base_name = sanitize_base_name(source_file_name)
            .ok_or_else(|| EmitterError::EmptyBaseName(source_file_name.to_string()))?;
        let type_name = type_name(&base_name);
        let instance_name = instance_name(&type_name);
        Ok(Self {
            feature_file: format!("{}.feature", base_name),
            steps_file: format!("{}-steps.js", base_name),
            page_file: format!("{}-page.js", base_name),
            base_name,
            type_name,
            instance_name,
        })
    }
}

/// The three rendered artifacts, keyed by their shared names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedArtifactSet {
    pub names: ArtifactNames,
    /// Gherkin behavior script.
    pub behavior_script: String,
    /// Cucumber step-definition file.
    pub binding_layer: String,
    /// Page-object file.
    pub interaction_layer: String,
    /// Number of distinct bound steps (excludes the fixed Background).
    pub distinct_step_count: usize,
}

#[derive(Debug, Serialize)]
struct BindingContext {
    keyword: &'static str,
    text: String,
    method: String,
    is_then: bool,
}

#[derive(Debug, Serialize)]
struct MethodContext {
    name: String,
    body: &'static str,
}

#[derive(Debug, Serialize)]
struct StepContext {
    keyword: &'static str,
    text: String,
}

#[derive(Debug, Serialize)]
struct ScenarioContext {
    name: String,
    steps: Vec<StepContext>,
}

/// Renderer for the three coupled artifacts.
pub struct ArtifactEmitter {
    tera: Tera,
}

impl Default for ArtifactEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactEmitter {
    /// Creates an emitter with the embedded templates registered.
    pub fn new() -> Self {
        let mut tera = Tera::default();
        tera.add_raw_templates([
            (templates::FEATURE_TEMPLATE_NAME, templates::FEATURE_TEMPLATE),
            (templates::STEPS_TEMPLATE_NAME, templates::STEPS_TEMPLATE),
            (templates::PAGE_TEMPLATE_NAME, templates::PAGE_TEMPLATE),
        ])
        .expect("embedded templates are valid");
        Self { tera }
    }

    /// Renders the full artifact set from the analysis and the resolved
    /// scenarios.
    pub fn emit(
        &self,
        analysis: &Analysis,
        scenarios: &[ResolvedScenario],
        source_file_name: &str,
    ) -> Result<GeneratedArtifactSet, EmitterError> {
        let names = ArtifactNames::derive(source_file_name)?;
        let distinct = distinct_steps(scenarios);

        let behavior_script = self.render_behavior(analysis, scenarios)?;
        let binding_layer = self.render_bindings(&names, &distinct)?;
        let interaction_layer = self.render_page(&names, &distinct)?;

        debug!(
            base_name = %names.base_name,
            scenarios = scenarios.len(),
            distinct_steps = distinct.len(),
            "artifact set rendered"
        );

        Ok(GeneratedArtifactSet {
            names,
            behavior_script,
            binding_layer,
            interaction_layer,
            distinct_step_count: distinct.len(),
        })
    }

    fn render_behavior(
        &self,
        analysis: &Analysis,
        scenarios: &[ResolvedScenario],
    ) -> Result<String, EmitterError> {
        let scenario_contexts: Vec<ScenarioContext> = scenarios
            .iter()
            .map(|s| ScenarioContext {
                name: s.name.clone(),
                steps: s
                    .steps
                    .iter()
                    .map(|step| StepContext {
                        keyword: step.keyword.as_str(),
                        text: step.text.clone(),
                    })
                    .collect(),
            })
            .collect();

        let mut context = Context::new();
        context.insert("tags", &analysis.tags.join(" "));
        context.insert("title", &analysis.title);
        context.insert("scenarios", &scenario_contexts);
        Ok(self.tera.render(templates::FEATURE_TEMPLATE_NAME, &context)?)
    }

    fn render_bindings(
        &self,
        names: &ArtifactNames,
        distinct: &[ResolvedStep],
    ) -> Result<String, EmitterError> {
        let bindings: Vec<BindingContext> = distinct
            .iter()
            .map(|step| BindingContext {
                keyword: step.binding_keyword.as_str(),
                text: escape_single_quotes(&step.text),
                method: derive_method_name(&step.text),
                is_then: step.binding_keyword == StepKeyword::Then,
            })
            .collect();

        let mut context = Context::new();
        context.insert("type_name", &names.type_name);
        context.insert("instance_name", &names.instance_name);
        context.insert(
            "page_module",
            &names.page_file.trim_end_matches(".js").to_string(),
        );
        context.insert("bindings", &bindings);
        Ok(self.tera.render(templates::STEPS_TEMPLATE_NAME, &context)?)
    }

    fn render_page(
        &self,
        names: &ArtifactNames,
        distinct: &[ResolvedStep],
    ) -> Result<String, EmitterError> {
        // One method per distinct derived name; the first originating step
        // decides the body.
        let mut seen = std::collections::HashSet::new();
        let methods: Vec<MethodContext> = distinct
            .iter()
            .filter_map(|step| {
                let name = derive_method_name(&step.text);
                if seen.insert(name.clone()) {
                    Some(MethodContext {
                        name,
                        body: method_body(&step.text),
                    })
                } else {
                    None
                }
            })
            .collect();

        let mut context = Context::new();
        context.insert("type_name", &names.type_name);
        context.insert("methods", &methods);
        Ok(self.tera.render(templates::PAGE_TEMPLATE_NAME, &context)?)
    }
}

/// Picks a method body from the ordered trigger table.
fn method_body(step_text: &str) -> &'static str {
    let lower = step_text.to_lowercase();
    for (triggers, body) in BODY_TABLE {
        if triggers.iter().any(|t| lower.contains(t)) {
            return body;
        }
    }
    DEFAULT_BODY
}

fn escape_single_quotes(text: &str) -> String {
    text.replace('\'', "\\'")
}
