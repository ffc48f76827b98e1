//! Embedded tera templates for the three generated artifacts.
//!
//! Templates are registered once per emitter instance; the rendering
//! context is fully deterministic so identical inputs produce byte
//! identical artifacts.

/// Template name for the behavior script.
pub const FEATURE_TEMPLATE_NAME: &str = "behavior.feature";
/// Template name for the binding layer.
pub const STEPS_TEMPLATE_NAME: &str = "bindings.js";
/// Template name for the interaction layer.
pub const PAGE_TEMPLATE_NAME: &str = "page.js";

/// Behavior script: tag line, feature title, the fixed Background block,
/// then one block per scenario. The Background block is a compliance
/// requirement reused verbatim, never derived from the analysis.
pub const FEATURE_TEMPLATE: &str = "\
{{ tags }}
Feature: {{ title }}

  Background:
    Given the user is authenticated
    And the user navigates to the application
{% for scenario in scenarios %}
  Scenario: {{ scenario.name }}
{% for step in scenario.steps %}    {{ step.keyword }} {{ step.text }}
{% endfor %}{% endfor %}";

/// Binding layer: imports the interaction type, keeps one run-scoped
/// mutable instance, binds the two fixed Background steps and one handler
/// per distinct resolved step.
pub const STEPS_TEMPLATE: &str = "\
const { Given, When, Then } = require('@cucumber/cucumber');
const assert = require('assert');
const {{ type_name }} = require('./{{ page_module }}');

let {{ instance_name }} = null;

function page() {
  if (!{{ instance_name }}) {
    {{ instance_name }} = new {{ type_name }}();
  }
  return {{ instance_name }};
}

Given('the user is authenticated', async function () {
  await page().authenticate();
});

Given('the user navigates to the application', async function () {
  await page().navigate();
});
{% for binding in bindings %}
{{ binding.keyword }}('{{ binding.text }}', async function () {
{% if binding.is_then %}  const result = await page().{{ binding.method }}();
  assert.strictEqual(result, true);
{% else %}  await page().{{ binding.method }}();
{% endif %}});
{% endfor %}";

/// Interaction layer: the two fixed lifecycle methods, the page-ready wait
/// and one generated method per distinct derived method name.
pub const PAGE_TEMPLATE: &str = "\
class {{ type_name }} {
  async authenticate() {
    await browser.url('/login');
    await browser.login(process.env.TEST_USER, process.env.TEST_PASSWORD);
    return true;
  }

  async navigate() {
    await browser.url('/');
    await this.waitForPageReady();
    return true;
  }

  async waitForPageReady() {
    await browser.waitUntil(() => browser.isReady(), { timeout: 10000 });
    return true;
  }
{% for method in methods %}
  async {{ method.name }}() {
{{ method.body }}
  }
{% endfor %}}

module.exports = {{ type_name }};
";
