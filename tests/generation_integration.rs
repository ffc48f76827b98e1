//! End-to-end generation tests: corpus build, persistence, matching,
//! conflict resolution and artifact emission against real directories.

use std::fs;
use std::path::Path;

use scenario_forge::corpus::{CorpusBuilder, CorpusStore};
use scenario_forge::emitter::validate::{defined_methods, invoked_methods};
use scenario_forge::matcher::PatternMatcher;
use scenario_forge::pipeline::{run, GenerationRequest, RiskLevel, StdFilesystem};

/// Seeds a history directory with historical artifacts and persists the
/// corpus built from it. Returns the corpus directory.
fn seed_corpus(root: &Path, step_files: &[(&str, &str)]) {
    let history = root.join("history");
    fs::create_dir_all(&history).expect("mkdir history");
    for (name, content) in step_files {
        fs::write(history.join(name), content).expect("write history file");
    }

    let mut builder = CorpusBuilder::new();
    builder.scan_directory(&history).expect("scan");
    CorpusStore::new(root.join("corpus"))
        .save(&builder.build())
        .expect("save corpus");
}

fn generation_request(root: &Path, input: &str) -> GenerationRequest {
    GenerationRequest {
        input_path: root.join(input),
        output_dir: root.join("out"),
        corpus_dir: root.join("corpus"),
        write_report: true,
    }
}

const FOOTER_DOC: &str = "Footer visibility\n\nAcceptance Criteria:\n\
- The footer should not be displayed when property X is off\n\
- The header must stay visible\n";

const PLAIN_HISTORY: &[(&str, &str)] = &[
    (
        "billing-invoice-steps.js",
        r#"const { Given, Then } = require('@cucumber/cucumber');
Given('the invoice is archived', async function () {});
Then('the invoice total is 100', async function () {});"#,
    ),
    (
        "search-results-steps.js",
        r#"const { When } = require('@cucumber/cucumber');
When('the search query is "widgets"', async function () {});"#,
    ),
];

#[test]
fn test_full_generation_produces_consistent_artifact_set() {
    let dir = tempfile::tempdir().expect("tempdir");
    seed_corpus(dir.path(), PLAIN_HISTORY);
    fs::write(dir.path().join("footer-visibility-req.txt"), FOOTER_DOC).expect("write input");

    let outcome = run(
        &generation_request(dir.path(), "footer-visibility-req.txt"),
        &StdFilesystem,
    )
    .expect("generation run");

    let out = dir.path().join("out");
    let feature = fs::read_to_string(out.join("footer-visibility.feature")).expect("feature");
    let steps = fs::read_to_string(out.join("footer-visibility-steps.js")).expect("steps");
    let page = fs::read_to_string(out.join("footer-visibility-page.js")).expect("page");

    // Behavior script structure and fixed Background.
    assert!(feature.starts_with("@generated"));
    assert!(feature.contains("Feature: Footer visibility"));
    assert!(feature.contains("Given the user is authenticated"));
    assert!(feature.contains("And the user navigates to the application"));
    assert!(feature.contains("should not be displayed"));

    // Cross-file naming invariant.
    assert!(steps.contains("const FooterVisibilityPage = require('./footer-visibility-page')"));
    assert!(page.contains("class FooterVisibilityPage {"));
    assert!(page.contains("module.exports = FooterVisibilityPage;"));

    // Every non-lifecycle invoked method is defined, and vice versa.
    assert_eq!(invoked_methods(&steps), defined_methods(&page));

    // Binding completeness: one handler per distinct step plus the two
    // fixed Background bindings.
    let handler_count = steps.matches("async function () {").count();
    assert_eq!(
        handler_count,
        outcome.artifact_set.distinct_step_count + 2
    );

    // No scenario from the analysis is dropped.
    let scenario_count = feature.matches("Scenario: ").count();
    assert_eq!(scenario_count, 2);
}

#[test]
fn test_generation_is_idempotent_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    seed_corpus(dir.path(), PLAIN_HISTORY);
    fs::write(dir.path().join("footer.txt"), FOOTER_DOC).expect("write input");

    let request = generation_request(dir.path(), "footer.txt");
    run(&request, &StdFilesystem).expect("first run");
    let first: Vec<String> = ["footer.feature", "footer-steps.js", "footer-page.js"]
        .iter()
        .map(|n| fs::read_to_string(dir.path().join("out").join(n)).expect("read"))
        .collect();

    run(&request, &StdFilesystem).expect("second run");
    let second: Vec<String> = ["footer.feature", "footer-steps.js", "footer-page.js"]
        .iter()
        .map(|n| fs::read_to_string(dir.path().join("out").join(n)).expect("read"))
        .collect();

    assert_eq!(first, second);
}

#[test]
fn test_colliding_steps_are_rewritten_and_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    // The same step pattern registered by two independent files makes the
    // pattern ambiguous; any new use of it must be rewritten.
    seed_corpus(
        dir.path(),
        &[
            (
                "checkout-a-steps.js",
                r#"Given('the application is open', async function () {});"#,
            ),
            (
                "checkout-b-steps.js",
                r#"Given('the application is open', async function () {});"#,
            ),
        ],
    );
    fs::write(dir.path().join("footer.txt"), FOOTER_DOC).expect("write input");

    let outcome = run(&generation_request(dir.path(), "footer.txt"), &StdFilesystem)
        .expect("generation run");

    assert!(outcome.report.counters.conflicts_avoided > 0);
    assert_eq!(outcome.report.risk, RiskLevel::Mitigated);

    let feature =
        fs::read_to_string(dir.path().join("out").join("footer.feature")).expect("feature");
    // The document is UI-flavored, so the rewrite qualifies with "ui".
    assert!(feature.contains("performs ui verification"));
    assert!(!feature.contains("Given the application is open\n"));

    // The rewritten step is still bound and still backed by a page method.
    let steps =
        fs::read_to_string(dir.path().join("out").join("footer-steps.js")).expect("steps");
    let page = fs::read_to_string(dir.path().join("out").join("footer-page.js")).expect("page");
    assert_eq!(invoked_methods(&steps), defined_methods(&page));
}

#[test]
fn test_report_is_written_and_parseable() {
    let dir = tempfile::tempdir().expect("tempdir");
    seed_corpus(dir.path(), PLAIN_HISTORY);
    fs::write(dir.path().join("footer.txt"), FOOTER_DOC).expect("write input");

    run(&generation_request(dir.path(), "footer.txt"), &StdFilesystem).expect("run");

    let raw = fs::read_to_string(dir.path().join("out").join("footer-report.json"))
        .expect("report file");
    let report: serde_json::Value = serde_json::from_str(&raw).expect("valid json");

    assert_eq!(report["risk"], "LOW");
    assert_eq!(
        report["artifacts"],
        serde_json::json!(["footer.feature", "footer-steps.js", "footer-page.js"])
    );
    let confidence = report["confidence"].as_f64().expect("confidence");
    assert!((0.0..=1.0).contains(&confidence));
    assert!(report["counters"]["validations_passed"].as_u64().expect("count") > 0);
}

#[test]
fn test_recommendation_scores_stay_in_bounds() {
    let dir = tempfile::tempdir().expect("tempdir");
    seed_corpus(dir.path(), PLAIN_HISTORY);

    let corpus = CorpusStore::new(dir.path().join("corpus"))
        .load()
        .expect("load corpus");
    let analysis = scenario_forge::analyzer::TextAnalyzer::new().analyze(FOOTER_DOC);

    let recommendations = PatternMatcher::new(&corpus).recommend(&analysis);
    assert!((0.0..=1.0).contains(&recommendations.confidence));
    assert!(recommendations.recommendations.len() <= 10);
    for rec in &recommendations.recommendations {
        assert!(
            (0.0..=1.0).contains(&rec.total),
            "score out of bounds: {}",
            rec.total
        );
    }
}

#[test]
fn test_corpus_round_trip_preserves_conflicts() {
    let dir = tempfile::tempdir().expect("tempdir");
    seed_corpus(
        dir.path(),
        &[
            (
                "a-steps.js",
                r#"Given('Alex clicks Save', async function () {});"#,
            ),
            (
                "b-steps.js",
                r#"Given('Alex clicks Submit', async function () {});"#,
            ),
        ],
    );

    let corpus = CorpusStore::new(dir.path().join("corpus"))
        .load()
        .expect("load corpus");

    // Both literals normalize onto the same placeholder pattern, so the
    // rebuilt registry marks it as a conflict.
    assert_eq!(corpus.conflicts.len(), 1);
    assert!(corpus.safe_patterns.is_empty());
    let record = corpus.conflicts.values().next().expect("conflict record");
    assert_eq!(record.origins.len(), 2);
}
