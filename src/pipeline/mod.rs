//! End-to-end generation pipeline.
//!
//! One run is single-threaded and run-to-completion: read the requirement
//! document, analyze it, load the corpus snapshot, rank recommendations,
//! resolve conflicts, render and validate the artifact set, then write
//! everything in one pass. Emission is all-or-nothing: a validation
//! failure aborts before any file is written.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analyzer::TextAnalyzer;
use crate::corpus::CorpusStore;
use crate::emitter::{validate_artifact_set, ArtifactEmitter, GeneratedArtifactSet};
use crate::error::PipelineError;
use crate::matcher::PatternMatcher;
use crate::resolver::{ConflictResolver, GenerationCounters};

/// Report file suffix, appended to the base name.
const REPORT_SUFFIX: &str = "-report.json";

/// Filesystem boundary used by the pipeline.
///
/// The production implementation is std::fs; tests substitute their own.
pub trait Filesystem {
    fn read(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, text: &str) -> io::Result<()>;
    fn ensure_directory(&self, path: &Path) -> io::Result<()>;
}

/// std::fs-backed filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFilesystem;

impl Filesystem for StdFilesystem {
    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        std::fs::write(path, text)
    }

    fn ensure_directory(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

/// Credentials handed to a browser driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Outcome of a browser authentication attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthOutcome {
    pub success: bool,
    pub final_url: Option<String>,
    pub error: Option<String>,
}

/// Browser automation boundary. The generated artifacts target a browser
/// runner, but this crate never drives one; the trait only marks the seam.
pub trait BrowserDriver {
    fn authenticate(&self, url: &str, credentials: &Credentials) -> AuthOutcome;
}

/// Parameters of one generation run.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Requirement document to read.
    pub input_path: PathBuf,
    /// Directory the artifact set is written to.
    pub output_dir: PathBuf,
    /// Directory holding the persisted corpus.
    pub corpus_dir: PathBuf,
    /// Whether to write the JSON generation report next to the artifacts.
    pub write_report: bool,
}

/// Risk classification recorded in the generation report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "MITIGATED")]
    Mitigated,
    #[serde(rename = "LOW")]
    Low,
}

impl RiskLevel {
    fn classify(counters: &GenerationCounters) -> Self {
        if counters.conflicts_avoided > 0 {
            RiskLevel::Mitigated
        } else {
            RiskLevel::Low
        }
    }
}

/// JSON generation report written alongside the artifact set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    /// File names of the written artifacts.
    pub artifacts: Vec<String>,
    /// Counters accumulated during the run.
    pub counters: GenerationCounters,
    /// Risk classification.
    pub risk: RiskLevel,
    /// Matcher confidence over the recommendation set.
    pub confidence: f64,
    /// When the run completed.
    pub generated_at: DateTime<Utc>,
}

/// Result of one completed generation run.
#[derive(Debug)]
pub struct GenerationOutcome {
    /// The rendered artifact set, as written.
    pub artifact_set: GeneratedArtifactSet,
    /// The report (written to disk only when requested).
    pub report: GenerationReport,
    /// Paths of all files written.
    pub written: Vec<PathBuf>,
}

/// Runs one generation end to end.
pub fn run(request: &GenerationRequest, fs: &dyn Filesystem) -> Result<GenerationOutcome, PipelineError> {
    let input_display = request.input_path.display().to_string();

    let text = fs
        .read(&request.input_path)
        .map_err(|source| PipelineError::UnreadableInput {
            path: input_display.clone(),
            source,
        })?;
    if text.trim().is_empty() {
        return Err(PipelineError::EmptyInput(input_display));
    }

    let analysis = TextAnalyzer::new().analyze(&text);
    info!(
        title = %analysis.title,
        domain = %analysis.domain,
        scenarios = analysis.scenarios.len(),
        "document analyzed"
    );

    let corpus = CorpusStore::new(&request.corpus_dir).load()?;

    let matcher = PatternMatcher::new(&corpus);
    let recommendations = matcher.recommend(&analysis);
    for justification in &recommendations.justifications {
        info!("{}", justification);
    }

    let mut resolver = ConflictResolver::new(&corpus, analysis.domain.clone());
    let scenarios = resolver.resolve_scenarios(&analysis.scenarios);
    let mut counters = resolver.counters();

    let source_file_name = request
        .input_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or(input_display);
    let artifact_set = ArtifactEmitter::new().emit(&analysis, &scenarios, &source_file_name)?;

    let checks = validate_artifact_set(&artifact_set)?;
    counters.validations_passed = checks.len() as u32;

    let report = GenerationReport {
        artifacts: vec![
            artifact_set.names.feature_file.clone(),
            artifact_set.names.steps_file.clone(),
            artifact_set.names.page_file.clone(),
        ],
        counters,
        risk: RiskLevel::classify(&counters),
        confidence: recommendations.confidence,
        generated_at: Utc::now(),
    };

    // Validation passed for the whole set; write everything at once.
    fs.ensure_directory(&request.output_dir)?;
    let mut written = Vec::new();
    for (name, content) in [
        (&artifact_set.names.feature_file, &artifact_set.behavior_script),
        (&artifact_set.names.steps_file, &artifact_set.binding_layer),
        (&artifact_set.names.page_file, &artifact_set.interaction_layer),
    ] {
        let path = request.output_dir.join(name);
        fs.write(&path, content)
            .map_err(|source| PipelineError::WriteFailed {
                path: path.display().to_string(),
                source,
            })?;
        written.push(path);
    }

    if request.write_report {
        let path = request
            .output_dir
            .join(format!("{}{}", artifact_set.names.base_name, REPORT_SUFFIX));
        fs.write(&path, &serde_json::to_string_pretty(&report)?)
            .map_err(|source| PipelineError::WriteFailed {
                path: path.display().to_string(),
                source,
            })?;
        written.push(path);
    }

    if counters.conflicts_avoided > 0 {
        warn!(
            conflicts_avoided = counters.conflicts_avoided,
            "steps were rewritten to avoid registered pattern collisions"
        );
    }
    info!(
        files = written.len(),
        risk = ?report.risk,
        "generation complete"
    );

    Ok(GenerationOutcome {
        artifact_set,
        report,
        written,
    })
}
