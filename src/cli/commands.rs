//! CLI command definitions for scenario_forge.
//!
//! This module provides the command-line interface for generating BDD test
//! artifacts from free-form requirement documents.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use crate::analyzer::TextAnalyzer;
use crate::corpus::{CorpusBuilder, CorpusStore, PatternKind};
use crate::pipeline::{self, GenerationRequest, StdFilesystem};

/// Default output directory for generated artifact sets.
const DEFAULT_OUTPUT_DIR: &str = "./generated-artifacts";

/// Default directory for the persisted pattern corpus.
const DEFAULT_CORPUS_DIR: &str = "./corpus";

/// BDD test artifact generator driven by a historical pattern corpus.
#[derive(Parser)]
#[command(name = "scenario_forge")]
#[command(about = "Generate BDD test artifacts from requirement documents")]
#[command(version)]
#[command(
    long_about = "scenario_forge turns a free-form requirement document into a \
consistent BDD artifact set (behavior script, binding layer, interaction layer) \
while avoiding step patterns that collide with an indexed corpus of historical \
artifacts.\n\nExample usage:\n  scenario_forge corpus build --input ./history --output ./corpus\n  scenario_forge generate --input ./reqs/checkout.txt --corpus ./corpus --output ./generated-artifacts"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate a BDD artifact set from a requirement document.
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Build or inspect the historical pattern corpus.
    Corpus(CorpusArgs),

    /// Analyze a requirement document without generating artifacts.
    Analyze(AnalyzeArgs),
}

/// Arguments for the generate command.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Requirement document to generate from.
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Output directory for the artifact set.
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Directory holding the persisted corpus.
    #[arg(short = 'c', long, default_value = DEFAULT_CORPUS_DIR, env = "SCENARIO_FORGE_CORPUS")]
    pub corpus: PathBuf,

    /// Skip writing the JSON generation report.
    #[arg(long)]
    pub no_report: bool,

    /// Output a JSON summary to stdout.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Corpus management entrypoint arguments.
#[derive(Parser, Debug)]
pub struct CorpusArgs {
    /// Corpus subcommand to run.
    #[command(subcommand)]
    pub command: CorpusSubcommand,
}

/// Corpus subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum CorpusSubcommand {
    /// Scan a directory of historical artifacts and persist the corpus.
    Build(CorpusBuildArgs),

    /// Print a summary of a persisted corpus.
    Info(CorpusInfoArgs),
}

/// Arguments for `scenario_forge corpus build`.
#[derive(Parser, Debug)]
pub struct CorpusBuildArgs {
    /// Directory of historical artifacts to index.
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Directory the corpus is persisted to.
    #[arg(short = 'o', long, default_value = DEFAULT_CORPUS_DIR)]
    pub output: PathBuf,

    /// Output a JSON summary to stdout.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `scenario_forge corpus info`.
#[derive(Parser, Debug)]
pub struct CorpusInfoArgs {
    /// Directory holding the persisted corpus.
    #[arg(short = 'c', long, default_value = DEFAULT_CORPUS_DIR, env = "SCENARIO_FORGE_CORPUS")]
    pub corpus: PathBuf,

    /// Output a JSON summary to stdout.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for the analyze command.
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Requirement document to analyze.
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Output the full analysis as JSON instead of a summary.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli())
}

/// Run the CLI with the parsed arguments.
///
/// This is the main entry point for the scenario_forge CLI.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate(args) => run_generate_command(args),
        Commands::Corpus(args) => match args.command {
            CorpusSubcommand::Build(args) => run_corpus_build_command(args),
            CorpusSubcommand::Info(args) => run_corpus_info_command(args),
        },
        Commands::Analyze(args) => run_analyze_command(args),
    }
}

/// JSON output structure for generation results.
#[derive(Debug, Clone, Serialize)]
struct GenerateOutput {
    status: String,
    artifacts: Vec<String>,
    output_directory: String,
    risk: pipeline::RiskLevel,
    confidence: f64,
    conflicts_avoided: u32,
    validations_passed: u32,
}

fn run_generate_command(args: GenerateArgs) -> anyhow::Result<()> {
    let request = GenerationRequest {
        input_path: args.input,
        output_dir: args.output.clone(),
        corpus_dir: args.corpus,
        write_report: !args.no_report,
    };

    let outcome = pipeline::run(&request, &StdFilesystem)?;

    let output = GenerateOutput {
        status: "success".to_string(),
        artifacts: outcome.report.artifacts.clone(),
        output_directory: args.output.display().to_string(),
        risk: outcome.report.risk,
        confidence: outcome.report.confidence,
        conflicts_avoided: outcome.report.counters.conflicts_avoided,
        validations_passed: outcome.report.counters.validations_passed,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("✓ Artifact set generated");
    println!("  Output dir: {}", output.output_directory);
    for name in &output.artifacts {
        println!("  - {}", name);
    }
    println!(
        "  Checks: {} passed, conflicts avoided: {}",
        output.validations_passed, output.conflicts_avoided
    );
    Ok(())
}

/// JSON output structure for corpus build results.
#[derive(Debug, Clone, Serialize)]
struct CorpusBuildOutput {
    status: String,
    patterns: usize,
    conflicts: usize,
    output_directory: String,
}

fn run_corpus_build_command(args: CorpusBuildArgs) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input directory does not exist: {}", args.input.display());
    }

    let mut builder = CorpusBuilder::new();
    builder.scan_directory(&args.input)?;
    let corpus = builder.build();

    let output = CorpusBuildOutput {
        status: "success".to_string(),
        patterns: corpus.pattern_count(),
        conflicts: corpus.conflicts.len(),
        output_directory: args.output.display().to_string(),
    };

    CorpusStore::new(&args.output).save(&corpus)?;
    info!(
        patterns = output.patterns,
        conflicts = output.conflicts,
        "corpus persisted"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("✓ Corpus built");
    println!("  Patterns:  {}", output.patterns);
    println!("  Conflicts: {}", output.conflicts);
    println!("  Saved to:  {}", output.output_directory);
    Ok(())
}

/// JSON output structure for corpus info.
#[derive(Debug, Clone, Serialize)]
struct CorpusInfoOutput {
    features: usize,
    steps: usize,
    pages: usize,
    conflicts: usize,
    safe_patterns: usize,
    vocabulary_terms: usize,
    built_at: Option<String>,
}

fn run_corpus_info_command(args: CorpusInfoArgs) -> anyhow::Result<()> {
    let store = CorpusStore::new(&args.corpus);
    let corpus = store.load()?;
    let index = store.load_index()?;

    let output = CorpusInfoOutput {
        features: corpus.patterns_of_kind(PatternKind::Feature).len(),
        steps: corpus.patterns_of_kind(PatternKind::Step).len(),
        pages: corpus.patterns_of_kind(PatternKind::Page).len(),
        conflicts: corpus.conflicts.len(),
        safe_patterns: corpus.safe_patterns.len(),
        vocabulary_terms: corpus.roles.len() + corpus.actions.len() + corpus.entities.len(),
        built_at: Some(index.built_at.to_rfc3339()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Corpus at {}", args.corpus.display());
    println!("  Feature patterns: {}", output.features);
    println!("  Step patterns:    {}", output.steps);
    println!("  Page patterns:    {}", output.pages);
    println!("  Conflicts:        {}", output.conflicts);
    println!("  Safe patterns:    {}", output.safe_patterns);
    println!("  Vocabulary terms: {}", output.vocabulary_terms);
    if let Some(built_at) = &output.built_at {
        println!("  Built at:         {}", built_at);
    }
    Ok(())
}

fn run_analyze_command(args: AnalyzeArgs) -> anyhow::Result<()> {
    let text = read_input(&args.input)?;
    let analysis = TextAnalyzer::new().analyze(&text);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!("Title:  {}", analysis.title);
    println!("Domain: {}", analysis.domain);
    println!("Tags:   {}", analysis.tags.join(" "));
    println!("Business rules:");
    for rule in &analysis.business_rules {
        println!("  - {}", rule);
    }
    println!("Scenarios:");
    for scenario in &analysis.scenarios {
        println!("  - {}", scenario.name);
    }
    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    if text.trim().is_empty() {
        warn!(path = %path.display(), "input document is empty");
        anyhow::bail!("Input document is empty: {}", path.display());
    }
    Ok(text)
}
