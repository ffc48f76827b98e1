//! Error types for scenario-forge operations.
//!
//! Defines error types for the major subsystems:
//! - Corpus building, persistence and loading
//! - Artifact rendering and structural validation
//! - The end-to-end generation pipeline
//!
//! Text analysis is deliberately infallible: malformed input degrades to
//! defaults instead of producing an error.

use thiserror::Error;

/// Errors that can occur while building, persisting or loading the
/// pattern corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Corpus directory '{0}' not found")]
    DirectoryNotFound(String),

    #[error("Corpus collection '{0}' is missing from the registry")]
    MissingCollection(String),

    #[error("Corpus collection '{collection}' is corrupt: {message}")]
    CorruptCollection { collection: String, message: String },

    #[error("Master index is missing or unreadable: {0}")]
    MissingIndex(String),

    #[error("No historical artifacts found under '{0}'")]
    EmptySource(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while rendering or validating generated artifacts.
#[derive(Debug, Error)]
pub enum EmitterError {
    #[error("Structural validation failed for '{artifact}': {reason}")]
    Validation { artifact: String, reason: String },

    #[error("Derived base name is empty for source file '{0}'")]
    EmptyBaseName(String),

    #[error("Tera template rendering error: {0}")]
    Tera(#[from] tera::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during a generation run.
///
/// All fatal paths surface here; the binary converts them into a
/// structured failure at the entry point. Analysis degradation and
/// conflict detection are recovered internally and never reach this type.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input document '{path}' is unreadable: {source}")]
    UnreadableInput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Input document '{0}' is empty")]
    EmptyInput(String),

    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    #[error("Emitter error: {0}")]
    Emitter(#[from] EmitterError),

    #[error("Failed to write artifact '{path}': {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
