//! scenario-forge: BDD test artifact generator.
//!
//! This library turns unstructured requirement documents into three
//! mutually-consistent test artifacts (a Gherkin behavior script, a
//! step-binding layer and a page interaction layer) while guaranteeing
//! that no emitted step pattern collides with a pattern already
//! registered in the historical corpus.

// Core modules
pub mod analyzer;
pub mod cli;
pub mod corpus;
pub mod emitter;
pub mod error;
pub mod matcher;
pub mod pipeline;
pub mod resolver;

// Re-export commonly used error types
pub use error::{CorpusError, EmitterError, PipelineError};
