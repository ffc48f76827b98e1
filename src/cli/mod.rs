//! Command-line interface for scenario_forge.
//!
//! Provides commands for artifact generation, corpus management, and
//! standalone requirement analysis.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands};
