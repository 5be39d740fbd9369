// src/cli/mod.rs
//! Command-line interface definitions
//!
//! Contains the clap command structure for the miner binary: starting the
//! mining shell, benchmarking the provers, and generating configuration
//! templates.

/// Command and option definitions
pub mod commands;

// Re-export for easier access
pub use commands::{Action, BenchmarkOptions, Commands, ConfigOptions, StartOptions};
