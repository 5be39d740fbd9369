// src/config/mod.rs
//! Configuration management for the miner
//!
//! This module handles all configuration-related functionality including:
//! - Loading and parsing configuration files
//! - Generating configuration templates
//! - Sizing the worker pool from the environment and file settings
//!
//! The configuration uses TOML format; total pool parallelism can be
//! overridden with the `MINING_THREADS` environment variable.

/// Core configuration implementation
///
/// Contains the [`Config`] and [`PoolConfig`] types that define the miner's
/// configuration structure and pool sizing behavior.
pub mod config;

// Re-export key items for easy access
pub use config::{Config, DEFAULT_THREADS_PER_WORKER, MINING_THREADS_ENV, PoolConfig};

use crate::utils::error::MinerError;
use std::path::PathBuf;

/// Loads miner configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the configuration file (anything convertible to PathBuf)
///
/// # Returns
/// * `Ok(Config)` - Successfully loaded configuration
/// * `Err(MinerError)` - If the file couldn't be read or parsed
pub fn load(path: impl Into<PathBuf>) -> Result<Config, MinerError> {
    Config::load(path)
}

/// Generates a commented configuration template
///
/// # Returns
/// String containing a ready-to-use TOML configuration template
pub fn generate_template() -> String {
    Config::generate_template()
}
