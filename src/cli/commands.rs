// src/cli/commands.rs
use crate::types::BackendType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// STARK Miner CLI - proof-of-work proof search in Rust
#[derive(Parser, Debug)]
#[command(name = "stark-miner-rs")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// The action to perform (start mining, run benchmarks, or generate config)
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands for the miner application
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Start the mining shell with specified options
    Start(StartOptions),

    /// Run prover throughput benchmarks
    Benchmark(BenchmarkOptions),

    /// Generate configuration file template
    Config(ConfigOptions),
}

/// Options for starting the mining shell
#[derive(Parser, Debug)]
pub struct StartOptions {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Total threads for the worker pool (overrides config)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Prover backend to use (overrides config)
    #[arg(short, long)]
    pub backend: Option<BackendType>,
}

/// Options for running prover benchmarks
#[derive(Parser, Debug)]
pub struct BenchmarkOptions {
    /// Prover backend to benchmark
    #[arg(short, long, default_value_t = BackendType::Reference)]
    pub backend: BackendType,

    /// Duration of benchmark in seconds
    #[arg(short, long, default_value_t = 30)]
    pub duration: u64,

    /// Trace length per proof attempt
    #[arg(short, long, default_value_t = 4096)]
    pub length: u64,

    /// Number of concurrent attempt threads
    #[arg(short, long, default_value_t = num_cpus::get())]
    pub threads: usize,
}

/// Options for generating configuration files
#[derive(Parser, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = "config.toml")]
    pub output: PathBuf,
}
