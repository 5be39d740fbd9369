//! STARK Miner - parallel zero-knowledge proof-of-work search in Rust
//!
//! This crate implements a proof-of-work mining engine where the "hash" is a
//! STARK-style proof: a batch of candidate nonces is partitioned across a
//! bounded worker pool, each worker drives proof generation per candidate,
//! and the first digest to satisfy the difficulty target wins. Features:
//! - Interchangeable proof backends (sequential reference, rayon-parallel)
//! - At-most-once nonce distribution with cooperative cancellation
//! - Pool sizing that never oversubscribes the host
//! - A versioned request/effect shell for embedding

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Miner core implementation including proof backends and coordination
pub mod miner;

/// Shell adapter: request/effect boundary for embedding hosts
pub mod shell;

/// Statistics collection and reporting functionality
pub mod stats;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use cli::Commands;
pub use config::{Config, PoolConfig};
pub use miner::{
    MiningContext, MiningCoordinator, MiningOutcome, NonceBatch, ParallelProver, ProofOracle,
    ProofResult, ReferenceProver, Target, WorkDistributor, Worker, meets_target,
};
pub use shell::{MiningEffect, MiningRequest, ShellAdapter, ShellState};
pub use stats::{BatchResult, HardwareStats, MiningStats, StatsReporter};
pub use types::{BackendType, Digest, ProgressUpdate, Proof};
pub use utils::{MinerError, init_logging};
