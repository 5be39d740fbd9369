// src/miner/mod.rs
//! Core proof-search functionality
//!
//! This module contains all components of the parallel proof-search engine:
//! - Proof oracle backends (reference and parallel)
//! - Nonce distribution across the worker pool
//! - The worker loop and the batch coordinator
//! - Difficulty target evaluation

/// Proof oracle backends
///
/// Contains the [`oracle::ProofOracle`] interface and its two
/// implementations: a sequential reference prover and a prover with
/// internal rayon parallelism.
pub mod oracle;

/// Nonce distribution
///
/// Hands each candidate nonce of a batch to exactly one worker and carries
/// the batch's cancellation state.
pub mod distributor;

/// Worker loop implementation
///
/// Contains the per-thread loop that claims nonces, drives proof attempts,
/// and publishes the first success.
pub mod worker;

/// Batch coordination
///
/// Sizes the worker pool, runs a batch to a terminal state, and exposes
/// cancellation to external callers.
pub mod coordinator;

/// Difficulty target evaluation
///
/// The pure predicate gating proof digests, plus the [`target::Target`]
/// bound type.
pub mod target;

// Re-export main components for cleaner imports
pub use self::coordinator::{
    MiningContext, MiningCoordinator, MiningOutcome, NonceBatch, ProofResult,
};
pub use self::distributor::WorkDistributor;
pub use self::oracle::{ParallelProver, ProofOracle, ReferenceProver};
pub use self::target::{Target, meets_target};
pub use self::worker::Worker;
