// src/miner/oracle/mod.rs
//! Proof oracle implementations
//!
//! This module contains the proof generation backends and their common
//! interface. Proof generation is the expensive unit of work in a mining
//! run: one call covers one `(commitment, nonce)` pair and takes wall-clock
//! seconds at realistic trace lengths.
//!
//! Two interchangeable backends are provided:
//! - A sequential reference prover (fallback, deterministic baseline)
//! - A prover with internal rayon parallelism over trace segments
//!
//! Both are pure: identical inputs always produce identical output, which is
//! what lets the parallel backend be cross-checked against the reference.

/// Sequential reference prover
///
/// Computes segment commitments one after another on the calling thread.
pub mod reference;

/// Prover with internal parallelism
///
/// Splits segment commitment work across a dedicated thread pool whose size
/// is the per-worker thread budget.
pub mod parallel;

use sha2::{Digest as _, Sha256};
use std::ops::Range;

use crate::miner::target::{Target, meets_target};
use crate::types::{BackendType, Digest, Proof};
use crate::utils::error::MinerError;

/// Rows hashed into a single segment commitment
pub const TRACE_SEGMENT_ROWS: u64 = 256;

/// Common interface for proof generation backends
///
/// The coordinator and workers only ever see this trait; which backend is
/// bound is decided once at startup.
pub trait ProofOracle: Send + Sync {
    /// Generates a proof for one candidate nonce
    ///
    /// # Arguments
    /// * `length` - Trace length in rows; must be at least one
    /// * `commitment` - Digest of the block content being mined
    /// * `nonce` - The candidate value for this attempt
    ///
    /// # Returns
    /// The proof artifact and its digest, or an error if the inputs are
    /// unusable. Deterministic for identical inputs.
    fn generate(
        &self,
        length: u64,
        commitment: &Digest,
        nonce: &Digest,
    ) -> Result<(Proof, Digest), MinerError>;

    /// Generates a proof and evaluates its digest against a target
    ///
    /// # Returns
    /// `true` if the proof digest satisfies the target difficulty
    fn check(
        &self,
        length: u64,
        commitment: &Digest,
        nonce: &Digest,
        target: &Target,
    ) -> Result<bool, MinerError> {
        let (_, digest) = self.generate(length, commitment, nonce)?;
        Ok(meets_target(&digest, target))
    }

    /// Identifies the backend implementation
    fn backend(&self) -> BackendType;
}

/// Rejects trace lengths the construction cannot cover
pub(crate) fn validate_length(length: u64) -> Result<(), MinerError> {
    if length == 0 {
        return Err(MinerError::OracleError(
            "trace length must be at least one row".to_string(),
        ));
    }
    Ok(())
}

/// Splits `0..length` into segment-sized row ranges
pub(crate) fn segment_ranges(length: u64) -> Vec<Range<u64>> {
    let mut ranges = Vec::with_capacity(length.div_ceil(TRACE_SEGMENT_ROWS) as usize);
    let mut start = 0;
    while start < length {
        let end = (start + TRACE_SEGMENT_ROWS).min(length);
        ranges.push(start..end);
        start = end;
    }
    ranges
}

/// One execution trace row, derived from the attempt inputs and row index
pub(crate) fn trace_row(commitment: &Digest, nonce: &Digest, index: u64) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(commitment.as_bytes());
    hasher.update(nonce.as_bytes());
    hasher.update(index.to_le_bytes());
    hasher.finalize().into()
}

/// Commits to one contiguous range of trace rows
///
/// Rows within a segment are absorbed in order, so the commitment is
/// independent of how segments are scheduled across threads.
pub(crate) fn segment_commitment(commitment: &Digest, nonce: &Digest, rows: Range<u64>) -> Digest {
    let mut hasher = Sha256::new();
    for index in rows {
        hasher.update(trace_row(commitment, nonce, index));
    }
    Digest::new(hasher.finalize().into())
}

/// Seals the finished proof into its digest
pub(crate) fn seal_proof(
    length: u64,
    commitment: &Digest,
    nonce: &Digest,
    segments: &[Digest],
) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(commitment.as_bytes());
    hasher.update(nonce.as_bytes());
    hasher.update(length.to_le_bytes());
    for segment in segments {
        hasher.update(segment.as_bytes());
    }
    Digest::new(hasher.finalize().into())
}

// Re-export the backends for cleaner imports
pub use self::parallel::ParallelProver;
pub use self::reference::ReferenceProver;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_ranges_cover_the_trace() {
        assert_eq!(segment_ranges(1), vec![0..1]);
        assert_eq!(segment_ranges(256), vec![0..256]);
        assert_eq!(segment_ranges(257), vec![0..256, 256..257]);
        assert_eq!(segment_ranges(1000).len(), 4);
    }

    #[test]
    fn trace_rows_depend_on_every_input() {
        let commitment = Digest::from_u64(1);
        let nonce = Digest::from_u64(2);
        let row = trace_row(&commitment, &nonce, 0);
        assert_ne!(row, trace_row(&commitment, &nonce, 1));
        assert_ne!(row, trace_row(&commitment, &Digest::from_u64(3), 0));
        assert_ne!(row, trace_row(&Digest::from_u64(9), &nonce, 0));
    }

    #[test]
    fn zero_length_is_rejected() {
        assert!(validate_length(0).is_err());
        assert!(validate_length(1).is_ok());
    }
}
