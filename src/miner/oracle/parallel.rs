// src/miner/oracle/parallel.rs
//! Prover with internal parallelism
//!
//! Computes segment commitments across a dedicated rayon pool. The pool size
//! is the per-worker thread budget from the pool configuration; the budget
//! is honored here rather than enforced by the coordinator.

use rayon::prelude::*;

use crate::miner::oracle::{ProofOracle, seal_proof, segment_commitment, segment_ranges, validate_length};
use crate::types::{BackendType, Digest, Proof};
use crate::utils::error::MinerError;

/// Proof generation backend with internal rayon parallelism
///
/// Owns its thread pool so concurrent mining workers never contend for the
/// global rayon pool. Output is bit-identical to [`super::ReferenceProver`]
/// for identical inputs; only the scheduling differs.
pub struct ParallelProver {
    pool: rayon::ThreadPool,
    threads: usize,
}

impl ParallelProver {
    /// Creates a prover with a dedicated pool of `threads` threads
    ///
    /// # Arguments
    /// * `threads` - Internal parallelism budget; zero is treated as one
    ///
    /// # Returns
    /// * `Ok(ParallelProver)` - Pool built and ready
    /// * `Err(MinerError)` - Pool construction failed (systemic error)
    pub fn new(threads: usize) -> Result<Self, MinerError> {
        let threads = threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("prover-{index}"))
            .build()
            .map_err(|e| {
                MinerError::PoolError(format!("failed to build prover thread pool: {}", e))
            })?;

        Ok(ParallelProver { pool, threads })
    }

    /// Internal parallelism budget this prover was built with
    pub fn threads(&self) -> usize {
        self.threads
    }
}

impl ProofOracle for ParallelProver {
    fn generate(
        &self,
        length: u64,
        commitment: &Digest,
        nonce: &Digest,
    ) -> Result<(Proof, Digest), MinerError> {
        validate_length(length)?;

        let segments: Vec<Digest> = self.pool.install(|| {
            segment_ranges(length)
                .into_par_iter()
                .map(|rows| segment_commitment(commitment, nonce, rows))
                .collect()
        });
        let digest = seal_proof(length, commitment, nonce, &segments);

        Ok((Proof::new(segments), digest))
    }

    fn backend(&self) -> BackendType {
        BackendType::Parallel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::oracle::ReferenceProver;

    #[test]
    fn matches_reference_prover() {
        let reference = ReferenceProver::new();
        let parallel = ParallelProver::new(4).unwrap();
        let commitment = Digest::from_u64(31);

        for length in [1u64, 5, 256, 1000, 2049] {
            for nonce in [Digest::from_u64(0), Digest::from_u64(77)] {
                let expected = reference.generate(length, &commitment, &nonce).unwrap();
                let actual = parallel.generate(length, &commitment, &nonce).unwrap();
                assert_eq!(expected, actual, "length {length} nonce {nonce}");
            }
        }
    }

    #[test]
    fn zero_threads_clamps_to_one() {
        let prover = ParallelProver::new(0).unwrap();
        assert_eq!(prover.threads(), 1);
        assert!(prover.generate(16, &Digest::ZERO, &Digest::ZERO).is_ok());
    }

    #[test]
    fn rejects_empty_trace() {
        let prover = ParallelProver::new(2).unwrap();
        assert!(prover.generate(0, &Digest::ZERO, &Digest::ZERO).is_err());
    }

    #[test]
    fn reports_backend() {
        assert_eq!(ParallelProver::new(1).unwrap().backend(), BackendType::Parallel);
    }
}
