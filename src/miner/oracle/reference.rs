// src/miner/oracle/reference.rs
//! Sequential reference prover
//!
//! The fallback backend: computes every segment commitment in order on the
//! calling thread. It is what the parallel backend is cross-checked against,
//! and what single-threaded deterministic tests run on.

use crate::miner::oracle::{ProofOracle, seal_proof, segment_commitment, segment_ranges, validate_length};
use crate::types::{BackendType, Digest, Proof};
use crate::utils::error::MinerError;

/// Sequential proof generation backend
///
/// Stateless; construction is free and instances are safe to share across
/// threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceProver;

impl ReferenceProver {
    /// Creates a new reference prover
    pub fn new() -> Self {
        ReferenceProver
    }
}

impl ProofOracle for ReferenceProver {
    fn generate(
        &self,
        length: u64,
        commitment: &Digest,
        nonce: &Digest,
    ) -> Result<(Proof, Digest), MinerError> {
        validate_length(length)?;

        let segments: Vec<Digest> = segment_ranges(length)
            .into_iter()
            .map(|rows| segment_commitment(commitment, nonce, rows))
            .collect();
        let digest = seal_proof(length, commitment, nonce, &segments);

        Ok((Proof::new(segments), digest))
    }

    fn backend(&self) -> BackendType {
        BackendType::Reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_identical_inputs() {
        let prover = ReferenceProver::new();
        let commitment = Digest::from_u64(11);
        let nonce = Digest::from_u64(97);

        let first = prover.generate(300, &commitment, &nonce).unwrap();
        let second = prover.generate(300, &commitment, &nonce).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn digest_varies_with_nonce() {
        let prover = ReferenceProver::new();
        let commitment = Digest::from_u64(11);

        let (_, a) = prover.generate(64, &commitment, &Digest::from_u64(1)).unwrap();
        let (_, b) = prover.generate(64, &commitment, &Digest::from_u64(2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn proof_has_one_segment_per_range() {
        let prover = ReferenceProver::new();
        let commitment = Digest::from_u64(11);
        let nonce = Digest::from_u64(5);

        let (proof, _) = prover.generate(1000, &commitment, &nonce).unwrap();
        assert_eq!(proof.segment_count(), 4);

        let (proof, _) = prover.generate(1, &commitment, &nonce).unwrap();
        assert_eq!(proof.segment_count(), 1);
    }

    #[test]
    fn rejects_empty_trace() {
        let prover = ReferenceProver::new();
        let err = prover
            .generate(0, &Digest::ZERO, &Digest::ZERO)
            .unwrap_err();
        assert!(matches!(err, MinerError::OracleError(_)));
    }

    #[test]
    fn reports_backend() {
        assert_eq!(ReferenceProver::new().backend(), BackendType::Reference);
    }
}
