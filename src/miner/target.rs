// src/miner/target.rs
//! Difficulty target handling
//!
//! A target is an opaque upper bound on proof digests. The check itself is a
//! pure function, safe to call concurrently from every worker without
//! synchronization.

use crate::types::Digest;
use serde::{Deserialize, Serialize};

/// Difficulty bound a proof digest must satisfy
///
/// A digest wins when it is strictly below the bound, compared bytewise.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target(Digest);

impl Target {
    /// The most permissive target: every digest except all-ones passes
    pub const MAX: Target = Target(Digest::new([0xFF; 32]));

    /// Wraps an explicit bound
    pub fn new(bound: Digest) -> Self {
        Target(bound)
    }

    /// Borrows the bound digest
    pub fn bound(&self) -> &Digest {
        &self.0
    }

    /// Builds a target requiring `bits` leading zero bits in the digest
    ///
    /// `bits == 0` yields [`Target::MAX`]; values past 256 are clamped.
    pub fn from_difficulty(bits: u32) -> Self {
        let bits = bits.min(256) as usize;
        let mut bound = [0xFFu8; 32];
        for bit in 0..bits {
            bound[bit / 8] &= !(0x80 >> (bit % 8));
        }
        Target(Digest::new(bound))
    }
}

/// Evaluates a proof digest against a difficulty target
///
/// Strictly-less-than comparison on the raw bytes. Pure and stateless.
pub fn meets_target(digest: &Digest, target: &Target) -> bool {
    digest.as_bytes() < target.0.as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_comparison() {
        let target = Target::new(Digest::from_u64(100));
        assert!(meets_target(&Digest::from_u64(99), &target));
        assert!(!meets_target(&Digest::from_u64(100), &target));
        assert!(!meets_target(&Digest::from_u64(101), &target));
    }

    #[test]
    fn max_target_passes_ordinary_digests() {
        assert!(meets_target(&Digest::ZERO, &Target::MAX));
        assert!(meets_target(&Digest::from_u64(u64::MAX), &Target::MAX));
        assert!(!meets_target(&Digest::new([0xFF; 32]), &Target::MAX));
    }

    #[test]
    fn zero_target_passes_nothing() {
        let target = Target::new(Digest::ZERO);
        assert!(!meets_target(&Digest::ZERO, &target));
        assert!(!meets_target(&Digest::from_u64(1), &target));
    }

    #[test]
    fn difficulty_bits_clear_leading_bits() {
        let target = Target::from_difficulty(8);
        assert_eq!(target.bound().as_bytes()[0], 0x00);
        assert_eq!(target.bound().as_bytes()[1], 0xFF);

        // A digest with a zero first byte sits below the bound.
        assert!(meets_target(&Digest::from_u64(12345), &target));

        let mut high = [0u8; 32];
        high[0] = 0x01;
        assert!(!meets_target(&Digest::new(high), &target));
    }

    #[test]
    fn difficulty_zero_is_max() {
        assert_eq!(Target::from_difficulty(0), Target::MAX);
    }
}
