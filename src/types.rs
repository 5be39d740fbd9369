// src/types.rs
use clap::ValueEnum;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::MinerError;

/// Fixed-size cryptographic digest
///
/// Used for block commitments, candidate nonces, segment commitments and
/// proof digests alike. Ordering is bytewise big-endian lexicographic, which
/// is what the difficulty comparison relies on.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    /// The all-zero digest
    pub const ZERO: Digest = Digest([0u8; 32]);

    /// Wraps a raw 32-byte value
    pub const fn new(bytes: [u8; 32]) -> Self {
        Digest(bytes)
    }

    /// Borrows the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Builds a digest whose low eight bytes hold `value` big-endian
    ///
    /// Digests built this way compare in the same order as the integers they
    /// were built from, which makes targets and test fixtures easy to reason
    /// about.
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Digest(bytes)
    }

    /// Parses a 64-character hex string
    ///
    /// # Returns
    /// * `Ok(Digest)` - Successfully decoded digest
    /// * `Err(MinerError)` - If the string is not 32 bytes of valid hex
    pub fn from_hex(value: &str) -> Result<Self, MinerError> {
        let bytes = hex::decode(value)?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| MinerError::InputError("digest must be exactly 32 bytes".to_string()))?;
        Ok(Digest(bytes))
    }

    /// Lowercase hex rendering of the digest
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; 32]> for Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Digest(bytes)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = MinerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Digest::from_hex(s)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Digest::from_hex(&value).map_err(de::Error::custom)
    }
}

/// A generated proof artifact
///
/// Carries one commitment per trace segment. The artifact is immutable once
/// produced and is moved, not copied, to whichever caller receives it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Segment commitments in trace order
    pub segments: Vec<Digest>,
}

impl Proof {
    /// Wraps the segment commitments of a finished proof
    pub fn new(segments: Vec<Digest>) -> Self {
        Proof { segments }
    }

    /// Number of trace segments covered by this proof
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Concatenated segment bytes, for hashing or wire encoding
    pub fn to_bytes(&self) -> Vec<u8> {
        self.segments
            .iter()
            .flat_map(|segment| segment.as_bytes().iter().copied())
            .collect()
    }
}

/// Available prover backends
///
/// The coordinator is agnostic to which backend is bound; both produce
/// identical output for identical input.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum BackendType {
    /// Sequential reference prover (no internal threads)
    ///
    /// Slowest option, but has no setup cost and is the baseline the
    /// parallel backend is cross-checked against.
    #[clap(name = "reference")]
    Reference,

    /// Prover with internal rayon parallelism
    ///
    /// Splits segment commitment work across a dedicated thread pool sized
    /// to the per-worker thread budget.
    #[clap(name = "parallel")]
    Parallel,
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendType::Reference => write!(f, "reference"),
            BackendType::Parallel => write!(f, "parallel"),
        }
    }
}

impl FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ref" | "reference" => Ok(BackendType::Reference),
            "par" | "parallel" => Ok(BackendType::Parallel),
            _ => Err(format!("Unknown prover backend: {}", s)),
        }
    }
}

/// Identifier attributed to one worker in the pool
///
/// Only used for logging and attribution; carries no ownership semantics.
pub type WorkerId = usize;

/// Progress signal emitted after each proof attempt
///
/// Intended for observability, not correctness.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Attempts finished so far in the current batch
    pub done: u64,
    /// Total candidates in the current batch
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn hex_roundtrip() {
        let digest = Digest::new(hex!(
            "a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8f90"
        ));
        let parsed = Digest::from_hex(&digest.to_hex()).unwrap();
        assert_eq!(digest, parsed);
    }

    #[test]
    fn rejects_bad_hex() {
        assert!(Digest::from_hex("zz").is_err());
        assert!(Digest::from_hex("abcd").is_err());
        assert!("not hex".parse::<Digest>().is_err());
    }

    #[test]
    fn from_u64_preserves_integer_order() {
        assert!(Digest::from_u64(1) < Digest::from_u64(2));
        assert!(Digest::from_u64(255) < Digest::from_u64(256));
        assert_eq!(Digest::from_u64(0), Digest::ZERO);
    }

    #[test]
    fn serde_as_hex_string() {
        let digest = Digest::from_u64(42);
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", digest.to_hex()));
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(digest, back);
    }

    #[test]
    fn proof_bytes_concatenate_segments() {
        let proof = Proof::new(vec![Digest::from_u64(1), Digest::from_u64(2)]);
        assert_eq!(proof.segment_count(), 2);
        assert_eq!(proof.to_bytes().len(), 64);
    }

    #[test]
    fn backend_parse_and_display() {
        assert_eq!("reference".parse::<BackendType>(), Ok(BackendType::Reference));
        assert_eq!("par".parse::<BackendType>(), Ok(BackendType::Parallel));
        assert!("gpu".parse::<BackendType>().is_err());
        assert_eq!(BackendType::Parallel.to_string(), "parallel");
    }
}
