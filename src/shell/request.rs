// src/shell/request.rs
//! Request and effect wire types
//!
//! Inbound requests arrive as kind-tagged JSON with hex-encoded digests;
//! validation happens here, before any worker starts, so malformed input is
//! rejected with a diagnostic instead of a mining attempt.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::miner::coordinator::{MiningContext, NonceBatch, ProofResult};
use crate::miner::target::Target;
use crate::types::{Digest, ProgressUpdate};
use crate::utils::error::MinerError;

/// Key configuration for attributing mined blocks
///
/// Parsed from `"share,m:key1,key2,key3"`, the format block-reward splits
/// are distributed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningKeyConfig {
    /// Shares assigned to this key set
    pub share: u64,
    /// Signatures required out of the key set
    pub m: u64,
    /// Public keys, base58-encoded
    pub keys: Vec<String>,
}

impl FromStr for MiningKeyConfig {
    type Err = MinerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Expected format: "share,m:key1,key2,key3"
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 {
            return Err(MinerError::InputError(
                "Invalid key config. Expected 'share,m:key1,key2,key3'".to_string(),
            ));
        }

        let share_m: Vec<&str> = parts[0].split(',').collect();
        if share_m.len() != 2 {
            return Err(MinerError::InputError(
                "Invalid share,m format".to_string(),
            ));
        }

        let share = share_m[0]
            .parse::<u64>()
            .map_err(|e| MinerError::InputError(format!("Invalid share: {}", e)))?;
        let m = share_m[1]
            .parse::<u64>()
            .map_err(|e| MinerError::InputError(format!("Invalid m: {}", e)))?;
        let keys: Vec<String> = parts[1].split(',').map(String::from).collect();
        if keys.iter().any(|key| key.is_empty()) {
            return Err(MinerError::InputError("Empty key in key config".to_string()));
        }

        Ok(MiningKeyConfig { share, m, keys })
    }
}

/// Inbound request to the shell adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MiningRequest {
    /// A candidate batch to search
    Candidate {
        /// Trace length for proof generation
        length: u64,
        /// Hex-encoded block commitment
        commitment: String,
        /// Hex-encoded candidate nonces, in order
        nonces: Vec<String>,
        /// Optional hex-encoded target bound for this batch only
        #[serde(default)]
        target: Option<String>,
    },
    /// Replace the mining key configuration
    SetKey {
        /// Key configs in `"share,m:key1,key2"` form
        configs: Vec<String>,
    },
    /// Replace the standing difficulty target
    SetTarget {
        /// Hex-encoded target bound
        target: String,
    },
    /// Enable or disable mining
    Enable {
        /// `true` to accept candidate batches
        enable: bool,
    },
}

/// Outbound effect emitted by the shell adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MiningEffect {
    /// A proof satisfying the target was found
    Mined {
        /// Hex-encoded segment commitments of the winning proof
        proof: Vec<String>,
        /// Hex-encoded proof digest
        digest: String,
        /// Hex-encoded block commitment that was mined
        commitment: String,
        /// Hex-encoded winning nonce
        nonce: String,
    },
    /// Every candidate was attempted and none satisfied the target
    NoProof {
        /// Hex-encoded block commitment of the exhausted batch
        commitment: String,
    },
    /// The batch was abandoned before finishing
    Abandoned {
        /// Hex-encoded block commitment of the abandoned batch
        commitment: String,
    },
    /// Periodic progress signal during a run
    Progress {
        /// Attempts finished so far
        done: u64,
        /// Total candidates in the batch
        total: u64,
    },
    /// The key configuration was replaced
    KeySet {
        /// Number of key configs now active
        count: usize,
    },
    /// The standing target was replaced
    TargetSet {
        /// Hex-encoded target bound now active
        target: String,
    },
    /// Mining was enabled or disabled
    Enabled {
        /// New enablement state
        enabled: bool,
    },
}

impl MiningEffect {
    /// Builds the success effect for a finished batch
    pub fn mined(result: &ProofResult, commitment: &Digest) -> Self {
        MiningEffect::Mined {
            proof: result
                .proof
                .segments
                .iter()
                .map(|segment| segment.to_hex())
                .collect(),
            digest: result.digest.to_hex(),
            commitment: commitment.to_hex(),
            nonce: result.nonce.to_hex(),
        }
    }

    /// Builds a progress effect from a worker update
    pub fn progress(update: ProgressUpdate) -> Self {
        MiningEffect::Progress {
            done: update.done,
            total: update.total,
        }
    }
}

/// A validated candidate request, ready for the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateBatch {
    /// The batch handed to the coordinator
    pub batch: NonceBatch,
    /// Per-batch target override, if the request carried one
    pub target: Option<Target>,
}

/// Validates and decodes a candidate request
///
/// # Returns
/// * `Ok(CandidateBatch)` - All fields decoded; no mining started yet
/// * `Err(MinerError)` - Diagnostic describing the first invalid field
pub fn parse_candidate(
    length: u64,
    commitment: &str,
    nonces: &[String],
    target: Option<&str>,
) -> Result<CandidateBatch, MinerError> {
    if length == 0 {
        return Err(MinerError::InputError(
            "length must be at least 1".to_string(),
        ));
    }
    if nonces.is_empty() {
        return Err(MinerError::InputError(
            "candidate batch carries no nonces".to_string(),
        ));
    }

    let commitment = parse_digest_field("commitment", commitment)?;
    let nonces = nonces
        .iter()
        .map(|nonce| parse_digest_field("nonce", nonce))
        .collect::<Result<Vec<_>, _>>()?;
    let target = target
        .map(|bound| parse_digest_field("target", bound).map(Target::new))
        .transpose()?;

    Ok(CandidateBatch {
        batch: NonceBatch::new(MiningContext { length, commitment }, nonces),
        target,
    })
}

/// Decodes one hex digest field, naming the field in diagnostics
pub fn parse_digest_field(field: &str, value: &str) -> Result<Digest, MinerError> {
    if value.len() != 64 {
        return Err(MinerError::InputError(format!(
            "{} must be 64 hex characters",
            field
        )));
    }
    Digest::from_hex(value)
        .map_err(|_| MinerError::InputError(format!("{} must be valid hex", field)))
}
