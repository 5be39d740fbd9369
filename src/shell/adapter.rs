// src/shell/adapter.rs
//! Request-handling state machine
//!
//! Sits between an embedding host and the mining coordinator. State is an
//! opaque, versioned snapshot passed by value between calls: `initialize`
//! produces one, `handle` consumes one and returns the successor alongside
//! the effects of the request, `inspect` answers read-only queries.

use std::sync::Arc;

use crate::miner::coordinator::{MiningCoordinator, MiningOutcome};
use crate::miner::target::Target;
use crate::shell::request::{
    MiningEffect, MiningKeyConfig, MiningRequest, parse_candidate, parse_digest_field,
};
use crate::utils::error::MinerError;
use serde::{Deserialize, Serialize};

/// Versioned snapshot of the shell's configuration
///
/// Treated as opaque by the host: it is handed back unchanged on the next
/// `handle` call. Every handled request bumps `version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellState {
    /// Snapshot version, bumped on every handled request
    pub version: u64,
    /// Whether candidate batches are accepted
    pub enabled: bool,
    /// Standing difficulty target for batches without an override
    pub target: Target,
    /// Active key configuration for reward attribution
    pub keys: Vec<MiningKeyConfig>,
    /// Candidate batches handled since initialization
    pub batches_handled: u64,
}

impl Default for ShellState {
    fn default() -> Self {
        ShellState {
            version: 1,
            enabled: false,
            target: Target::MAX,
            keys: Vec::new(),
            batches_handled: 0,
        }
    }
}

/// Read-only query against a state snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellQuery {
    /// Current snapshot version
    Version,
    /// Whether mining is enabled
    Enabled,
    /// Standing target bound, hex-encoded
    Target,
    /// Candidate batches handled so far
    BatchesHandled,
}

/// Answer to a [`ShellQuery`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellReply {
    /// Snapshot version
    Version(u64),
    /// Enablement state
    Enabled(bool),
    /// Hex-encoded target bound
    Target(String),
    /// Batches handled
    BatchesHandled(u64),
}

/// Turns inbound requests into coordinator calls and outbound effects
pub struct ShellAdapter {
    coordinator: Arc<MiningCoordinator>,
}

impl ShellAdapter {
    /// Creates an adapter over a coordinator
    pub fn new(coordinator: Arc<MiningCoordinator>) -> Self {
        ShellAdapter { coordinator }
    }

    /// Produces the state for a fresh or restored session
    ///
    /// A restored snapshot gets its version bumped so successors are always
    /// distinguishable from what the host already saw.
    pub fn initialize(prior: Option<ShellState>) -> ShellState {
        match prior {
            Some(mut state) => {
                state.version += 1;
                state
            }
            None => ShellState::default(),
        }
    }

    /// Answers a read-only query against a snapshot
    pub fn inspect(state: &ShellState, query: ShellQuery) -> ShellReply {
        match query {
            ShellQuery::Version => ShellReply::Version(state.version),
            ShellQuery::Enabled => ShellReply::Enabled(state.enabled),
            ShellQuery::Target => ShellReply::Target(state.target.bound().to_hex()),
            ShellQuery::BatchesHandled => ShellReply::BatchesHandled(state.batches_handled),
        }
    }

    /// Handles one request, returning its effects and the successor state
    ///
    /// Candidate batches block until the coordinator reaches a terminal
    /// state. Malformed requests are rejected before any worker starts; the
    /// prior state is not consumed in that case semantically, since the
    /// returned error carries no successor.
    ///
    /// # Returns
    /// * `Ok((effects, state))` - Effects to emit and the next snapshot
    /// * `Err(MinerError)` - The request was rejected or failed systemically
    pub fn handle(
        &self,
        state: ShellState,
        request: MiningRequest,
    ) -> Result<(Vec<MiningEffect>, ShellState), MinerError> {
        let mut next = state;
        next.version += 1;

        let effects = match request {
            MiningRequest::Enable { enable } => {
                log::info!("mining {}", if enable { "enabled" } else { "disabled" });
                next.enabled = enable;
                vec![MiningEffect::Enabled { enabled: enable }]
            }
            MiningRequest::SetKey { configs } => {
                let parsed = configs
                    .iter()
                    .map(|config| config.parse::<MiningKeyConfig>())
                    .collect::<Result<Vec<_>, _>>()?;
                log::info!("key configuration replaced ({} configs)", parsed.len());
                let count = parsed.len();
                next.keys = parsed;
                vec![MiningEffect::KeySet { count }]
            }
            MiningRequest::SetTarget { target } => {
                let bound = parse_digest_field("target", &target)?;
                next.target = Target::new(bound);
                log::info!("standing target set to {}", bound);
                vec![MiningEffect::TargetSet {
                    target: bound.to_hex(),
                }]
            }
            MiningRequest::Candidate {
                length,
                commitment,
                nonces,
                target,
            } => {
                if !next.enabled {
                    log::warn!("mining disabled, ignoring candidate batch");
                    return Ok((Vec::new(), next));
                }
                let candidate = parse_candidate(length, &commitment, &nonces, target.as_deref())?;
                let commitment = candidate.batch.context.commitment;
                let target = candidate.target.unwrap_or(next.target);
                next.batches_handled += 1;

                match self.coordinator.mine(candidate.batch, target)? {
                    MiningOutcome::Solved(result) => {
                        vec![MiningEffect::mined(&result, &commitment)]
                    }
                    MiningOutcome::Exhausted => vec![MiningEffect::NoProof {
                        commitment: commitment.to_hex(),
                    }],
                    MiningOutcome::Cancelled => vec![MiningEffect::Abandoned {
                        commitment: commitment.to_hex(),
                    }],
                }
            }
        };

        Ok((effects, next))
    }
}
