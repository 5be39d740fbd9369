// src/miner/worker.rs
//! Worker loop implementation
//!
//! Each worker repeatedly claims a nonce from the distributor, drives one
//! proof attempt through the oracle, and gates the resulting digest against
//! the target. The first worker to succeed publishes its result and stops
//! the siblings from claiming further nonces.

use crossbeam_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::miner::coordinator::{MiningContext, ProofResult};
use crate::miner::distributor::WorkDistributor;
use crate::miner::oracle::ProofOracle;
use crate::miner::target::{Target, meets_target};
use crate::types::{ProgressUpdate, WorkerId};

/// One execution unit of the mining pool
///
/// Holds no lock while inside the oracle call; the only shared state it
/// touches between attempts is the distributor's claim cursor and the
/// batch-wide attempt counter.
pub struct Worker {
    /// Identifier used for logging and attribution
    id: WorkerId,
    /// Proof generation backend shared by the pool
    oracle: Arc<dyn ProofOracle>,
    /// Source of unclaimed nonces for the current batch
    distributor: Arc<WorkDistributor>,
    /// One-shot result slot; the first successful publish wins
    result_slot: Sender<ProofResult>,
    /// Optional progress signal, sent after every attempt
    progress: Option<Sender<ProgressUpdate>>,
    /// Attempts finished across the whole pool
    attempted: Arc<AtomicU64>,
}

impl Worker {
    /// Creates a worker bound to one batch run
    ///
    /// # Arguments
    /// * `id` - Worker identifier for logging
    /// * `oracle` - Proof generation backend
    /// * `distributor` - Nonce source shared by the pool
    /// * `result_slot` - Bounded(1) channel collecting the first success
    /// * `progress` - Optional observability channel
    /// * `attempted` - Pool-wide attempt counter
    pub fn new(
        id: WorkerId,
        oracle: Arc<dyn ProofOracle>,
        distributor: Arc<WorkDistributor>,
        result_slot: Sender<ProofResult>,
        progress: Option<Sender<ProgressUpdate>>,
        attempted: Arc<AtomicU64>,
    ) -> Self {
        Worker {
            id,
            oracle,
            distributor,
            result_slot,
            progress,
            attempted,
        }
    }

    /// Drains the distributor until success, exhaustion, or cancellation
    ///
    /// A failed oracle call is terminal for that nonce only: it is logged
    /// and the worker moves on. On success the worker cancels the
    /// distributor first so siblings stop claiming, then publishes; a full
    /// result slot means another worker already won and the result is
    /// discarded.
    pub fn run(&self, context: &MiningContext, target: &Target) {
        while let Some(nonce) = self.distributor.next() {
            match self
                .oracle
                .generate(context.length, &context.commitment, &nonce)
            {
                Ok((proof, digest)) => {
                    self.record_attempt();
                    if meets_target(&digest, target) {
                        self.distributor.cancel();
                        let result = ProofResult {
                            proof,
                            digest,
                            nonce,
                        };
                        if self.result_slot.try_send(result).is_err() {
                            log::debug!(
                                "worker {}: result slot already claimed, discarding nonce {}",
                                self.id,
                                nonce
                            );
                        }
                        return;
                    }
                }
                Err(e) => {
                    self.record_attempt();
                    log::warn!(
                        "worker {}: proof generation failed for nonce {}: {}",
                        self.id,
                        nonce,
                        e
                    );
                }
            }
        }
        log::debug!("worker {}: no more work", self.id);
    }

    fn record_attempt(&self) {
        let done = self.attempted.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(progress) = &self.progress {
            let _ = progress.send(ProgressUpdate {
                done,
                total: self.distributor.total() as u64,
            });
        }
    }
}
