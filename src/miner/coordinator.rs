// src/miner/coordinator.rs
//! Mining coordinator implementation
//!
//! Owns the worker pool for one batch at a time: sizes it from the pool
//! configuration, starts the batch, collects the first success, and exposes
//! a single blocking-or-cancellable [`MiningCoordinator::mine`] call.
//!
//! Tie-break policy when several workers succeed on the last few nonces:
//! the first publish to reach the result slot wins and the rest are
//! discarded. Enforcing nonce order instead would serialize success
//! detection across the pool.

use arc_swap::ArcSwap;
use crossbeam_channel::{Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;

use crate::config::PoolConfig;
use crate::miner::distributor::WorkDistributor;
use crate::miner::oracle::ProofOracle;
use crate::miner::target::Target;
use crate::miner::worker::Worker;
use crate::types::{Digest, ProgressUpdate, Proof};
use crate::utils::error::MinerError;

/// Identifies what is being mined
///
/// Immutable for the lifetime of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiningContext {
    /// Trace length handed to the proof oracle
    pub length: u64,
    /// Digest of the block content being mined
    pub commitment: Digest,
}

/// One mining request: a context plus its ordered candidate nonces
///
/// Created by the shell adapter, consumed exactly once by the coordinator,
/// never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceBatch {
    /// What is being mined
    pub context: MiningContext,
    /// Ordered candidate nonces
    pub nonces: Vec<Digest>,
}

impl NonceBatch {
    /// Builds a batch from a context and its candidates
    pub fn new(context: MiningContext, nonces: Vec<Digest>) -> Self {
        NonceBatch { context, nonces }
    }
}

/// A successful proof attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofResult {
    /// The winning proof artifact
    pub proof: Proof,
    /// Digest that satisfied the target
    pub digest: Digest,
    /// Nonce that produced it
    pub nonce: Digest,
}

/// Terminal state of one batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiningOutcome {
    /// A proof digest satisfied the target; first publish won
    Solved(ProofResult),
    /// Every nonce was attempted and none satisfied the target
    Exhausted,
    /// An external caller abandoned the batch before it finished
    Cancelled,
}

/// Sizes and owns the worker pool, one batch at a time
///
/// The coordinator is idle between calls; [`MiningCoordinator::mine`] runs a
/// batch to a terminal state and returns to idle before the next batch is
/// accepted. Share it behind an [`Arc`] to cancel an in-flight batch from
/// another thread.
pub struct MiningCoordinator {
    pool: PoolConfig,
    oracle: Arc<dyn ProofOracle>,
    progress: Option<Sender<ProgressUpdate>>,
    /// Distributor of the in-flight batch, if any (atomically swappable)
    current: ArcSwap<Option<Arc<WorkDistributor>>>,
    /// Guards against overlapping batch runs
    busy: AtomicBool,
}

impl MiningCoordinator {
    /// Creates a coordinator over a pool sizing and a proof backend
    pub fn new(pool: PoolConfig, oracle: Arc<dyn ProofOracle>) -> Self {
        MiningCoordinator {
            pool,
            oracle,
            progress: None,
            current: ArcSwap::from_pointee(None),
            busy: AtomicBool::new(false),
        }
    }

    /// Attaches a progress channel fed after every proof attempt
    pub fn with_progress(mut self, progress: Sender<ProgressUpdate>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// The pool sizing this coordinator spawns workers with
    pub fn pool(&self) -> &PoolConfig {
        &self.pool
    }

    /// Abandons the in-flight batch, if any
    ///
    /// Cooperative: workers notice between oracle calls, so the batch
    /// reaches [`MiningOutcome::Cancelled`] within one proof duration.
    /// In-flight proof attempts run to completion and are discarded. A call
    /// with no batch in flight is a no-op.
    pub fn cancel(&self) {
        let current = self.current.load();
        if let Some(distributor) = &**current {
            distributor.abandon();
        }
    }

    /// Runs one batch to a terminal state
    ///
    /// Blocks until the batch is solved, exhausted, or cancelled. The
    /// coordinator accepts one batch at a time; a concurrent call while a
    /// batch is in flight is a systemic error, as is a worker spawn
    /// failure.
    ///
    /// # Returns
    /// * `Ok(MiningOutcome)` - The batch reached a terminal state
    /// * `Err(MinerError)` - Systemic failure, no mining result
    pub fn mine(&self, batch: NonceBatch, target: Target) -> Result<MiningOutcome, MinerError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(MinerError::PoolError(
                "a batch is already in flight".to_string(),
            ));
        }

        let outcome = self.run_batch(batch, target);

        self.current.store(Arc::new(None));
        self.busy.store(false, Ordering::SeqCst);
        outcome
    }

    fn run_batch(&self, batch: NonceBatch, target: Target) -> Result<MiningOutcome, MinerError> {
        let NonceBatch { context, nonces } = batch;
        let total = nonces.len();
        let worker_count = self.pool.worker_count();
        log::info!(
            "starting batch: {} candidates across {} workers (commitment {})",
            total,
            worker_count,
            context.commitment
        );

        let distributor = Arc::new(WorkDistributor::new(nonces));
        self.current.store(Arc::new(Some(distributor.clone())));

        // First publish wins; later sends find the slot full and discard.
        let (result_tx, result_rx) = bounded::<ProofResult>(1);
        let attempted = Arc::new(AtomicU64::new(0));

        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let worker = Worker::new(
                worker_id,
                self.oracle.clone(),
                distributor.clone(),
                result_tx.clone(),
                self.progress.clone(),
                attempted.clone(),
            );
            let spawned = thread::Builder::new()
                .name(format!("miner-{worker_id}"))
                .spawn(move || worker.run(&context, &target));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    distributor.cancel();
                    join_workers(handles);
                    return Err(MinerError::PoolError(format!(
                        "failed to spawn mining worker {}: {}",
                        worker_id, e
                    )));
                }
            }
        }
        drop(result_tx);
        join_workers(handles);

        if let Ok(result) = result_rx.try_recv() {
            log::info!(
                "batch solved: nonce {} produced digest {}",
                result.nonce,
                result.digest
            );
            return Ok(MiningOutcome::Solved(result));
        }
        if distributor.is_abandoned() {
            log::info!("batch abandoned before completion");
            Ok(MiningOutcome::Cancelled)
        } else {
            log::info!(
                "batch exhausted: no digest met the target after {} attempts",
                attempted.load(Ordering::Relaxed)
            );
            Ok(MiningOutcome::Exhausted)
        }
    }
}

/// Joins worker threads, logging panics instead of propagating them
fn join_workers(handles: Vec<thread::JoinHandle<()>>) {
    for handle in handles {
        if handle.join().is_err() {
            log::error!("mining worker panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BackendType;
    use crossbeam_channel::unbounded;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Echoes the nonce as the proof digest, counting and recording calls
    struct EchoOracle {
        calls: AtomicU64,
        seen: Mutex<Vec<Digest>>,
        delay: Duration,
    }

    impl EchoOracle {
        fn new() -> Self {
            Self::with_delay(Duration::ZERO)
        }

        fn with_delay(delay: Duration) -> Self {
            EchoOracle {
                calls: AtomicU64::new(0),
                seen: Mutex::new(Vec::new()),
                delay,
            }
        }

        fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ProofOracle for EchoOracle {
        fn generate(
            &self,
            _length: u64,
            _commitment: &Digest,
            nonce: &Digest,
        ) -> Result<(Proof, Digest), MinerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(*nonce);
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            Ok((Proof::new(vec![*nonce]), *nonce))
        }

        fn backend(&self) -> BackendType {
            BackendType::Reference
        }
    }

    fn batch(nonces: &[u64]) -> NonceBatch {
        NonceBatch::new(
            MiningContext {
                length: 1,
                commitment: Digest::from_u64(7),
            },
            nonces.iter().copied().map(Digest::from_u64).collect(),
        )
    }

    /// Digests built from integers below `bound` satisfy this target
    fn below(bound: u64) -> Target {
        Target::new(Digest::from_u64(bound))
    }

    #[test]
    fn single_worker_returns_first_satisfying_nonce() {
        let oracle = Arc::new(EchoOracle::new());
        let coordinator = MiningCoordinator::new(PoolConfig::new(1, 1), oracle.clone());

        let outcome = coordinator.mine(batch(&[1, 2, 3]), below(10)).unwrap();

        match outcome {
            MiningOutcome::Solved(result) => {
                assert_eq!(result.nonce, Digest::from_u64(1));
                assert_eq!(result.digest, Digest::from_u64(1));
            }
            other => panic!("expected solved, got {other:?}"),
        }
        assert_eq!(oracle.calls(), 1);
    }

    #[test]
    fn single_worker_walks_batch_in_order_until_success() {
        let oracle = Arc::new(EchoOracle::new());
        let coordinator = MiningCoordinator::new(PoolConfig::new(1, 1), oracle.clone());

        // Only the third candidate sits below the bound.
        let outcome = coordinator.mine(batch(&[5, 6, 1]), below(2)).unwrap();

        match outcome {
            MiningOutcome::Solved(result) => assert_eq!(result.nonce, Digest::from_u64(1)),
            other => panic!("expected solved, got {other:?}"),
        }
        assert_eq!(oracle.calls(), 3);
        assert_eq!(
            *oracle.seen.lock().unwrap(),
            vec![Digest::from_u64(5), Digest::from_u64(6), Digest::from_u64(1)]
        );
    }

    #[test]
    fn exhausts_after_attempting_every_nonce_exactly_once() {
        let oracle = Arc::new(EchoOracle::new());
        let coordinator = MiningCoordinator::new(PoolConfig::new(1, 1), oracle.clone());

        let outcome = coordinator.mine(batch(&[5, 6]), below(2)).unwrap();

        assert_eq!(outcome, MiningOutcome::Exhausted);
        assert_eq!(oracle.calls(), 2);
    }

    #[test]
    fn no_duplicate_attempts_with_many_workers() {
        let oracle = Arc::new(EchoOracle::new());
        let coordinator = MiningCoordinator::new(PoolConfig::new(4, 1), oracle.clone());

        let nonces: Vec<u64> = (10..110).collect();
        let outcome = coordinator.mine(batch(&nonces), below(1)).unwrap();

        assert_eq!(outcome, MiningOutcome::Exhausted);
        assert_eq!(oracle.calls(), 100);
        let seen = oracle.seen.lock().unwrap();
        let unique: HashSet<_> = seen.iter().collect();
        assert_eq!(unique.len(), 100);
    }

    #[test]
    fn multi_worker_success_comes_from_the_batch() {
        let oracle = Arc::new(EchoOracle::new());
        let coordinator = MiningCoordinator::new(PoolConfig::new(4, 1), oracle.clone());

        let nonces: Vec<u64> = (1..=50).collect();
        let outcome = coordinator.mine(batch(&nonces), below(100)).unwrap();

        match outcome {
            MiningOutcome::Solved(result) => {
                let candidates: HashSet<_> = nonces.iter().copied().map(Digest::from_u64).collect();
                assert!(candidates.contains(&result.nonce));
            }
            other => panic!("expected solved, got {other:?}"),
        }
        assert!(oracle.calls() <= 50);
    }

    #[test]
    fn empty_batch_exhausts_without_oracle_calls() {
        let oracle = Arc::new(EchoOracle::new());
        let coordinator = MiningCoordinator::new(PoolConfig::new(4, 1), oracle.clone());

        let outcome = coordinator.mine(batch(&[]), below(1)).unwrap();

        assert_eq!(outcome, MiningOutcome::Exhausted);
        assert_eq!(oracle.calls(), 0);
    }

    #[test]
    fn external_cancel_abandons_the_batch() {
        let oracle = Arc::new(EchoOracle::with_delay(Duration::from_millis(20)));
        let coordinator = Arc::new(MiningCoordinator::new(
            PoolConfig::new(1, 1),
            oracle.clone(),
        ));

        let nonces: Vec<u64> = (10..210).collect();
        let mining = {
            let coordinator = coordinator.clone();
            let batch = batch(&nonces);
            thread::spawn(move || coordinator.mine(batch, below(1)))
        };

        thread::sleep(Duration::from_millis(60));
        coordinator.cancel();
        let outcome = mining.join().unwrap().unwrap();

        assert_eq!(outcome, MiningOutcome::Cancelled);
        assert!(oracle.calls() < 200, "cancel did not stop new attempts");
    }

    #[test]
    fn rejects_overlapping_batches() {
        let oracle = Arc::new(EchoOracle::with_delay(Duration::from_millis(50)));
        let coordinator = Arc::new(MiningCoordinator::new(
            PoolConfig::new(1, 1),
            oracle.clone(),
        ));

        let mining = {
            let coordinator = coordinator.clone();
            let batch = batch(&[10, 11, 12, 13]);
            thread::spawn(move || coordinator.mine(batch, below(1)))
        };

        thread::sleep(Duration::from_millis(25));
        let err = coordinator.mine(batch(&[20]), below(1)).unwrap_err();
        assert!(matches!(err, MinerError::PoolError(_)));

        assert_eq!(mining.join().unwrap().unwrap(), MiningOutcome::Exhausted);
    }

    #[test]
    fn progress_reports_every_attempt() {
        let oracle = Arc::new(EchoOracle::new());
        let (progress_tx, progress_rx) = unbounded();
        let coordinator = MiningCoordinator::new(PoolConfig::new(1, 1), oracle)
            .with_progress(progress_tx);

        coordinator.mine(batch(&[5, 6, 7]), below(1)).unwrap();

        let updates: Vec<_> = progress_rx.try_iter().collect();
        assert_eq!(updates.len(), 3);
        assert_eq!(updates.last(), Some(&ProgressUpdate { done: 3, total: 3 }));
    }

    #[test]
    fn cancel_between_batches_is_a_noop() {
        let oracle = Arc::new(EchoOracle::new());
        let coordinator = MiningCoordinator::new(PoolConfig::new(1, 1), oracle);
        coordinator.cancel();
        let outcome = coordinator.mine(batch(&[1]), below(10)).unwrap();
        assert!(matches!(outcome, MiningOutcome::Solved(_)));
    }
}
