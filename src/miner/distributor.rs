// src/miner/distributor.rs
//! Nonce distribution across the worker pool
//!
//! Holds the candidate nonces of one batch and hands them out to workers
//! without duplication. The claim cursor is the only mutable shared state of
//! a running batch; a single atomic fetch-add makes every handout
//! at-most-once under concurrent claims.

use crate::types::Digest;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Hands out the candidate nonces of one batch to the worker pool
///
/// Each nonce is claimed by exactly one worker. With a single consumer the
/// claims come back in batch order, which keeps one-worker runs
/// deterministic. Cancellation is cooperative: once flagged, every further
/// claim returns `None` regardless of remaining nonces.
pub struct WorkDistributor {
    /// Read-only candidate sequence, shared across workers
    nonces: Vec<Digest>,
    /// Claim cursor (next unclaimed index)
    cursor: AtomicUsize,
    /// Set on first success or external abandonment
    cancelled: AtomicBool,
    /// Set only by external abandonment, so the coordinator can tell
    /// "superseded" apart from "exhausted"
    abandoned: AtomicBool,
}

impl WorkDistributor {
    /// Creates a distributor over the batch's candidate nonces
    pub fn new(nonces: Vec<Digest>) -> Self {
        WorkDistributor {
            nonces,
            cursor: AtomicUsize::new(0),
            cancelled: AtomicBool::new(false),
            abandoned: AtomicBool::new(false),
        }
    }

    /// Claims the next unclaimed nonce
    ///
    /// # Returns
    /// * `Some(nonce)` - A nonce no other worker has been handed
    /// * `None` - Batch exhausted or cancelled
    pub fn next(&self) -> Option<Digest> {
        if self.cancelled.load(Ordering::SeqCst) {
            return None;
        }
        let claim = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.nonces.get(claim).copied()
    }

    /// Stops all further handout
    ///
    /// Called by a worker on first success so siblings stop claiming new
    /// nonces. In-flight proof attempts are allowed to finish.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Abandons the batch from outside (a newer context superseded it)
    pub fn abandon(&self) {
        self.abandoned.store(true, Ordering::SeqCst);
        self.cancel();
    }

    /// Whether handout has stopped for any reason
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Whether the batch was abandoned by an external caller
    pub fn is_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::SeqCst)
    }

    /// Number of candidates in the batch
    pub fn total(&self) -> usize {
        self.nonces.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use std::thread;

    fn nonces(count: u64) -> Vec<Digest> {
        (0..count).map(Digest::from_u64).collect()
    }

    #[test]
    fn single_consumer_claims_in_batch_order() {
        let distributor = WorkDistributor::new(nonces(4));
        for expected in 0..4 {
            assert_eq!(distributor.next(), Some(Digest::from_u64(expected)));
        }
        assert_eq!(distributor.next(), None);
        assert_eq!(distributor.next(), None);
    }

    #[test]
    fn cancel_stops_handout_immediately() {
        let distributor = WorkDistributor::new(nonces(10));
        assert!(distributor.next().is_some());
        distributor.cancel();
        assert!(distributor.is_cancelled());
        assert!(!distributor.is_abandoned());
        assert_eq!(distributor.next(), None);
    }

    #[test]
    fn abandon_sets_both_flags() {
        let distributor = WorkDistributor::new(nonces(10));
        distributor.abandon();
        assert!(distributor.is_cancelled());
        assert!(distributor.is_abandoned());
        assert_eq!(distributor.next(), None);
    }

    #[test]
    fn concurrent_claims_are_at_most_once() {
        let total = 1000u64;
        let distributor = Arc::new(WorkDistributor::new(nonces(total)));
        let claimed = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let distributor = distributor.clone();
                let claimed = claimed.clone();
                thread::spawn(move || {
                    while let Some(nonce) = distributor.next() {
                        claimed.lock().unwrap().push(nonce);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let claimed = claimed.lock().unwrap();
        assert_eq!(claimed.len(), total as usize);
        let unique: HashSet<_> = claimed.iter().collect();
        assert_eq!(unique.len(), total as usize);
    }

    #[test]
    fn reports_total() {
        assert_eq!(WorkDistributor::new(nonces(7)).total(), 7);
        assert_eq!(WorkDistributor::new(Vec::new()).total(), 0);
    }
}
