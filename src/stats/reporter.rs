// src/stats/reporter.rs
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use sysinfo::{Components, System};

/// Statistics related to proof-search performance
#[derive(Debug, Clone, Default)]
pub struct MiningStats {
    /// Total number of proof attempts driven
    pub proofs_total: u64,
    /// Number of batches that produced a winning proof
    pub solutions_found: u64,
    /// Number of batches exhausted without a winning proof
    pub batches_unsolved: u64,
    /// Average attempt rate over 1 minute (proofs per minute)
    pub avg_proof_rate_1m: f64,
    /// Average attempt rate over 15 minutes (proofs per minute)
    pub avg_proof_rate_15m: f64,
}

/// Statistics related to hardware utilization
#[derive(Debug, Clone)]
pub struct HardwareStats {
    /// Current CPU usage percentage (0-100)
    pub cpu_usage: f32,
    /// Memory currently used by the host (in bytes)
    pub memory_used: u64,
    /// Current CPU temperature in Celsius
    pub temperature: f32,
}

/// Terminal state of one batch, as seen by the reporter
#[derive(Debug, Clone, Copy)]
pub enum BatchResult {
    /// The batch produced a winning proof
    Solved,
    /// The batch finished without a winning proof
    Unsolved,
}

/// Collects and reports mining and hardware statistics
pub struct StatsReporter {
    /// Atomic counters for mining statistics
    stats: Arc<MiningStatsAtomic>,
    /// System information collector
    system: System,
    /// Hardware component information collector
    components: Components,
    /// Interval at which stats are reported
    report_interval: Duration,
}

/// Atomic version of MiningStats for thread-safe operations
struct MiningStatsAtomic {
    proofs: AtomicU64,
    solutions: AtomicU64,
    unsolved: AtomicU64,
    start_time: Instant,
}

impl Clone for StatsReporter {
    fn clone(&self) -> Self {
        StatsReporter {
            stats: self.stats.clone(),
            system: System::new_all(),
            components: Components::new_with_refreshed_list(),
            report_interval: self.report_interval,
        }
    }
}

impl StatsReporter {
    /// Creates a new StatsReporter with the specified reporting interval
    ///
    /// # Arguments
    /// * `report_interval` - How often to log statistics
    pub fn new(report_interval: Duration) -> Self {
        StatsReporter {
            stats: Arc::new(MiningStatsAtomic {
                proofs: AtomicU64::new(0),
                solutions: AtomicU64::new(0),
                unsolved: AtomicU64::new(0),
                start_time: Instant::now(),
            }),
            system: System::new_all(),
            components: Components::new_with_refreshed_list(),
            report_interval,
        }
    }

    /// Creates and returns a channel sender for batch results
    ///
    /// The returned sender can be used to report solved/unsolved batches.
    /// The reporter listens for these events on a background thread.
    pub fn batch_sender(&self) -> Sender<BatchResult> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.start_batch_listener(rx);
        tx
    }

    /// Creates and returns a channel sender for attempt counts
    ///
    /// The returned sender can be used to report finished proof attempts.
    /// The reporter listens for these events on a background thread.
    pub fn attempt_sender(&self) -> Sender<u64> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.start_attempt_listener(rx);
        tx
    }

    /// Gets the current mining statistics
    ///
    /// # Returns
    /// A snapshot of the current mining statistics
    pub fn get_stats(&self) -> MiningStats {
        let total_seconds = self.stats.start_time.elapsed().as_secs() as f64;
        let proofs = self.stats.proofs.load(Ordering::Relaxed);

        MiningStats {
            proofs_total: proofs,
            solutions_found: self.stats.solutions.load(Ordering::Relaxed),
            batches_unsolved: self.stats.unsolved.load(Ordering::Relaxed),
            avg_proof_rate_1m: proofs as f64 / total_seconds.max(60.0) * 60.0,
            avg_proof_rate_15m: proofs as f64 / total_seconds.max(900.0) * 900.0 / 15.0,
        }
    }

    /// Gets the current hardware statistics
    ///
    /// This refreshes system information before returning the stats.
    ///
    /// # Returns
    /// A snapshot of the current hardware statistics
    pub fn get_hardware_stats(&mut self) -> HardwareStats {
        self.system.refresh_cpu_all();
        self.system.refresh_memory();
        self.components.refresh(true);

        let cpu_usage = self
            .system
            .cpus()
            .iter()
            .map(|c| c.cpu_usage())
            .sum::<f32>()
            / self.system.cpus().len() as f32;

        let temperature = self
            .components
            .iter()
            .find(|c| c.label().contains("CPU"))
            .and_then(|c| c.temperature())
            .unwrap_or(0.0);

        HardwareStats {
            cpu_usage,
            memory_used: self.system.used_memory(),
            temperature,
        }
    }

    /// Starts the periodic reporting of statistics
    ///
    /// This spawns a background thread that logs stats at the configured
    /// interval.
    pub fn start_reporting(&self) {
        let stats = self.stats.clone();
        let interval = self.report_interval;

        std::thread::spawn(move || {
            let mut reporter = StatsReporter {
                stats,
                system: System::new_all(),
                components: Components::new_with_refreshed_list(),
                report_interval: interval,
            };

            loop {
                std::thread::sleep(interval);
                let mining_stats = reporter.get_stats();
                let hw_stats = reporter.get_hardware_stats();

                log::info!(
                    "Attempts: {} ({:.1}/min) | Solved/Unsolved: {}/{} | CPU: {:.1}% | Temp: {:.1}°C",
                    mining_stats.proofs_total,
                    mining_stats.avg_proof_rate_1m,
                    mining_stats.solutions_found,
                    mining_stats.batches_unsolved,
                    hw_stats.cpu_usage,
                    hw_stats.temperature
                );
            }
        });
    }

    /// Starts a listener for batch results on a background thread
    fn start_batch_listener(&self, receiver: Receiver<BatchResult>) {
        let stats = self.stats.clone();

        std::thread::spawn(move || {
            for result in receiver {
                match result {
                    BatchResult::Solved => stats.solutions.fetch_add(1, Ordering::Relaxed),
                    BatchResult::Unsolved => stats.unsolved.fetch_add(1, Ordering::Relaxed),
                };
            }
        });
    }

    /// Starts a listener for attempt counts on a background thread
    fn start_attempt_listener(&self, receiver: Receiver<u64>) {
        let stats = self.stats.clone();

        std::thread::spawn(move || {
            for count in receiver {
                stats.proofs.fetch_add(count, Ordering::Relaxed);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn wait_for(reporter: &StatsReporter, check: impl Fn(&MiningStats) -> bool) -> MiningStats {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let stats = reporter.get_stats();
            if check(&stats) {
                return stats;
            }
            assert!(Instant::now() < deadline, "reporter never observed events");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn counts_attempts_and_batches() {
        let reporter = StatsReporter::new(Duration::from_secs(3600));
        let attempts = reporter.attempt_sender();
        let batches = reporter.batch_sender();

        for _ in 0..5 {
            attempts.send(1).unwrap();
        }
        batches.send(BatchResult::Solved).unwrap();
        batches.send(BatchResult::Unsolved).unwrap();
        batches.send(BatchResult::Unsolved).unwrap();

        let stats = wait_for(&reporter, |s| {
            s.proofs_total == 5 && s.solutions_found == 1 && s.batches_unsolved == 2
        });
        assert_eq!(stats.proofs_total, 5);
    }
}
