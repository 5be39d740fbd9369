// src/config/config.rs
use crate::utils::error::MinerError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default internal parallelism budget granted to each worker
///
/// Tuned to the prover's internal segment parallelism: beyond four threads
/// per proof the segment fan-out stops paying for itself at common trace
/// lengths, and extra capacity is better spent on more workers.
pub const DEFAULT_THREADS_PER_WORKER: usize = 4;

/// Environment variable controlling total pool parallelism
///
/// Takes precedence over the configuration file; absence means "use the
/// configured value, or all available processing units".
pub const MINING_THREADS_ENV: &str = "MINING_THREADS";

/// Main configuration structure for the mining application
///
/// Contains all settings needed to configure proof search, including the
/// prover backend, thread budgets, and reporting cadence.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Prover backend to use ("reference" or "parallel")
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Total threads available to the worker pool
    /// (0 = number of CPU cores)
    #[serde(default)]
    pub total_threads: usize,

    /// Threads granted to each worker's prover
    #[serde(default = "default_threads_per_worker")]
    pub threads_per_worker: usize,

    /// Seconds between statistics reports
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: u64,
}

fn default_backend() -> String {
    "parallel".into()
}

fn default_threads_per_worker() -> usize {
    DEFAULT_THREADS_PER_WORKER
}

fn default_report_interval() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: default_backend(),
            total_threads: 0,
            threads_per_worker: default_threads_per_worker(),
            report_interval_secs: default_report_interval(),
        }
    }
}

impl Config {
    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded configuration
    /// * `Err(MinerError)` - If file couldn't be read or parsed
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, MinerError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path).map_err(|e| {
            MinerError::ConfigError(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&config_str)
            .map_err(|e| MinerError::ConfigError(format!("Invalid config format: {}", e)))
    }

    /// Generates a configuration template string
    ///
    /// # Returns
    /// String containing a commented TOML configuration template that parses
    /// back into a [`Config`]
    pub fn generate_template() -> String {
        let mut template = String::new();
        template.push_str("# STARK miner configuration\n\n");
        template.push_str("# Prover backend: reference or parallel\n");
        template.push_str("backend = \"parallel\"\n");
        template.push_str("# Total threads for the worker pool (0 = all available cores)\n");
        template.push_str("total_threads = 0\n");
        template.push_str("# Threads granted to each worker's prover\n");
        template.push_str("threads_per_worker = 4\n");
        template.push_str("# Seconds between statistics reports\n");
        template.push_str("report_interval_secs = 60\n");
        template
    }
}

/// Sizing of the mining worker pool
///
/// Computed once at startup and immutable thereafter. Invariants:
/// `worker_count() >= 1` and
/// `worker_count() * threads_per_worker() <= total_threads()`, so the pool
/// never oversubscribes the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    total_threads: usize,
    threads_per_worker: usize,
}

impl PoolConfig {
    /// Builds a pool sizing from raw thread counts
    ///
    /// Zero values are lifted to one; the per-worker budget is clamped to
    /// the total so a one-thread host still gets one worker.
    pub fn new(total_threads: usize, threads_per_worker: usize) -> Self {
        let total_threads = total_threads.max(1);
        let threads_per_worker = threads_per_worker.clamp(1, total_threads);
        PoolConfig {
            total_threads,
            threads_per_worker,
        }
    }

    /// Resolves pool sizing from the environment and configuration
    ///
    /// Precedence: `MINING_THREADS` environment variable, then the
    /// configured `total_threads` if nonzero, then the host's CPU count.
    pub fn from_config(config: &Config) -> Self {
        let env_threads = std::env::var(MINING_THREADS_ENV)
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|&threads| threads > 0);
        let total = resolve_total_threads(env_threads, config.total_threads);
        PoolConfig::new(total, config.threads_per_worker)
    }

    /// Number of workers to spawn: `max(1, total / threads_per_worker)`
    pub fn worker_count(&self) -> usize {
        (self.total_threads / self.threads_per_worker).max(1)
    }

    /// Total threads available to the pool
    pub fn total_threads(&self) -> usize {
        self.total_threads
    }

    /// Internal parallelism budget of each worker's prover
    pub fn threads_per_worker(&self) -> usize {
        self.threads_per_worker
    }
}

/// Picks the total thread count from the override chain
fn resolve_total_threads(env_threads: Option<usize>, configured: usize) -> usize {
    env_threads
        .or_else(|| (configured > 0).then_some(configured))
        .unwrap_or_else(num_cpus::get)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_count_divides_total_by_budget() {
        assert_eq!(PoolConfig::new(32, 4).worker_count(), 8);
        assert_eq!(PoolConfig::new(16, 4).worker_count(), 4);
        assert_eq!(PoolConfig::new(6, 4).worker_count(), 1);
    }

    #[test]
    fn single_thread_host_gets_one_worker() {
        let pool = PoolConfig::new(1, 4);
        assert_eq!(pool.worker_count(), 1);
        assert_eq!(pool.threads_per_worker(), 1);
    }

    #[test]
    fn never_oversubscribes() {
        for total in 1..=40 {
            for per_worker in 1..=8 {
                let pool = PoolConfig::new(total, per_worker);
                assert!(pool.worker_count() >= 1);
                assert!(
                    pool.worker_count() * pool.threads_per_worker() <= pool.total_threads(),
                    "oversubscribed at total={total} per_worker={per_worker}"
                );
            }
        }
    }

    #[test]
    fn zero_inputs_are_lifted() {
        let pool = PoolConfig::new(0, 0);
        assert_eq!(pool.total_threads(), 1);
        assert_eq!(pool.threads_per_worker(), 1);
        assert_eq!(pool.worker_count(), 1);
    }

    #[test]
    fn total_thread_resolution_precedence() {
        assert_eq!(resolve_total_threads(Some(12), 8), 12);
        assert_eq!(resolve_total_threads(None, 8), 8);
        let auto = resolve_total_threads(None, 0);
        assert!(auto >= 1);
    }

    #[test]
    fn template_parses_back() {
        let config: Config = toml::from_str(&Config::generate_template()).unwrap();
        assert_eq!(config.backend, "parallel");
        assert_eq!(config.total_threads, 0);
        assert_eq!(config.threads_per_worker, DEFAULT_THREADS_PER_WORKER);
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.backend, "parallel");
        assert_eq!(config.report_interval_secs, 60);
    }
}
