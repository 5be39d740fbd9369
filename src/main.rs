// src/main.rs
use clap::Parser;
use crossbeam_channel::unbounded;
use hex_literal::hex;
use stark_miner_rs::{self, *};
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

/// Commitment used for benchmark runs; the value is arbitrary but fixed so
/// runs are comparable.
const BENCH_COMMITMENT: [u8; 32] =
    hex!("5f70726f6f662d6f662d776f726b2d62656e63686d61726b2d636f6d6d697421");

/// Main entry point for the STARK miner
///
/// # Returns
/// - `Ok(())` on successful execution
/// - `Err(MinerError)` if any operation fails
///
/// # Flow
/// 1. Parses command line arguments
/// 2. Delegates to appropriate subcommand handler
/// 3. Propagates any errors upward
fn main() -> Result<(), MinerError> {
    let cli = cli::Commands::parse();

    match cli.action {
        cli::Action::Start(opts) => start_mining(opts),
        cli::Action::Benchmark(opts) => run_benchmark(opts),
        cli::Action::Config(opts) => generate_config(opts),
    }
}

/// Starts the mining shell with given configuration options
///
/// Reads kind-tagged JSON requests from stdin, one per line, and writes
/// effect JSON to stdout. Progress effects stream from a listener thread
/// while a batch is in flight.
///
/// # Operations
/// 1. Initializes logging
/// 2. Loads configuration and applies CLI overrides
/// 3. Sizes the worker pool and binds the prover backend
/// 4. Runs the shell adapter over stdin/stdout
fn start_mining(opts: cli::StartOptions) -> Result<(), MinerError> {
    utils::init_logging();

    let mut config = config::load(&opts.config)?;
    // Apply CLI overrides
    if let Some(threads) = opts.threads {
        config.total_threads = threads;
    }
    if let Some(backend) = opts.backend {
        config.backend = backend.to_string();
    }

    let pool = PoolConfig::from_config(&config);
    log::info!(
        "worker pool: {} workers x {} prover threads ({} total)",
        pool.worker_count(),
        pool.threads_per_worker(),
        pool.total_threads()
    );

    let backend: BackendType = config
        .backend
        .parse()
        .map_err(|_| MinerError::ConfigError(format!("Invalid prover backend: {}", config.backend)))?;
    let oracle = create_oracle(backend, pool.threads_per_worker())?;

    // Statistics reporting
    let reporter = stats::StatsReporter::new(Duration::from_secs(config.report_interval_secs));
    reporter.start_reporting();
    let attempt_tx = reporter.attempt_sender();
    let batch_tx = reporter.batch_sender();

    // Progress listener: forwards worker updates as effects and stat events
    let (progress_tx, progress_rx) = unbounded();
    std::thread::spawn(move || {
        for update in progress_rx {
            let _ = attempt_tx.send(1);
            match serde_json::to_string(&shell::MiningEffect::progress(update)) {
                Ok(line) => println!("{line}"),
                Err(e) => log::error!("could not encode progress effect: {e}"),
            }
        }
    });

    let coordinator = Arc::new(MiningCoordinator::new(pool, oracle).with_progress(progress_tx));
    let adapter = shell::ShellAdapter::new(coordinator);
    let mut state = shell::ShellAdapter::initialize(None);

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let request: shell::MiningRequest = match serde_json::from_str(trimmed) {
            Ok(request) => request,
            Err(e) => {
                log::warn!("rejecting malformed request: {e}");
                continue;
            }
        };

        match adapter.handle(state.clone(), request) {
            Ok((effects, next)) => {
                state = next;
                for effect in &effects {
                    match effect {
                        shell::MiningEffect::Mined { .. } => {
                            let _ = batch_tx.send(BatchResult::Solved);
                        }
                        shell::MiningEffect::NoProof { .. }
                        | shell::MiningEffect::Abandoned { .. } => {
                            let _ = batch_tx.send(BatchResult::Unsolved);
                        }
                        _ => {}
                    }
                    println!("{}", serde_json::to_string(effect)?);
                }
            }
            Err(e) => log::error!("request failed: {e}"),
        }
    }

    Ok(())
}

/// Runs prover throughput benchmarks
///
/// # Arguments
/// * `opts` - Benchmark configuration options
///
/// # Operations
/// 1. Initializes benchmark-specific logging
/// 2. Binds the requested prover backend
/// 3. Spawns attempt threads driving proofs until the duration elapses
/// 4. Collects and reports throughput statistics
fn run_benchmark(opts: cli::BenchmarkOptions) -> Result<(), MinerError> {
    utils::init_bench_logging();

    // Split the host's cores across the attempt threads so a parallel
    // backend does not oversubscribe.
    let per_thread_budget = (num_cpus::get() / opts.threads.max(1)).max(1);
    let oracle = create_oracle(opts.backend, per_thread_budget)?;

    let reporter = stats::StatsReporter::new(Duration::from_secs(5));
    let attempt_tx = reporter.attempt_sender();

    log::info!(
        "Starting {} benchmark for {} seconds (trace length {})",
        opts.backend,
        opts.duration,
        opts.length
    );
    log::logger().flush();

    let duration = opts.duration;
    let length = opts.length;
    let start_time = std::time::Instant::now();
    let handles: Vec<_> = (0..opts.threads)
        .map(|thread_id| {
            let oracle = oracle.clone();
            let sender = attempt_tx.clone();
            std::thread::spawn(move || {
                let commitment = Digest::new(BENCH_COMMITMENT);
                let mut counter = thread_id as u64 * 1_000_000_000;
                let mut last_log = std::time::Instant::now();
                let mut attempts = 0u64;

                while start_time.elapsed().as_secs() < duration {
                    let nonce = Digest::from_u64(counter);
                    if let Err(e) = oracle.generate(length, &commitment, &nonce) {
                        log::error!("Proof generation failed: {}", e);
                    }
                    counter += 1;
                    attempts += 1;
                    let _ = sender.send(1);

                    // Log progress every second
                    if last_log.elapsed().as_secs() >= 1 {
                        log::debug!(
                            "Thread {}: {:.1} proofs/s",
                            thread_id,
                            attempts as f64 / last_log.elapsed().as_secs_f64()
                        );
                        attempts = 0;
                        last_log = std::time::Instant::now();
                    }
                }
            })
        })
        .collect();

    // Wait for all threads to complete
    for handle in handles {
        handle
            .join()
            .map_err(|_| MinerError::PoolError("benchmark thread panicked".to_string()))?;
    }

    // Report final results
    let stats = reporter.get_stats();
    let elapsed = start_time.elapsed().as_secs_f64().max(1.0);
    log::info!("Benchmark results:");
    log::info!("Total proofs: {}", stats.proofs_total);
    log::info!(
        "Average throughput: {:.2} proofs/s",
        stats.proofs_total as f64 / elapsed
    );
    log::logger().flush();

    Ok(())
}

/// Generates configuration template file
///
/// # Arguments
/// * `opts` - Configuration generation options
///
/// # Operations
/// 1. Generates template content
/// 2. Writes template to specified output file
fn generate_config(opts: cli::ConfigOptions) -> Result<(), MinerError> {
    let config = config::generate_template();
    std::fs::write(opts.output, config)?;
    Ok(())
}

/// Creates the prover backend instance
///
/// # Arguments
/// * `backend` - Which implementation to bind
/// * `threads_per_worker` - Internal parallelism budget for the parallel
///   backend
///
/// # Returns
/// - `Ok(Arc<dyn ProofOracle>)` on success
/// - `Err(MinerError)` if pool construction fails
fn create_oracle(
    backend: BackendType,
    threads_per_worker: usize,
) -> Result<Arc<dyn ProofOracle>, MinerError> {
    match backend {
        BackendType::Reference => Ok(Arc::new(ReferenceProver::new())),
        BackendType::Parallel => Ok(Arc::new(ParallelProver::new(threads_per_worker)?)),
    }
}
