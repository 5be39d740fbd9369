// src/utils/error.rs
use crate::miner::coordinator::ProofResult;
use crate::types::ProgressUpdate;
use std::io;
use thiserror::Error;

/// Main error type for the mining application
///
/// This enum represents all possible error conditions that can occur
/// during proof search, including oracle, pool, configuration, and
/// request-handling errors.
#[derive(Error, Debug)]
pub enum MinerError {
    /// Proof generation failed for a specific candidate nonce
    #[error("Proof generation error: {0}")]
    OracleError(String),

    /// Worker pool construction or lifecycle errors (systemic, batch-fatal)
    #[error("Worker pool error: {0}")]
    PoolError(String),

    /// Configuration file or parameter errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid request or parameter errors
    #[error("Invalid input: {0}")]
    InputError(String),

    /// Thread communication channel errors
    #[error("Thread communication error: {0}")]
    ChannelError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Converts crossbeam channel send errors for proof results into MinerError
///
/// Used when failing to deliver a finished proof through the result slot.
/// Wraps the original error in a `ChannelError` variant with context.
impl From<crossbeam_channel::SendError<ProofResult>> for MinerError {
    fn from(e: crossbeam_channel::SendError<ProofResult>) -> Self {
        MinerError::ChannelError(format!("Proof result send failed: {}", e))
    }
}

/// Converts crossbeam channel send errors for progress updates into MinerError
impl From<crossbeam_channel::SendError<ProgressUpdate>> for MinerError {
    fn from(e: crossbeam_channel::SendError<ProgressUpdate>) -> Self {
        MinerError::ChannelError(format!("Progress send failed: {}", e))
    }
}

/// Converts hex decoding errors into MinerError
///
/// Used when invalid hex data is encountered during:
/// - Commitment and nonce parsing
/// - Target parsing
/// Wraps the original error in an `InputError` variant.
impl From<hex::FromHexError> for MinerError {
    fn from(e: hex::FromHexError) -> Self {
        MinerError::InputError(format!("Hex conversion failed: {}", e))
    }
}
