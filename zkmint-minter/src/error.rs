//! Error types for the mint pipeline.

use std::path::PathBuf;

use ethers::types::H256;
use thiserror::Error;
use zkmint_common::{ArtworkError, CalldataError};
use zkmint_prover::ProverError;

/// Failure of one mint invocation. Nothing here is retried.
#[derive(Debug, Error)]
pub enum MintError {
    /// Proof generation failed.
    #[error("proof generation failed: {0}")]
    Prover(#[from] ProverError),

    /// Prover output could not be shaped into verifier arguments.
    #[error("calldata error: {0}")]
    Calldata(#[from] CalldataError),

    /// The contract rejected the mint.
    #[error("mint reverted: {reason}")]
    Reverted { reason: String },

    /// RPC, signing or network failure unrelated to contract logic.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node stopped tracking the transaction before it was mined.
    #[error("transaction {0:?} dropped before confirmation")]
    Dropped(H256),

    /// Invalid operator configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The token's metadata or image could not be decoded.
    #[error("artwork error: {0}")]
    Artwork(#[from] ArtworkError),

    /// Writing a process output file failed.
    #[error("failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MintError {
    /// Get a machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            MintError::Prover(_) => "PROVER_ERROR",
            MintError::Calldata(err) => err.error_code(),
            MintError::Reverted { .. } => "CHAIN_REVERT",
            MintError::Transport(_) => "TRANSPORT_ERROR",
            MintError::Dropped(_) => "TX_DROPPED",
            MintError::Config(_) => "CONFIG_ERROR",
            MintError::Artwork(_) => "ARTWORK_ERROR",
            MintError::Output { .. } => "OUTPUT_ERROR",
        }
    }

    /// True once the mint transaction has been confirmed on chain.
    pub fn after_mint(&self) -> bool {
        matches!(self, MintError::Artwork(_) | MintError::Output { .. })
    }
}

/// Failure of a price or gas oracle query. Always replaced by a fallback.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("oracle returned status {0}")]
    Status(u16),

    #[error("unexpected oracle response: {0}")]
    Body(String),
}
