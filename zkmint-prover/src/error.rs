//! Error types for proof generation.

use std::path::PathBuf;

use thiserror::Error;
use zkmint_common::CalldataError;

/// Errors that abort proof generation. None of these are retried.
#[derive(Debug, Error)]
pub enum ProverError {
    /// A circuit artifact (wasm or proving key) does not exist.
    #[error("missing circuit artifact: {}", .0.display())]
    MissingArtifact(PathBuf),

    /// Witness inputs could not be read or are not integers.
    #[error("invalid witness: {0}")]
    Witness(String),

    /// Filesystem failure while staging prover inputs or outputs.
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The prover process exited unsuccessfully.
    #[error("`{command}` failed ({status}): {stderr}")]
    Process {
        command: String,
        status: String,
        stderr: String,
    },

    /// Prover output could not be interpreted.
    #[error("malformed prover output: {0}")]
    Output(String),

    /// Public signals in the prover output are not integers.
    #[error(transparent)]
    Calldata(#[from] CalldataError),
}

impl ProverError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProverError::Io {
            path: path.into(),
            source,
        }
    }
}
