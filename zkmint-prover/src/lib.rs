//! zkmint-prover
//!
//! Proof generation for the zkmint pipeline. The proving system itself is an
//! external tool; this crate drives it and hands back the proof artifact along
//! with the verifier calldata it exports.

pub mod directory;
pub mod error;
pub mod snarkjs;
pub mod witness;

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use zkmint_common::{ProofArtifact, ProofSystem};

pub use directory::ProofDirectory;
pub use error::ProverError;
pub use snarkjs::{CircuitArtifacts, SnarkjsProver};
pub use witness::WitnessInputs;

/// File names used when a proof is staged on disk.
pub const PROOF_FILE: &str = "proof.json";
pub const PUBLIC_FILE: &str = "public.json";
pub const CALLDATA_FILE: &str = "calldata.txt";
pub const INPUT_FILE: &str = "input.json";

/// A finished proof and the calldata the proving library exported for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProverOutput {
    pub system: ProofSystem,
    pub artifact: ProofArtifact,
    pub calldata: String,
}

impl ProverOutput {
    /// Load `proof.json`, `public.json` and `calldata.txt` from `dir`.
    pub async fn read_from_dir(system: ProofSystem, dir: &Path) -> Result<Self, ProverError> {
        let proof = read_json(&dir.join(PROOF_FILE)).await?;
        let public = read_json(&dir.join(PUBLIC_FILE)).await?;
        let calldata_path = dir.join(CALLDATA_FILE);
        let calldata = tokio::fs::read_to_string(&calldata_path)
            .await
            .map_err(|err| ProverError::io(&calldata_path, err))?;

        Ok(Self {
            system,
            artifact: ProofArtifact::from_json(proof, &public)?,
            calldata: calldata.trim().to_string(),
        })
    }

    /// Stage the proof in `dir` so it can be replayed with [`ProofDirectory`].
    pub async fn write_to_dir(&self, dir: &Path) -> Result<(), ProverError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|err| ProverError::io(dir, err))?;
        write_json(&dir.join(PROOF_FILE), &self.artifact.proof).await?;
        write_json(&dir.join(PUBLIC_FILE), &self.artifact.public_signals_json()).await?;
        let calldata_path = dir.join(CALLDATA_FILE);
        tokio::fs::write(&calldata_path, &self.calldata)
            .await
            .map_err(|err| ProverError::io(&calldata_path, err))?;
        debug!("staged {} proof in {}", self.system, dir.display());
        Ok(())
    }
}

/// Produces a proof for a witness. Failures are fatal to the mint.
#[async_trait]
pub trait ProofGenerator: Send + Sync {
    /// Proving scheme of the generated proofs.
    fn system(&self) -> ProofSystem;

    /// Run the full prove and export verifier calldata.
    async fn full_prove(&self, witness: &WitnessInputs) -> Result<ProverOutput, ProverError>;
}

pub(crate) async fn read_json(path: &Path) -> Result<Value, ProverError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| ProverError::io(path, err))?;
    serde_json::from_str(&raw)
        .map_err(|err| ProverError::Output(format!("{}: {err}", path.display())))
}

pub(crate) async fn write_json(path: &Path, value: &Value) -> Result<(), ProverError> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|err| ProverError::Output(err.to_string()))?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|err| ProverError::io(path, err))
}
