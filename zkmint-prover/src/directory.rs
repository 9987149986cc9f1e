//! Replay of proofs staged on disk.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;
use zkmint_common::ProofSystem;

use crate::{ProofGenerator, ProverError, ProverOutput, WitnessInputs};

/// Serves a proof that was generated earlier and staged with
/// [`ProverOutput::write_to_dir`]. The witness is not consulted.
#[derive(Debug, Clone)]
pub struct ProofDirectory {
    system: ProofSystem,
    dir: PathBuf,
}

impl ProofDirectory {
    pub fn new(system: ProofSystem, dir: impl Into<PathBuf>) -> Self {
        Self {
            system,
            dir: dir.into(),
        }
    }
}

#[async_trait]
impl ProofGenerator for ProofDirectory {
    fn system(&self) -> ProofSystem {
        self.system
    }

    async fn full_prove(&self, _witness: &WitnessInputs) -> Result<ProverOutput, ProverError> {
        info!("Loading staged {} proof from {}", self.system, self.dir.display());
        ProverOutput::read_from_dir(self.system, &self.dir).await
    }
}
