//! snarkjs-backed proof generation.
//!
//! Runs `snarkjs <system> fullprove` followed by
//! `snarkjs zkey export soliditycalldata`, staging inputs and outputs in a
//! working directory.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};
use zkmint_common::{ProofArtifact, ProofSystem};

use crate::{
    read_json, write_json, ProofGenerator, ProverError, ProverOutput, WitnessInputs, INPUT_FILE,
    PROOF_FILE, PUBLIC_FILE,
};

/// The two fixed circuit artifacts a full prove needs.
#[derive(Debug, Clone)]
pub struct CircuitArtifacts {
    /// Witness calculator compiled to wasm.
    pub wasm: PathBuf,
    /// Proving key.
    pub zkey: PathBuf,
}

impl CircuitArtifacts {
    pub fn new(wasm: impl Into<PathBuf>, zkey: impl Into<PathBuf>) -> Self {
        Self {
            wasm: wasm.into(),
            zkey: zkey.into(),
        }
    }

    async fn ensure_present(&self) -> Result<(), ProverError> {
        for path in [&self.wasm, &self.zkey] {
            if tokio::fs::metadata(path).await.is_err() {
                return Err(ProverError::MissingArtifact(path.clone()));
            }
        }
        Ok(())
    }
}

/// Proof generator that shells out to the snarkjs CLI.
#[derive(Debug, Clone)]
pub struct SnarkjsProver {
    binary: PathBuf,
    system: ProofSystem,
    artifacts: CircuitArtifacts,
    work_dir: PathBuf,
}

impl SnarkjsProver {
    pub fn new(
        system: ProofSystem,
        artifacts: CircuitArtifacts,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            binary: PathBuf::from("snarkjs"),
            system,
            artifacts,
            work_dir: work_dir.into(),
        }
    }

    /// Use a specific snarkjs executable instead of the one on `PATH`.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    async fn run<I, S>(&self, args: I) -> Result<String, ProverError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args
            .into_iter()
            .map(|a| a.as_ref().to_os_string())
            .collect();
        let command = format!(
            "{} {}",
            self.binary.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        debug!("running {}", command);

        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .await
            .map_err(|err| ProverError::io(&self.binary, err))?;

        if !output.status.success() {
            return Err(ProverError::Process {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout)
            .map_err(|_| ProverError::Output(format!("`{command}` wrote non-utf8 output")))
    }
}

#[async_trait]
impl ProofGenerator for SnarkjsProver {
    fn system(&self) -> ProofSystem {
        self.system
    }

    async fn full_prove(&self, witness: &WitnessInputs) -> Result<ProverOutput, ProverError> {
        if witness.is_empty() {
            return Err(ProverError::Witness("no circuit inputs supplied".into()));
        }
        self.artifacts.ensure_present().await?;
        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .map_err(|err| ProverError::io(&self.work_dir, err))?;

        let input = self.work_dir.join(INPUT_FILE);
        let proof = self.work_dir.join(PROOF_FILE);
        let public = self.work_dir.join(PUBLIC_FILE);
        write_json(&input, &witness.to_json()).await?;

        info!("Generating {} proof…", self.system);
        self.run([
            OsStr::new(self.system.as_str()),
            OsStr::new("fullprove"),
            input.as_os_str(),
            self.artifacts.wasm.as_os_str(),
            self.artifacts.zkey.as_os_str(),
            proof.as_os_str(),
            public.as_os_str(),
        ])
        .await?;

        let artifact = ProofArtifact::from_json(read_json(&proof).await?, &read_json(&public).await?)?;
        info!(
            "Proof ready with {} public signals",
            artifact.public_signals.len()
        );

        let calldata = self
            .run([
                OsStr::new("zkey"),
                OsStr::new("export"),
                OsStr::new("soliditycalldata"),
                public.as_os_str(),
                proof.as_os_str(),
            ])
            .await?;

        Ok(ProverOutput {
            system: self.system,
            artifact,
            calldata: calldata.trim().to_string(),
        })
    }
}
