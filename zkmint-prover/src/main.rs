// zkmint/zkmint-prover/src/main.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use zkmint_common::ProofSystem;
use zkmint_prover::{CircuitArtifacts, ProofGenerator, SnarkjsProver, WitnessInputs};

/// Generate a proof once and stage it for `zkmint-minter --proof-dir`.
#[derive(Parser)]
struct Args {
    #[arg(long, default_value = "plonk")]
    system: ProofSystem,
    #[arg(long)]
    witness_json: PathBuf,
    #[arg(long)]
    wasm: PathBuf,
    #[arg(long)]
    zkey: PathBuf,
    /// Directory receiving proof.json, public.json and calldata.txt.
    #[arg(long, default_value = "build/proof")]
    output_dir: PathBuf,
    #[arg(long, default_value = "snarkjs")]
    snarkjs: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zkmint_prover=info".into()),
        )
        .init();

    let args = Args::parse();
    let witness = WitnessInputs::from_file(&args.witness_json)
        .await
        .with_context(|| format!("failed to read {}", args.witness_json.display()))?;

    let prover = SnarkjsProver::new(
        args.system,
        CircuitArtifacts::new(&args.wasm, &args.zkey),
        &args.output_dir,
    )
    .with_binary(&args.snarkjs);

    let output = prover
        .full_prove(&witness)
        .await
        .context("proof generation failed")?;
    output
        .write_to_dir(&args.output_dir)
        .await
        .with_context(|| format!("failed to stage proof in {}", args.output_dir.display()))?;

    Ok(())
}
