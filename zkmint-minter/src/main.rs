//! zkmint-minter
//!
//! Proves a witness, mints the token with the proof, and writes the minted
//! token URI and its on-chain SVG to disk.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use zkmint_common::ProofSystem;
use zkmint_minter::{
    EconomicEstimator, EtherscanOracle, EvmSubmitter, MintPipeline, MinterConfig, OutputPaths,
};
use zkmint_prover::{
    CircuitArtifacts, ProofDirectory, ProofGenerator, SnarkjsProver, WitnessInputs,
};

#[derive(Parser)]
#[command(version, about = "Mint a zk-proof-gated token")]
struct Args {
    /// Verifier ABI of the deployed contract.
    #[arg(long, default_value = "plonk")]
    system: ProofSystem,
    #[arg(long, default_value = "input.json")]
    witness_json: PathBuf,
    #[arg(long, default_value = "circuits/bgTrait_js/bgTrait.wasm")]
    wasm: PathBuf,
    #[arg(long, default_value = "circuits/bgTrait.zkey")]
    zkey: PathBuf,
    #[arg(long, default_value = "snarkjs")]
    snarkjs: PathBuf,
    /// Scratch directory for prover input and output files.
    #[arg(long, default_value = "build/proof")]
    work_dir: PathBuf,
    /// Mint with a proof staged by `zkmint-prover` instead of proving.
    #[arg(long)]
    proof_dir: Option<PathBuf>,
    #[arg(long, default_value = "minted_tokenURI.txt")]
    token_uri_out: PathBuf,
    #[arg(long, default_value = "onchain_svg.svg")]
    svg_out: PathBuf,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "zkmint_minter=info,zkmint_prover=info,zkmint_common=info".into());
    let json = std::env::var("ZKMINT_LOG_JSON").is_ok_and(|v| v == "1" || v == "true");

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let config = MinterConfig::from_env()?;
    info!("Starting zkmint-minter");
    info!("RPC: {}", config.rpc_url);
    info!("Contract: {:?}", config.contract_address);

    let prover: Box<dyn ProofGenerator> = match &args.proof_dir {
        Some(dir) => {
            info!("Using staged proof in {}", dir.display());
            Box::new(ProofDirectory::new(args.system, dir))
        }
        None => Box::new(
            SnarkjsProver::new(
                args.system,
                CircuitArtifacts::new(&args.wasm, &args.zkey),
                &args.work_dir,
            )
            .with_binary(&args.snarkjs),
        ),
    };

    let witness = match &args.proof_dir {
        Some(_) => WitnessInputs::new(),
        None => WitnessInputs::from_file(&args.witness_json)
            .await
            .with_context(|| format!("failed to read {}", args.witness_json.display()))?,
    };

    let chain = EvmSubmitter::connect(
        &config.rpc_url,
        &config.private_key,
        config.contract_address,
        config.chain_id,
    )
    .await
    .context("failed to connect to chain")?;

    let oracle = EtherscanOracle::new(
        config.oracle_url.clone(),
        config.oracle_api_key.clone(),
        config.oracle_timeout,
    )
    .context("failed to build oracle client")?;

    let transcoder = config.transcoder(args.system);

    let pipeline = MintPipeline::new(
        prover,
        Box::new(chain),
        EconomicEstimator::new(Box::new(oracle)),
        transcoder,
        config.gas_limit,
        OutputPaths {
            token_uri: args.token_uri_out,
            artwork: args.svg_out,
        },
    );

    match pipeline.run(&witness).await {
        Ok(outcome) => {
            info!("Mint complete: {:?}", outcome.transaction_hash);
            Ok(())
        }
        Err(err) => {
            error!(code = err.error_code(), after_mint = err.after_mint(), "{}", err);
            Err(err).context("mint failed")
        }
    }
}
