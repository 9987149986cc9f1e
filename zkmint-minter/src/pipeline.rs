//! The end-to-end mint flow.
//!
//! prove -> transcode -> (quote, estimate gas) -> submit -> decode `Minted`
//! -> read the live token URI -> write metadata and artwork.

use std::path::{Path, PathBuf};

use ethers::types::{H256, U256};
use tracing::{info, warn};
use zkmint_common::{extract_artwork, ArtworkAsset, CalldataTranscoder};
use zkmint_prover::{ProofGenerator, WitnessInputs};

use crate::economics::{CostReport, EconomicEstimator};
use crate::error::MintError;
use crate::events::{minted_events, MintedEvent};
use crate::submitters::MintChain;

/// Where a successful mint leaves its files.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub token_uri: PathBuf,
    pub artwork: PathBuf,
}

/// Result of a confirmed mint.
#[derive(Debug, Clone)]
pub struct MintOutcome {
    pub transaction_hash: H256,
    pub estimated_cost: CostReport,
    pub actual_cost: CostReport,
    /// `None` when the receipt carried no decodable `Minted` log.
    pub minted: Option<MintedEvent>,
    pub artwork: Option<ArtworkAsset>,
}

pub struct MintPipeline {
    prover: Box<dyn ProofGenerator>,
    chain: Box<dyn MintChain>,
    estimator: EconomicEstimator,
    transcoder: CalldataTranscoder,
    gas_limit: U256,
    outputs: OutputPaths,
}

impl MintPipeline {
    pub fn new(
        prover: Box<dyn ProofGenerator>,
        chain: Box<dyn MintChain>,
        estimator: EconomicEstimator,
        transcoder: CalldataTranscoder,
        gas_limit: U256,
        outputs: OutputPaths,
    ) -> Self {
        Self {
            prover,
            chain,
            estimator,
            transcoder,
            gas_limit,
            outputs,
        }
    }

    /// Prove `witness`, mint with the proof and recover the token's artwork.
    pub async fn run(&self, witness: &WitnessInputs) -> Result<MintOutcome, MintError> {
        if self.prover.system() != self.transcoder.system() {
            return Err(MintError::Config(format!(
                "prover generates {} proofs but the verifier expects {}",
                self.prover.system(),
                self.transcoder.system()
            )));
        }

        info!("Generating {} proof", self.prover.system());
        let output = self.prover.full_prove(witness).await?;

        let bundle = self.transcoder.transcode(&output.artifact, &output.calldata)?;
        info!(
            "Proof length: {} bytes, public signals: {}",
            bundle.proof_len(),
            bundle.signals().len()
        );

        let (quote, estimated_gas) =
            tokio::join!(self.estimator.quote(), self.chain.estimate_mint_gas(&bundle));
        let estimated_gas = estimated_gas?;
        let estimated_cost = quote.cost(estimated_gas);
        info!("Estimated gas: {}, cost: {}", estimated_gas, estimated_cost);
        if estimated_gas > self.gas_limit {
            warn!(
                "Gas estimate {} exceeds the gas limit {}",
                estimated_gas, self.gas_limit
            );
        }

        let receipt = self.chain.submit_mint(&bundle, self.gas_limit).await?;
        let actual_cost = quote.cost(receipt.gas_used);
        info!(
            "Mint {:?} used {} gas, cost: {}",
            receipt.transaction_hash, receipt.gas_used, actual_cost
        );

        let mut outcome = MintOutcome {
            transaction_hash: receipt.transaction_hash,
            estimated_cost,
            actual_cost,
            minted: None,
            artwork: None,
        };

        let mut events = minted_events(&receipt.logs).into_iter();
        let Some(event) = events.next() else {
            warn!(
                "No Minted event among {} receipt logs; nothing written",
                receipt.logs.len()
            );
            return Ok(outcome);
        };
        let extra = events.count();
        if extra > 0 {
            warn!("Ignoring {} further Minted events in the same receipt", extra);
        }

        info!("Minted token {} to {:?}", event.token_id, event.owner);
        write_output(&self.outputs.token_uri, &event.token_uri).await?;
        info!("Token URI written to {}", self.outputs.token_uri.display());

        self.log_token_state(event.token_id).await;

        let live_uri = self.chain.token_uri(event.token_id).await?;
        outcome.minted = Some(event);

        let artwork = extract_artwork(&live_uri)?;
        write_output(&self.outputs.artwork, &artwork.svg_text).await?;
        info!("Artwork written to {}", self.outputs.artwork.display());

        outcome.artwork = Some(artwork);
        Ok(outcome)
    }

    /// Informational reads after a mint. Failures are only logged.
    async fn log_token_state(&self, token_id: U256) {
        match self.chain.token_id_counter().await {
            Ok(counter) => info!("tokenIdCounter: {}", counter),
            Err(err) => warn!("Could not read tokenIdCounter: {}", err),
        }
        match self.chain.owner_of(token_id).await {
            Ok(owner) => info!("ownerOf({}): {:?}", token_id, owner),
            Err(err) => warn!("Could not read ownerOf({}): {}", token_id, err),
        }
    }
}

async fn write_output(path: &Path, contents: &str) -> Result<(), MintError> {
    let to_error = |source| MintError::Output {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(to_error)?;
    }
    tokio::fs::write(path, contents).await.map_err(to_error)
}
