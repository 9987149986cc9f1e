//! Minter configuration.

use std::{env, fmt, time::Duration};

use anyhow::{Context, Result};
use ethers::types::{Address, U256};
use tracing::warn;
use zkmint_common::{CalldataTranscoder, ProofSystem};

use crate::oracle::DEFAULT_ORACLE_URL;

/// Settings that belong to the deployment rather than to one mint.
#[derive(Clone)]
pub struct MinterConfig {
    /// JSON-RPC endpoint of the target chain.
    pub rpc_url: String,
    /// Hex private key of the minting account.
    pub private_key: String,
    /// Deployed token contract.
    pub contract_address: Address,
    /// Chain id for signing; asked of the node when unset.
    pub chain_id: Option<u64>,
    /// Gas limit attached to `mintNFT`, well above typical estimates.
    pub gas_limit: U256,
    /// Public signal count the verifier was compiled for.
    pub expected_signals: Option<usize>,
    pub oracle_url: String,
    pub oracle_api_key: String,
    pub oracle_timeout: Duration,
}

impl MinterConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let rpc_url =
            lookup("ZKMINT_RPC_URL").unwrap_or_else(|| "http://127.0.0.1:8545".to_string());

        let private_key =
            lookup("ZKMINT_PRIVATE_KEY").context("ZKMINT_PRIVATE_KEY must be set")?;

        let contract_address: Address = lookup("ZKMINT_CONTRACT_ADDRESS")
            .context("ZKMINT_CONTRACT_ADDRESS must be set")?
            .trim()
            .parse()
            .context("ZKMINT_CONTRACT_ADDRESS is not an address")?;

        let chain_id = lookup("ZKMINT_CHAIN_ID")
            .map(|s| s.trim().parse::<u64>())
            .transpose()
            .context("ZKMINT_CHAIN_ID must be an integer")?;

        let gas_limit = lookup("ZKMINT_GAS_LIMIT")
            .map(|s| s.trim().parse::<u64>())
            .transpose()
            .context("ZKMINT_GAS_LIMIT must be an integer")?
            .unwrap_or(15_000_000);

        let expected_signals = lookup("ZKMINT_EXPECTED_SIGNALS")
            .map(|s| s.trim().parse::<usize>())
            .transpose()
            .context("ZKMINT_EXPECTED_SIGNALS must be an integer")?;

        let oracle_url =
            lookup("ZKMINT_ORACLE_URL").unwrap_or_else(|| DEFAULT_ORACLE_URL.to_string());
        let oracle_api_key = lookup("ETHERSCAN_API_KEY").unwrap_or_default();

        let oracle_timeout_secs: u64 = lookup("ZKMINT_ORACLE_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(10);

        Ok(Self {
            rpc_url,
            private_key,
            contract_address,
            chain_id,
            gas_limit: U256::from(gas_limit),
            expected_signals,
            oracle_url,
            oracle_api_key,
            oracle_timeout: Duration::from_secs(oracle_timeout_secs),
        })
    }

    /// Transcoder for `system`, enforcing `ZKMINT_EXPECTED_SIGNALS` when set.
    pub fn transcoder(&self, system: ProofSystem) -> CalldataTranscoder {
        let transcoder = CalldataTranscoder::new(system);
        match self.expected_signals {
            Some(count) => transcoder.with_expected_signals(count),
            None => {
                warn!(
                    "ZKMINT_EXPECTED_SIGNALS is not set; public signal count is not checked against the verifier"
                );
                transcoder
            }
        }
    }
}

impl fmt::Debug for MinterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinterConfig")
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &"<redacted>")
            .field("contract_address", &self.contract_address)
            .field("chain_id", &self.chain_id)
            .field("gas_limit", &self.gas_limit)
            .field("expected_signals", &self.expected_signals)
            .field("oracle_url", &self.oracle_url)
            .field("oracle_timeout", &self.oracle_timeout)
            .finish()
    }
}
