//! Chain access for minting.

mod evm;

pub use evm::{decode_revert_reason, EvmSubmitter};

use async_trait::async_trait;
use ethers::types::{Address, Log, H256, U256};
use zkmint_common::CalldataBundle;

use crate::error::MintError;

/// A confirmed, successful mint transaction.
#[derive(Debug, Clone, Default)]
pub struct MintReceipt {
    pub transaction_hash: H256,
    pub gas_used: U256,
    pub logs: Vec<Log>,
}

/// Trait for the token contract the pipeline mints against.
#[async_trait]
pub trait MintChain: Send + Sync {
    /// Estimate gas for `mintNFT` with `bundle`. A revert here means the
    /// contract would reject the proof.
    async fn estimate_mint_gas(&self, bundle: &CalldataBundle) -> Result<U256, MintError>;

    /// Send `mintNFT` with an explicit gas limit and wait for one confirmation.
    async fn submit_mint(
        &self,
        bundle: &CalldataBundle,
        gas_limit: U256,
    ) -> Result<MintReceipt, MintError>;

    async fn token_id_counter(&self) -> Result<U256, MintError>;

    async fn owner_of(&self, token_id: U256) -> Result<Address, MintError>;

    async fn token_uri(&self, token_id: U256) -> Result<String, MintError>;
}
