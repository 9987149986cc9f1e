//! EVM token submitter.

use std::sync::Arc;

use async_trait::async_trait;
use ethers::{
    abi::{self, ParamType, Token},
    contract::{ContractCall, ContractError},
    prelude::*,
    types::{Address, BlockId, BlockNumber, Bytes, TransactionReceipt, H256, U256},
};
use num_bigint::BigUint;
use tracing::{debug, info, warn};
use zkmint_common::{CalldataBundle, CalldataError};

use super::{MintChain, MintReceipt};
use crate::bindings::{groth16::Groth16Minter, plonk::PlonkMinter, MintToken};
use crate::error::MintError;

/// `Error(string)` selector.
const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];
/// `Panic(uint256)` selector.
const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// Mints against a deployed token through any ethers middleware.
pub struct EvmSubmitter<M> {
    contract_address: Address,
    token: MintToken<M>,
    plonk: PlonkMinter<M>,
    groth16: Groth16Minter<M>,
}

impl<M: Middleware + 'static> EvmSubmitter<M> {
    pub fn new(client: Arc<M>, contract_address: Address) -> Self {
        Self {
            contract_address,
            token: MintToken::new(contract_address, client.clone()),
            plonk: PlonkMinter::new(contract_address, client.clone()),
            groth16: Groth16Minter::new(contract_address, client),
        }
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    /// Build the `mintNFT` call matching the bundle's verifier shape.
    fn mint_call(&self, bundle: &CalldataBundle) -> Result<ContractCall<M, ()>, MintError> {
        let signals = bundle
            .signals()
            .iter()
            .map(to_u256)
            .collect::<Result<Vec<_>, _>>()?;

        let call = match bundle {
            CalldataBundle::Plonk { proof_bytes, .. } => self
                .plonk
                .mint_nft(Bytes::from(proof_bytes.clone()), signals),
            CalldataBundle::Groth16 { a, b, c, .. } => self.groth16.mint_nft(
                word_pair(a)?,
                [word_pair(&b[0])?, word_pair(&b[1])?],
                word_pair(c)?,
                signals,
            ),
        };
        Ok(call)
    }
}

impl EvmSubmitter<SignerMiddleware<Provider<Http>, LocalWallet>> {
    /// Connect a signing client to `rpc_url`. The chain id is asked of the
    /// node when not given.
    pub async fn connect(
        rpc_url: &str,
        private_key: &str,
        contract_address: Address,
        chain_id: Option<u64>,
    ) -> Result<Self, MintError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| MintError::Config(format!("invalid RPC URL {rpc_url}: {e}")))?;

        let wallet = private_key
            .trim()
            .parse::<LocalWallet>()
            .map_err(|e| MintError::Config(format!("invalid private key: {e}")))?;

        let chain_id = match chain_id {
            Some(id) => id,
            None => provider
                .get_chainid()
                .await
                .map_err(|e| MintError::Transport(format!("failed to fetch chain id: {e}")))?
                .as_u64(),
        };

        info!(
            "Connected to {} (chain {}) as {:?}",
            rpc_url,
            chain_id,
            wallet.address()
        );

        let client = SignerMiddleware::new(provider, wallet.with_chain_id(chain_id));
        Ok(Self::new(Arc::new(client), contract_address))
    }
}

#[async_trait]
impl<M: Middleware + 'static> MintChain for EvmSubmitter<M> {
    async fn estimate_mint_gas(&self, bundle: &CalldataBundle) -> Result<U256, MintError> {
        let gas = self
            .mint_call(bundle)?
            .estimate_gas()
            .await
            .map_err(classify)?;
        debug!("mintNFT gas estimate: {}", gas);
        Ok(gas)
    }

    async fn submit_mint(
        &self,
        bundle: &CalldataBundle,
        gas_limit: U256,
    ) -> Result<MintReceipt, MintError> {
        let call = self.mint_call(bundle)?.gas(gas_limit);

        debug!("Sending mintNFT to {:?}", self.contract_address);
        let pending = call.send().await.map_err(classify)?;
        let tx_hash = pending.tx_hash();
        info!("Mint transaction submitted: {:?}", tx_hash);

        let receipt = pending
            .confirmations(1)
            .await
            .map_err(|e| MintError::Transport(e.to_string()))?;

        self.settle(bundle, tx_hash, receipt).await
    }

    async fn token_id_counter(&self) -> Result<U256, MintError> {
        self.token.token_id_counter().call().await.map_err(classify)
    }

    async fn owner_of(&self, token_id: U256) -> Result<Address, MintError> {
        self.token.owner_of(token_id).call().await.map_err(classify)
    }

    async fn token_uri(&self, token_id: U256) -> Result<String, MintError> {
        self.token.token_uri(token_id).call().await.map_err(classify)
    }
}

impl<M: Middleware + 'static> EvmSubmitter<M> {
    /// Check the outcome of a confirmed mint transaction.
    async fn settle(
        &self,
        bundle: &CalldataBundle,
        tx_hash: H256,
        receipt: Option<TransactionReceipt>,
    ) -> Result<MintReceipt, MintError> {
        let receipt = receipt.ok_or(MintError::Dropped(tx_hash))?;

        if receipt.status == Some(0u64.into()) {
            warn!("Mint transaction {:?} reverted", tx_hash);
            return Err(self.replay_revert(bundle, receipt.block_number).await);
        }

        info!(
            "Mint confirmed in block {:?}",
            receipt.block_number.unwrap_or_default()
        );

        Ok(MintReceipt {
            transaction_hash: receipt.transaction_hash,
            gas_used: receipt.gas_used.unwrap_or_default(),
            logs: receipt.logs,
        })
    }

    /// Re-run a failed mint as a call against its block to recover the
    /// revert reason.
    async fn replay_revert(&self, bundle: &CalldataBundle, block: Option<U64>) -> MintError {
        let call = match self.mint_call(bundle) {
            Ok(call) => call,
            Err(err) => return err,
        };
        let call = match block {
            Some(number) => call.block(BlockId::Number(BlockNumber::Number(number))),
            None => call,
        };
        match call.call().await {
            Err(err) => match classify(err) {
                reverted @ MintError::Reverted { .. } => reverted,
                other => MintError::Reverted {
                    reason: format!("status 0 (replay failed: {other})"),
                },
            },
            Ok(()) => MintError::Reverted {
                reason: "status 0".to_string(),
            },
        }
    }
}

/// Separate contract rejections from transport failures.
fn classify<M: Middleware>(err: ContractError<M>) -> MintError {
    if let Some(data) = err.as_revert() {
        let reason = decode_revert_reason(data)
            .unwrap_or_else(|| "execution reverted".to_string());
        return MintError::Reverted { reason };
    }

    let message = err.to_string();
    match message.find("execution reverted") {
        Some(at) => MintError::Reverted {
            reason: message[at..].to_string(),
        },
        None => MintError::Transport(message),
    }
}

/// Decode Solidity revert data into a readable reason.
///
/// Returns `None` for empty data. Unknown custom errors are reported by
/// selector.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    if data.is_empty() {
        return None;
    }
    if data.len() < 4 {
        return Some(format!("0x{}", hex::encode(data)));
    }

    let (selector, body) = data.split_at(4);
    if selector == ERROR_STRING_SELECTOR {
        if let Ok(mut tokens) = abi::decode(&[ParamType::String], body) {
            if let Some(Token::String(reason)) = tokens.pop() {
                return Some(reason);
            }
        }
    } else if selector == PANIC_SELECTOR {
        if let Ok(mut tokens) = abi::decode(&[ParamType::Uint(256)], body) {
            if let Some(Token::Uint(code)) = tokens.pop() {
                return Some(format!("panic code 0x{code:x}"));
            }
        }
    }

    Some(format!("custom error 0x{}", hex::encode(selector)))
}

fn to_u256(value: &BigUint) -> Result<U256, CalldataError> {
    if value.bits() > 256 {
        return Err(CalldataError::Integer(format!(
            "{value} does not fit in uint256"
        )));
    }
    Ok(U256::from_big_endian(&value.to_bytes_be()))
}

fn word_pair(values: &[BigUint; 2]) -> Result<[U256; 2], CalldataError> {
    Ok([to_u256(&values[0])?, to_u256(&values[1])?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::providers::{JsonRpcError, MockProvider, MockResponse};

    fn mocked() -> (EvmSubmitter<Provider<MockProvider>>, MockProvider) {
        let (provider, mock) = Provider::mocked();
        let submitter = EvmSubmitter::new(Arc::new(provider), Address::from_low_u64_be(0x1234));
        (submitter, mock)
    }

    fn revert_error(reason: &str) -> MockResponse {
        let mut data = ERROR_STRING_SELECTOR.to_vec();
        data.extend(abi::encode(&[Token::String(reason.into())]));
        MockResponse::Error(JsonRpcError {
            code: 3,
            message: format!("execution reverted: {reason}"),
            data: Some(serde_json::Value::String(format!("0x{}", hex::encode(data)))),
        })
    }

    fn plonk_bundle(signals: Vec<BigUint>) -> CalldataBundle {
        CalldataBundle::Plonk {
            proof_bytes: vec![0xab; 64],
            signals,
        }
    }

    #[test]
    fn test_decode_error_string() {
        let mut data = ERROR_STRING_SELECTOR.to_vec();
        data.extend(abi::encode(&[Token::String("Invalid proof".into())]));
        assert_eq!(decode_revert_reason(&data).as_deref(), Some("Invalid proof"));
    }

    #[test]
    fn test_decode_panic() {
        let mut data = PANIC_SELECTOR.to_vec();
        data.extend(abi::encode(&[Token::Uint(U256::from(0x11))]));
        assert_eq!(
            decode_revert_reason(&data).as_deref(),
            Some("panic code 0x11")
        );
    }

    #[test]
    fn test_decode_custom_error() {
        assert_eq!(
            decode_revert_reason(&[0xde, 0xad, 0xbe, 0xef]).as_deref(),
            Some("custom error 0xdeadbeef")
        );
        assert_eq!(decode_revert_reason(&[]), None);
    }

    #[test]
    fn test_to_u256_bounds() {
        let max = (BigUint::from(1u8) << 256) - 1u8;
        assert_eq!(to_u256(&max).unwrap(), U256::MAX);
        assert!(to_u256(&(BigUint::from(1u8) << 256)).is_err());
        assert_eq!(to_u256(&BigUint::from(42u8)).unwrap(), U256::from(42));
    }

    #[tokio::test]
    async fn test_estimate_gas() {
        let (submitter, mock) = mocked();
        mock.push(U256::from(312_000u64)).unwrap();

        let gas = submitter
            .estimate_mint_gas(&plonk_bundle(vec![BigUint::from(7u8)]))
            .await
            .unwrap();
        assert_eq!(gas, U256::from(312_000u64));
    }

    #[tokio::test]
    async fn test_oversized_signal_rejected_before_rpc() {
        let (submitter, _mock) = mocked();
        let err = submitter
            .estimate_mint_gas(&plonk_bundle(vec![BigUint::from(1u8) << 300]))
            .await
            .unwrap_err();
        assert!(matches!(err, MintError::Calldata(CalldataError::Integer(_))));
    }

    #[tokio::test]
    async fn test_reads_token_uri() {
        let (submitter, mock) = mocked();
        let encoded = abi::encode(&[Token::String(r#"{"name":"t"}"#.into())]);
        mock.push::<Bytes, _>(Bytes::from(encoded)).unwrap();

        let uri = submitter.token_uri(U256::from(3)).await.unwrap();
        assert_eq!(uri, r#"{"name":"t"}"#);
    }

    #[tokio::test]
    async fn test_estimate_revert_carries_reason() {
        let (submitter, mock) = mocked();
        mock.push_response(revert_error("Invalid proof"));

        let err = submitter
            .estimate_mint_gas(&plonk_bundle(vec![BigUint::from(7u8)]))
            .await
            .unwrap_err();
        match err {
            MintError::Reverted { reason } => assert_eq!(reason, "Invalid proof"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_node_error_is_transport() {
        let (submitter, mock) = mocked();
        mock.push_response(MockResponse::Error(JsonRpcError {
            code: -32000,
            message: "insufficient funds for gas * price + value".into(),
            data: None,
        }));

        let err = submitter
            .estimate_mint_gas(&plonk_bundle(vec![BigUint::from(7u8)]))
            .await
            .unwrap_err();
        assert!(matches!(err, MintError::Transport(_)), "{err:?}");
        assert_eq!(err.error_code(), "TRANSPORT_ERROR");
    }

    #[tokio::test]
    async fn test_failed_receipt_replays_for_reason() {
        let (submitter, mock) = mocked();
        mock.push_response(revert_error("Token already minted"));

        let receipt = TransactionReceipt {
            transaction_hash: H256::repeat_byte(0x42),
            status: Some(0u64.into()),
            block_number: Some(7u64.into()),
            ..Default::default()
        };
        let err = submitter
            .settle(
                &plonk_bundle(vec![BigUint::from(7u8)]),
                H256::repeat_byte(0x42),
                Some(receipt),
            )
            .await
            .unwrap_err();
        match err {
            MintError::Reverted { reason } => assert_eq!(reason, "Token already minted"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_receipt_is_dropped() {
        let (submitter, _mock) = mocked();
        let err = submitter
            .settle(
                &plonk_bundle(vec![BigUint::from(7u8)]),
                H256::repeat_byte(0x42),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MintError::Dropped(hash) if hash == H256::repeat_byte(0x42)));
    }

    #[tokio::test]
    async fn test_successful_receipt() {
        let (submitter, _mock) = mocked();
        let receipt = TransactionReceipt {
            transaction_hash: H256::repeat_byte(0x42),
            status: Some(1u64.into()),
            block_number: Some(7u64.into()),
            gas_used: Some(U256::from(512_000)),
            logs: vec![Log::default()],
            ..Default::default()
        };
        let mint = submitter
            .settle(
                &plonk_bundle(vec![BigUint::from(7u8)]),
                H256::repeat_byte(0x42),
                Some(receipt),
            )
            .await
            .unwrap();
        assert_eq!(mint.transaction_hash, H256::repeat_byte(0x42));
        assert_eq!(mint.gas_used, U256::from(512_000));
        assert_eq!(mint.logs.len(), 1);
    }
}
