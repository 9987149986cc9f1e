//! `Minted` event extraction from receipt logs.
//!
//! A mint receipt also carries the ERC-721 `Transfer` and whatever the verifier
//! emits. A log that does not decode as `Minted` is skipped, never an error.

use ethers::{
    abi::RawLog,
    contract::EthEvent,
    types::{Address, Log, U256},
};

use crate::bindings::MintedFilter;

/// A decoded `Minted(tokenId, owner, tokenURI)` log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintedEvent {
    pub token_id: U256,
    pub owner: Address,
    pub token_uri: String,
}

impl From<MintedFilter> for MintedEvent {
    fn from(event: MintedFilter) -> Self {
        Self {
            token_id: event.token_id,
            owner: event.owner,
            token_uri: event.token_uri,
        }
    }
}

/// Decode `log` as a `Minted` event, or `None` if it is some other log.
pub fn decode_minted(log: &Log) -> Option<MintedEvent> {
    let raw = RawLog {
        topics: log.topics.clone(),
        data: log.data.to_vec(),
    };
    <MintedFilter as EthEvent>::decode_log(&raw)
        .ok()
        .map(MintedEvent::from)
}

/// Every `Minted` event in `logs`, in log order.
pub fn minted_events(logs: &[Log]) -> Vec<MintedEvent> {
    logs.iter().filter_map(decode_minted).collect()
}
