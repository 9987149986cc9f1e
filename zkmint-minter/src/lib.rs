//! zkmint-minter
//!
//! Mints a token gated by a zk proof against a verifier-backed contract:
//! generates the proof, shapes it into verifier calldata, prices the
//! transaction, submits it, and recovers the artwork the contract generated.

pub mod bindings;
pub mod config;
pub mod economics;
pub mod error;
pub mod events;
pub mod oracle;
pub mod pipeline;
pub mod submitters;

pub use config::MinterConfig;
pub use economics::{CostReport, EconomicEstimator, GasQuote};
pub use error::{MintError, OracleError};
pub use events::{decode_minted, minted_events, MintedEvent};
pub use oracle::{EtherscanOracle, MarketOracle, OrFallback};
pub use pipeline::{MintOutcome, MintPipeline, OutputPaths};
pub use submitters::{EvmSubmitter, MintChain, MintReceipt};
