//! Transaction cost estimation.

use std::fmt;

use ethers::{types::U256, utils::format_ether};
use tracing::info;

use crate::oracle::{
    fallback_gas_price_wei, MarketOracle, OrFallback, FALLBACK_ETH_USD,
};

/// Market prices for one mint. Fetched once, then used for both the estimate
/// and the actual cost so the two are comparable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasQuote {
    pub gas_price_wei: U256,
    pub eth_usd_price: f64,
}

impl GasQuote {
    pub fn fallback() -> Self {
        Self {
            gas_price_wei: fallback_gas_price_wei(),
            eth_usd_price: FALLBACK_ETH_USD,
        }
    }

    /// Price `gas` units at this quote.
    pub fn cost(&self, gas: U256) -> CostReport {
        let cost_wei = gas.saturating_mul(self.gas_price_wei);
        let cost_eth = format_ether(cost_wei);
        let cost_usd = cost_eth.parse::<f64>().unwrap_or(f64::INFINITY) * self.eth_usd_price;
        CostReport {
            gas,
            gas_price_wei: self.gas_price_wei,
            cost_wei,
            cost_eth,
            cost_usd,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CostReport {
    pub gas: U256,
    pub gas_price_wei: U256,
    pub cost_wei: U256,
    /// Decimal ether, full precision.
    pub cost_eth: String,
    pub cost_usd: f64,
}

impl fmt::Display for CostReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ETH (~${:.2} USD)", self.cost_eth, self.cost_usd)
    }
}

/// Fetches a [`GasQuote`] from a market oracle, with fallbacks.
pub struct EconomicEstimator {
    oracle: Box<dyn MarketOracle>,
}

impl EconomicEstimator {
    pub fn new(oracle: Box<dyn MarketOracle>) -> Self {
        Self { oracle }
    }

    /// Query both prices concurrently. Never fails.
    pub async fn quote(&self) -> GasQuote {
        let (gas_price, eth_usd) =
            tokio::join!(self.oracle.gas_price_wei(), self.oracle.eth_usd_price());

        let quote = GasQuote {
            gas_price_wei: gas_price.or_fallback("gas price", fallback_gas_price_wei()),
            eth_usd_price: eth_usd.or_fallback("ETH/USD price", FALLBACK_ETH_USD),
        };
        info!(
            "Gas price {} gwei, ETH/USD {:.2}",
            ethers::utils::format_units(quote.gas_price_wei, "gwei").unwrap_or_default(),
            quote.eth_usd_price
        );
        quote
    }
}
