//! Gas price and ETH/USD oracles.
//!
//! Oracle failures never stop a mint. Every query result passes through
//! [`OrFallback`], which substitutes a fixed value and logs a warning.

use std::time::Duration;

use async_trait::async_trait;
use ethers::{
    types::U256,
    utils::{parse_units, ParseUnits},
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::OracleError;

/// ETH/USD rate used when the price oracle is unavailable.
pub const FALLBACK_ETH_USD: f64 = 2000.0;

/// Gas price in gwei used when the gas oracle is unavailable.
pub const FALLBACK_GAS_PRICE_GWEI: u64 = 20;

/// Default Etherscan-compatible API endpoint.
pub const DEFAULT_ORACLE_URL: &str = "https://api.etherscan.io/api";

pub fn fallback_gas_price_wei() -> U256 {
    U256::from(FALLBACK_GAS_PRICE_GWEI) * U256::exp10(9)
}

/// Source of market data for cost reporting.
#[async_trait]
pub trait MarketOracle: Send + Sync {
    /// Proposed gas price in wei.
    async fn gas_price_wei(&self) -> Result<U256, OracleError>;

    /// Current ETH/USD rate.
    async fn eth_usd_price(&self) -> Result<f64, OracleError>;
}

/// Replace a failed oracle result with its fallback.
pub trait OrFallback<T> {
    fn or_fallback(self, what: &str, fallback: T) -> T;
}

impl<T: std::fmt::Debug> OrFallback<T> for Result<T, OracleError> {
    fn or_fallback(self, what: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{} unavailable ({}), using fallback {:?}", what, err, fallback);
                fallback
            }
        }
    }
}

/// Etherscan-style `module`/`action` API client.
#[derive(Clone)]
pub struct EtherscanOracle {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl EtherscanOracle {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Fetch `result` for one module/action pair.
    async fn query(&self, module: &str, action: &str) -> Result<Value, OracleError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("module", module), ("action", action), ("apikey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let mut value: Value = serde_json::from_str(&body)
            .map_err(|e| OracleError::Body(format!("invalid JSON: {e}")))?;

        match value.get_mut("result").map(Value::take) {
            Some(result @ Value::Object(_)) => Ok(result),
            Some(other) => Err(OracleError::Body(format!("{module}/{action} result: {other}"))),
            None => Err(OracleError::Body(format!("{module}/{action}: no result"))),
        }
    }
}

#[async_trait]
impl MarketOracle for EtherscanOracle {
    async fn gas_price_wei(&self) -> Result<U256, OracleError> {
        let result = self.query("gastracker", "gasoracle").await?;
        let gwei = field_text(&result, "ProposeGasPrice")?;
        let wei = gwei_to_wei(&gwei)?;
        debug!("Gas oracle: {} gwei", gwei);
        Ok(wei)
    }

    async fn eth_usd_price(&self) -> Result<f64, OracleError> {
        let result = self.query("stats", "ethprice").await?;
        let text = field_text(&result, "ethusd")?;
        let price: f64 = text
            .parse()
            .map_err(|_| OracleError::Body(format!("ethusd is not a number: {text}")))?;
        if !price.is_finite() || price <= 0.0 {
            return Err(OracleError::Body(format!("ethusd out of range: {text}")));
        }
        debug!("Price oracle: {} USD/ETH", price);
        Ok(price)
    }
}

/// Read a field that may be a JSON string or number.
fn field_text(result: &Value, field: &str) -> Result<String, OracleError> {
    match result.get(field) {
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(OracleError::Body(format!("missing {field}"))),
    }
}

/// Convert a decimal gwei amount to wei without going through floats.
pub fn gwei_to_wei(gwei: &str) -> Result<U256, OracleError> {
    match parse_units(gwei, "gwei") {
        Ok(ParseUnits::U256(wei)) => Ok(wei),
        Ok(ParseUnits::I256(_)) => Err(OracleError::Body(format!("negative gas price {gwei}"))),
        Err(e) => Err(OracleError::Body(format!("bad gas price {gwei}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gwei_to_wei() {
        assert_eq!(gwei_to_wei("20").unwrap(), fallback_gas_price_wei());
        assert_eq!(gwei_to_wei("1.5").unwrap(), U256::from(1_500_000_000u64));
        assert_eq!(gwei_to_wei("0.000000001").unwrap(), U256::one());
        assert!(gwei_to_wei("twenty").is_err());
    }

    #[test]
    fn test_gwei_to_wei_rejects_negative() {
        assert!(matches!(gwei_to_wei("-1"), Err(OracleError::Body(_))));
        assert!(matches!(gwei_to_wei("-0.5"), Err(OracleError::Body(_))));
    }

    #[test]
    fn test_field_text_accepts_numbers() {
        let result = serde_json::json!({"ethusd": 3120.5, "ProposeGasPrice": " 12 "});
        assert_eq!(field_text(&result, "ethusd").unwrap(), "3120.5");
        assert_eq!(field_text(&result, "ProposeGasPrice").unwrap(), "12");
        assert!(field_text(&result, "missing").is_err());
    }

    #[test]
    fn test_or_fallback() {
        let failed: Result<f64, OracleError> = Err(OracleError::Status(503));
        assert_eq!(failed.or_fallback("ETH/USD", FALLBACK_ETH_USD), 2000.0);

        let ok: Result<f64, OracleError> = Ok(3100.0);
        assert_eq!(ok.or_fallback("ETH/USD", FALLBACK_ETH_USD), 3100.0);
    }
}
