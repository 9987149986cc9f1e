//! Etherscan oracle against a local HTTP server.

use std::{collections::HashMap, time::Duration};

use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use ethers::types::U256;
use serde_json::json;
use tokio::net::TcpListener;

use zkmint_minter::{
    oracle::{fallback_gas_price_wei, FALLBACK_ETH_USD},
    EconomicEstimator, EtherscanOracle, GasQuote, MarketOracle, OracleError,
};

// ═══════════════════════════════════════════════════════════════════════════════
// TEST SERVER
// ═══════════════════════════════════════════════════════════════════════════════

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn oracle(url: &str) -> EtherscanOracle {
    EtherscanOracle::new(url, "TESTKEY", Duration::from_secs(5)).unwrap()
}

async fn etherscan(Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("apikey").map(String::as_str) != Some("TESTKEY") {
        return (StatusCode::FORBIDDEN, "bad key").into_response();
    }
    match params.get("action").map(String::as_str) {
        Some("ethprice") => Json(json!({
            "status": "1",
            "message": "OK",
            "result": {"ethbtc": "0.05", "ethusd": "3150.42"}
        }))
        .into_response(),
        Some("gasoracle") => Json(json!({
            "status": "1",
            "message": "OK",
            "result": {"SafeGasPrice": "11", "ProposeGasPrice": "12.5", "FastGasPrice": "14"}
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_reads_prices() {
    let url = serve(Router::new().route("/api", get(etherscan))).await;
    let oracle = oracle(&url);

    assert_eq!(oracle.eth_usd_price().await.unwrap(), 3150.42);
    assert_eq!(
        oracle.gas_price_wei().await.unwrap(),
        U256::from(12_500_000_000u64)
    );

    let quote = EconomicEstimator::new(Box::new(oracle)).quote().await;
    assert_eq!(
        quote,
        GasQuote {
            gas_price_wei: U256::from(12_500_000_000u64),
            eth_usd_price: 3150.42,
        }
    );
}

#[tokio::test]
async fn test_numeric_fields() {
    let url = serve(Router::new().route(
        "/api",
        get(|| async {
            Json(json!({
                "status": "1",
                "result": {"ethusd": 2500, "ProposeGasPrice": 30}
            }))
        }),
    ))
    .await;
    let oracle = oracle(&url);

    assert_eq!(oracle.eth_usd_price().await.unwrap(), 2500.0);
    assert_eq!(
        oracle.gas_price_wei().await.unwrap(),
        U256::from(30_000_000_000u64)
    );
}

#[tokio::test]
async fn test_server_error_falls_back() {
    let url = serve(Router::new().route(
        "/api",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream down") }),
    ))
    .await;
    let oracle = oracle(&url);

    assert!(matches!(
        oracle.eth_usd_price().await,
        Err(OracleError::Status(500))
    ));

    let quote = EconomicEstimator::new(Box::new(oracle)).quote().await;
    assert_eq!(quote, GasQuote::fallback());
}

#[tokio::test]
async fn test_malformed_body_falls_back() {
    let url = serve(Router::new().route(
        "/api",
        get(|| async {
            // Etherscan reports errors as a string `result`.
            Json(json!({"status": "0", "message": "NOTOK", "result": "Invalid API Key"}))
        }),
    ))
    .await;
    let oracle = oracle(&url);

    assert!(matches!(
        oracle.gas_price_wei().await,
        Err(OracleError::Body(_))
    ));

    let quote = EconomicEstimator::new(Box::new(oracle)).quote().await;
    assert_eq!(quote.gas_price_wei, fallback_gas_price_wei());
    assert_eq!(quote.eth_usd_price, FALLBACK_ETH_USD);
}

#[tokio::test]
async fn test_negative_gas_price_falls_back() {
    let url = serve(Router::new().route(
        "/api",
        get(|| async {
            Json(json!({
                "status": "1",
                "result": {"ethusd": "3000", "ProposeGasPrice": "-5"}
            }))
        }),
    ))
    .await;
    let oracle = oracle(&url);

    assert!(matches!(
        oracle.gas_price_wei().await,
        Err(OracleError::Body(_))
    ));

    let quote = EconomicEstimator::new(Box::new(oracle)).quote().await;
    assert_eq!(quote.gas_price_wei, fallback_gas_price_wei());
    assert_eq!(quote.eth_usd_price, 3000.0);
}

#[tokio::test]
async fn test_non_json_and_bad_price_fall_back() {
    let url = serve(Router::new().route(
        "/api",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            match params.get("action").map(String::as_str) {
                Some("ethprice") => {
                    Json(json!({"result": {"ethusd": "-1"}})).into_response()
                }
                _ => "<html>rate limited</html>".into_response(),
            }
        }),
    ))
    .await;
    let oracle = oracle(&url);

    assert!(oracle.eth_usd_price().await.is_err());
    assert!(oracle.gas_price_wei().await.is_err());

    let quote = EconomicEstimator::new(Box::new(oracle)).quote().await;
    assert_eq!(quote, GasQuote::fallback());
}

#[tokio::test]
async fn test_unreachable_falls_back() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let oracle = oracle(&format!("http://{addr}/api"));
    assert!(matches!(
        oracle.gas_price_wei().await,
        Err(OracleError::Http(_))
    ));

    let quote = EconomicEstimator::new(Box::new(oracle)).quote().await;
    assert_eq!(quote, GasQuote::fallback());
}
