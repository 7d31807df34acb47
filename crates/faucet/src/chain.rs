//! Chain client collaborator
//!
//! The orchestrator only sees [`ChainClient`]. [`RpcChainClient`] talks
//! JSON-RPC to a test network node that holds the faucet account, so no
//! signing happens in this process.

use crate::error::codes;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Codes used by [`RpcChainClient`] for failures it classifies itself.
pub mod chain_codes {
    pub const ADDRESS_LOCKED: i32 = 20001;
    pub const SEND_FAILED: i32 = 20002;
    pub const UNSUPPORTED_NETWORK: i32 = 20003;
    pub const FAUCET_SELF_CLAIM: i32 = 20004;
}

/// Node error messages meaning a funding transaction for this claim is already pending.
const PENDING_MARKERS: [&str; 2] = ["already known", "address locked"];

/// Failure reported by a chain client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The address already has a claim in flight or funded on the chain side.
    #[error("{message}")]
    AddressLocked { code: i32, message: String },

    /// Any other failure. The claim did not consume the address.
    #[error("{message}")]
    Failed { code: i32, message: String },
}

impl ChainError {
    pub fn code(&self) -> i32 {
        match self {
            ChainError::AddressLocked { code, .. } | ChainError::Failed { code, .. } => *code,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ChainError::AddressLocked { .. })
    }

    pub fn failed(code: i32, message: impl Into<String>) -> Self {
        ChainError::Failed {
            code,
            message: message.into(),
        }
    }
}

/// One funding transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub network: String,
    pub address: String,
    /// Amount in wei
    pub amount: u128,
    /// Tweet url for attributed claims
    pub attribution: Option<String>,
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Send the funding transaction and return its hash.
    async fn send_transaction(&self, request: &DispatchRequest) -> Result<String, ChainError>;

    /// Check that a claim for `address` could be funded right now.
    async fn pre_check(&self, network: &str, address: &str) -> Result<(), ChainError>;
}

/// JSON-RPC chain client for a node that manages the faucet account
pub struct RpcChainClient {
    rpc_url: String,
    network: String,
    faucet_account: String,
    min_balance: u128,
    client: reqwest::Client,
}

impl RpcChainClient {
    /// Every call is bounded by `timeout`.
    pub fn new(
        rpc_url: String,
        network: String,
        faucet_account: String,
        min_balance: u128,
        timeout: Duration,
    ) -> Result<Self, ChainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChainError::failed(codes::CHAIN_UNAVAILABLE, format!("HTTP client: {}", e)))?;

        Ok(Self {
            rpc_url,
            network,
            faucet_account: faucet_account.to_lowercase(),
            min_balance,
            client,
        })
    }

    async fn call(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value, ChainError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                ChainError::failed(codes::CHAIN_UNAVAILABLE, format!("{} request failed: {}", method, e))
            })?;

        let json: serde_json::Value = response.json().await.map_err(|e| {
            ChainError::failed(codes::CHAIN_UNAVAILABLE, format!("{} invalid response: {}", method, e))
        })?;

        if let Some(error) = json.get("error") {
            return Err(classify_rpc_error(error));
        }

        Ok(json
            .get("result")
            .cloned()
            .unwrap_or(serde_json::Value::Null))
    }

    pub async fn get_balance(&self, address: &str) -> Result<u128, ChainError> {
        let result = self
            .call("eth_getBalance", serde_json::json!([address, "latest"]))
            .await?;
        parse_quantity(result.as_str().unwrap_or("0x0"))
    }

    fn check_network(&self, network: &str) -> Result<(), ChainError> {
        if network.eq_ignore_ascii_case(&self.network) {
            Ok(())
        } else {
            Err(ChainError::failed(
                chain_codes::UNSUPPORTED_NETWORK,
                format!("chain client is not connected to {}", network),
            ))
        }
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn send_transaction(&self, request: &DispatchRequest) -> Result<String, ChainError> {
        self.check_network(&request.network)?;

        let mut tx = serde_json::json!({
            "from": self.faucet_account,
            "to": request.address,
            "value": format!("0x{:x}", request.amount),
        });
        if let Some(attribution) = &request.attribution {
            tx["data"] = serde_json::Value::String(format!("0x{}", hex::encode(attribution.as_bytes())));
        }

        debug!("eth_sendTransaction to {} for {} wei", request.address, request.amount);
        let result = self.call("eth_sendTransaction", serde_json::json!([tx])).await?;

        match result.as_str() {
            Some(hash) if !hash.is_empty() => {
                info!("Transaction sent: {}", hash);
                Ok(hash.to_string())
            }
            _ => Err(ChainError::failed(
                chain_codes::SEND_FAILED,
                "node returned no transaction hash",
            )),
        }
    }

    async fn pre_check(&self, network: &str, address: &str) -> Result<(), ChainError> {
        self.check_network(network)?;

        if address.eq_ignore_ascii_case(&self.faucet_account) {
            return Err(ChainError::failed(
                chain_codes::FAUCET_SELF_CLAIM,
                "Cannot send to faucet address",
            ));
        }

        let balance = self.get_balance(&self.faucet_account).await?;
        if balance < self.min_balance {
            warn!("Faucet balance low: {} wei", balance);
            return Err(ChainError::failed(
                codes::INSUFFICIENT_FUNDS,
                "Faucet is out of funds. Please try again later.",
            ));
        }

        debug!("Faucet balance: {} wei", balance);
        Ok(())
    }
}

fn classify_rpc_error(error: &serde_json::Value) -> ChainError {
    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string());

    let lowered = message.to_lowercase();
    if PENDING_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        ChainError::AddressLocked {
            code: chain_codes::ADDRESS_LOCKED,
            message,
        }
    } else {
        ChainError::Failed {
            code: chain_codes::SEND_FAILED,
            message,
        }
    }
}

fn parse_quantity(value: &str) -> Result<u128, ChainError> {
    let digits = value.trim_start_matches("0x");
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16)
        .map_err(|e| ChainError::failed(codes::CHAIN_UNAVAILABLE, format!("bad quantity {}: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pending_errors_are_conflicts() {
        let err = classify_rpc_error(&json!({"code": -32000, "message": "already known"}));
        assert!(err.is_conflict());
        assert_eq!(err.code(), chain_codes::ADDRESS_LOCKED);

        let err = classify_rpc_error(&json!({"code": -32000, "message": "Address Locked: pending claim"}));
        assert!(err.is_conflict());
    }

    #[test]
    fn test_other_errors_are_failures() {
        let err = classify_rpc_error(&json!({"code": -32000, "message": "insufficient funds for gas"}));
        assert!(!err.is_conflict());
        assert_eq!(err.to_string(), "insufficient funds for gas");

        let err = classify_rpc_error(&json!("boom"));
        assert_eq!(err.code(), chain_codes::SEND_FAILED);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_quantity("0x").unwrap(), 0);
        assert_eq!(parse_quantity("0xde0b6b3a7640000").unwrap(), 1_000_000_000_000_000_000);
        assert!(parse_quantity("0xzz").is_err());
    }

    #[test]
    fn test_network_mismatch_is_failure() {
        let client = RpcChainClient::new(
            "http://localhost:8545".into(),
            "Axiom-Testnet".into(),
            "0x00000000000000000000000000000000000000aa".into(),
            0,
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(client.check_network("axiom-testnet").is_ok());
        assert_eq!(
            client.check_network("mainnet").unwrap_err().code(),
            chain_codes::UNSUPPORTED_NETWORK
        );
    }

    #[tokio::test]
    async fn test_pre_check_refuses_faucet_account() {
        let client = RpcChainClient::new(
            "http://127.0.0.1:1".into(),
            "testnet".into(),
            "0x00000000000000000000000000000000000000AA".into(),
            0,
            Duration::from_millis(200),
        )
        .unwrap();
        let err = client
            .pre_check("testnet", "0x00000000000000000000000000000000000000aa")
            .await
            .unwrap_err();
        assert_eq!(err.code(), chain_codes::FAUCET_SELF_CLAIM);
    }
}
