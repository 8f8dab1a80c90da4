use std::time::Duration;

use alloy_primitives::hex;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{
    address_hex, map_rpc_error, parse_quantity, Address, ProviderKind, TransactionReceipt,
    WalletProvider, U256,
};
use crate::error::{DashboardError, Result};

/// EIP-1193 style provider reached over JSON-RPC on HTTP.
pub struct RpcProvider {
    kind: ProviderKind,
    client: Client,
    url: String,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: String,
    status: Option<String>,
    block_number: Option<String>,
}

impl RpcProvider {
    pub fn new(kind: ProviderKind, url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::Provider(format!("Failed to build RPC client: {e}")))?;
        Ok(Self {
            kind,
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        tracing::debug!(method, url = %self.url, "wallet rpc");
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DashboardError::Provider(format!("Wallet request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(DashboardError::Provider(format!(
                "Wallet endpoint returned HTTP {}",
                response.status()
            )));
        }
        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| DashboardError::Provider(format!("Invalid wallet response: {e}")))?;
        if let Some(err) = body.error {
            return Err(map_rpc_error(err.code, &err.message));
        }
        Ok(body.result.unwrap_or(Value::Null))
    }

    async fn request_str(&self, method: &str, params: Value) -> Result<String> {
        match self.request(method, params).await? {
            Value::String(s) => Ok(s),
            other => Err(DashboardError::Provider(format!(
                "Unexpected {method} result: {other}"
            ))),
        }
    }
}

fn quantity(s: &str) -> Result<U256> {
    parse_quantity(s).map_err(DashboardError::Provider)
}

fn block(s: &str) -> Result<u64> {
    u64::try_from(quantity(s)?)
        .map_err(|_| DashboardError::Provider("Block number out of range".into()))
}

#[async_trait]
impl WalletProvider for RpcProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn client_version(&self) -> Result<String> {
        self.request_str("web3_clientVersion", json!([])).await
    }

    async fn request_accounts(&self) -> Result<Vec<Address>> {
        let value = self.request("eth_requestAccounts", json!([])).await?;
        let raw: Vec<String> = serde_json::from_value(value)
            .map_err(|e| DashboardError::Provider(format!("Invalid account list: {e}")))?;
        raw.iter()
            .map(|s| {
                s.parse::<Address>()
                    .map_err(|e| DashboardError::Provider(format!("Invalid account '{s}': {e}")))
            })
            .collect()
    }

    async fn native_balance(&self, address: &Address) -> Result<U256> {
        let raw = self
            .request_str("eth_getBalance", json!([address_hex(address), "latest"]))
            .await?;
        quantity(&raw)
    }

    async fn call(&self, to: &Address, data: &[u8]) -> Result<Vec<u8>> {
        let result = self
            .request_str(
                "eth_call",
                json!([{ "to": address_hex(to), "data": hex::encode_prefixed(data) }, "latest"]),
            )
            .await?;
        hex::decode(&result).map_err(|e| DashboardError::Provider(format!("Invalid call result: {e}")))
    }

    async fn send_transaction(&self, from: &Address, to: &Address, data: &[u8]) -> Result<String> {
        self.request_str(
            "eth_sendTransaction",
            json!([{
                "from": address_hex(from),
                "to": address_hex(to),
                "data": hex::encode_prefixed(data),
            }]),
        )
        .await
    }

    async fn transaction_receipt(&self, hash: &str) -> Result<Option<TransactionReceipt>> {
        let value = self.request("eth_getTransactionReceipt", json!([hash])).await?;
        if value.is_null() {
            return Ok(None);
        }
        let raw: RawReceipt = serde_json::from_value(value)
            .map_err(|e| DashboardError::Provider(format!("Invalid receipt: {e}")))?;
        // Pending receipts have no block number yet.
        let Some(block_number) = raw.block_number.as_deref() else {
            return Ok(None);
        };
        let block_number = block(block_number)?;
        let success = match raw.status.as_deref() {
            Some(status) => !quantity(status)?.is_zero(),
            None => true,
        };
        Ok(Some(TransactionReceipt {
            transaction_hash: raw.transaction_hash,
            success,
            block_number,
        }))
    }

    async fn block_number(&self) -> Result<u64> {
        let raw = self.request_str("eth_blockNumber", json!([])).await?;
        block(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_parsing() {
        let raw: RawReceipt = serde_json::from_value(json!({
            "transactionHash": "0xabc",
            "status": "0x0",
            "blockNumber": "0x10"
        }))
        .unwrap();
        assert_eq!(raw.transaction_hash, "0xabc");
        assert!(quantity(raw.status.as_deref().unwrap()).unwrap().is_zero());
        assert_eq!(block(raw.block_number.as_deref().unwrap()).unwrap(), 16);
    }

    #[test]
    fn rpc_error_body_parsing() {
        let body: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": 4001, "message": "User rejected the request." }
        }))
        .unwrap();
        let err = body.error.unwrap();
        assert!(matches!(map_rpc_error(err.code, &err.message), DashboardError::UserRejected));
    }

    #[tokio::test]
    #[ignore] // requires a wallet endpoint on localhost:8545
    async fn local_node_answers_client_version() {
        let provider =
            RpcProvider::new(ProviderKind::MetaMask, "http://127.0.0.1:8545", Duration::from_secs(5))
                .unwrap();
        let version = provider.client_version().await.unwrap();
        assert!(!version.is_empty());
    }
}
