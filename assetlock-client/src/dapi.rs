//! JSON-RPC over HTTP implementation of [`PlatformNetwork`].
//!
//! Binary payloads travel hex-encoded. Instant locks are polled a bounded
//! number of times and the result wait is wrapped in a timeout.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use assetlock_common::{Identifier, LockConfirmation, TransitionHash, TxHash};

use crate::config::DapiConfig;
use crate::error::TransportError;
use crate::network::{PlatformNetwork, WaitForResultResponse};

/// DAPI JSON-RPC client.
#[derive(Debug)]
pub struct DapiHttpClient {
    client: reqwest::Client,
    config: DapiConfig,
    next_id: AtomicU64,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendTransactionResult {
    transaction_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstantLockResult {
    instant_lock: String,
}

#[derive(Debug, Deserialize)]
struct IdentityResult {
    identity: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataContractResult {
    data_contract: String,
}

fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>, TransportError> {
    hex::decode(value)
        .map_err(|e| TransportError::MalformedResponse(format!("{} is not hex: {}", field, e)))
}

impl DapiHttpClient {
    pub fn new(config: DapiConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, TransportError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(method.to_string())
                } else {
                    TransportError::Connection(format!("{} failed: {}", method, e))
                }
            })?;

        if !response.status().is_success() {
            return Err(TransportError::Connection(format!(
                "{} failed with status: {}",
                method,
                response.status()
            )));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| TransportError::MalformedResponse(format!("{}: {}", method, e)))?;
        parse_result(method, body)
    }
}

fn parse_result<T: DeserializeOwned>(method: &str, body: RpcResponse) -> Result<T, TransportError> {
    if let Some(error) = body.error {
        return Err(TransportError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    serde_json::from_value(body.result.unwrap_or(serde_json::Value::Null))
        .map_err(|e| TransportError::MalformedResponse(format!("{}: {}", method, e)))
}

#[async_trait]
impl PlatformNetwork for DapiHttpClient {
    async fn send_transaction(&self, raw: &[u8]) -> Result<TxHash, TransportError> {
        let result: SendTransactionResult = self
            .call("sendTransaction", json!({ "transaction": hex::encode(raw) }))
            .await?;
        TxHash::from_hex(&result.transaction_id)
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))
    }

    async fn get_instant_lock(&self, tx_hash: &TxHash) -> Result<LockConfirmation, TransportError> {
        let interval = Duration::from_millis(self.config.lock_poll_interval_ms);
        for attempt in 0..self.config.lock_poll_attempts {
            let result: Option<InstantLockResult> = self
                .call("getInstantLock", json!({ "txid": tx_hash.to_hex() }))
                .await?;
            if let Some(result) = result {
                let bytes = decode_hex("instantLock", &result.instant_lock)?;
                return LockConfirmation::from_bytes(&bytes)
                    .map_err(|e| TransportError::MalformedResponse(e.to_string()));
            }
            debug!(%tx_hash, attempt, "instant lock not yet available");
            tokio::time::sleep(interval).await;
        }
        Err(TransportError::Timeout(format!("instant lock for {}", tx_hash)))
    }

    async fn broadcast_state_transition(&self, bytes: &[u8]) -> Result<(), TransportError> {
        let _: serde_json::Value = self
            .call(
                "broadcastStateTransition",
                json!({ "stateTransition": hex::encode(bytes) }),
            )
            .await?;
        Ok(())
    }

    async fn wait_for_state_transition_result(
        &self,
        hash: &TransitionHash,
    ) -> Result<WaitForResultResponse, TransportError> {
        let wait = self.call::<WaitForResultResponse>(
            "waitForStateTransitionResult",
            json!({ "stateTransitionHash": hash.to_hex(), "prove": true }),
        );
        tokio::time::timeout(Duration::from_secs(self.config.result_timeout_secs), wait)
            .await
            .map_err(|_| TransportError::Timeout(format!("result of {}", hash)))?
    }

    async fn get_identity(&self, id: &Identifier) -> Result<Vec<u8>, TransportError> {
        let result: Option<IdentityResult> =
            self.call("getIdentity", json!({ "id": id.to_hex() })).await?;
        let result = result.ok_or_else(|| TransportError::NotFound(format!("identity {}", id)))?;
        decode_hex("identity", &result.identity)
    }

    async fn get_data_contract(&self, id: &Identifier) -> Result<Vec<u8>, TransportError> {
        let result: Option<DataContractResult> =
            self.call("getDataContract", json!({ "id": id.to_hex() })).await?;
        let result =
            result.ok_or_else(|| TransportError::NotFound(format!("data contract {}", id)))?;
        decode_hex("dataContract", &result.data_contract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(value: serde_json::Value) -> RpcResponse {
        serde_json::from_value(value).expect("should deserialize")
    }

    #[test]
    fn test_rpc_error_wins() {
        let err = parse_result::<serde_json::Value>(
            "getIdentity",
            body(json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": -32601, "message": "no" } })),
        )
        .expect_err("should fail");
        assert!(matches!(err, TransportError::Rpc { code: -32601, .. }));
    }

    #[test]
    fn test_null_result_is_none() {
        let result: Option<InstantLockResult> =
            parse_result("getInstantLock", body(json!({ "result": null }))).expect("should parse");
        assert!(result.is_none());
    }

    #[test]
    fn test_wait_result_passes_through() {
        let result: WaitForResultResponse = parse_result(
            "waitForStateTransitionResult",
            body(json!({ "result": { "error": { "code": 2, "log": "Error happened" } } })),
        )
        .expect("should parse");
        assert_eq!(result, WaitForResultResponse::failure(2, "Error happened"));
    }

    #[test]
    fn test_bad_hex_is_malformed() {
        assert!(matches!(
            decode_hex("identity", "zz"),
            Err(TransportError::MalformedResponse(_))
        ));
    }
}
