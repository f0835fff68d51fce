//! Network boundary.
//!
//! [`PlatformNetwork`] is the only way the pipeline reaches the base layer
//! or the platform. Implementations own transport concerns such as retries
//! and timeouts; the pipeline never retries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use assetlock_common::{Identifier, LockConfirmation, TransitionHash, TxHash};

use crate::error::{StateTransitionBroadcastError, TransportError};
use crate::pipeline::PipelineStage;

/// Base-layer and platform RPC surface used by the pipeline.
#[async_trait]
pub trait PlatformNetwork: Send + Sync {
    /// Submit a raw base-layer transaction, returning its hash.
    async fn send_transaction(&self, raw: &[u8]) -> Result<TxHash, TransportError>;

    /// Wait for the instant lock of `tx_hash`.
    async fn get_instant_lock(&self, tx_hash: &TxHash) -> Result<LockConfirmation, TransportError>;

    /// Submit a serialized state transition.
    async fn broadcast_state_transition(&self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Wait for the platform's verdict on a broadcast transition.
    async fn wait_for_state_transition_result(
        &self,
        hash: &TransitionHash,
    ) -> Result<WaitForResultResponse, TransportError>;

    /// Serialized identity.
    async fn get_identity(&self, id: &Identifier) -> Result<Vec<u8>, TransportError>;

    /// Serialized data contract.
    async fn get_data_contract(&self, id: &Identifier) -> Result<Vec<u8>, TransportError>;
}

/// Error payload of a rejected transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultError {
    pub code: i64,
    #[serde(default)]
    pub log: String,
}

/// Raw result of `wait_for_state_transition_result`:
/// `{ "error": { "code", "log" } }` or `{ "hash", "proof"? }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WaitForResultResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResultError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<serde_json::Value>,
}

impl WaitForResultResponse {
    pub fn success(hash: impl Into<String>, proof: Option<serde_json::Value>) -> Self {
        Self {
            error: None,
            hash: Some(hash.into()),
            proof,
        }
    }

    pub fn failure(code: i64, log: impl Into<String>) -> Self {
        Self {
            error: Some(ResultError {
                code,
                log: log.into(),
            }),
            hash: None,
            proof: None,
        }
    }
}

/// Verdict on a broadcast transition.
#[derive(Clone, Debug, PartialEq)]
pub enum StateTransitionOutcome {
    /// Accepted. The proof payload is opaque.
    Success {
        hash: String,
        proof: Option<serde_json::Value>,
    },
    Failure { code: i64, message: String },
}

impl StateTransitionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StateTransitionOutcome::Success { .. })
    }

    /// Terminal pipeline stage this verdict puts the transition in.
    pub fn stage(&self) -> PipelineStage {
        match self {
            StateTransitionOutcome::Success { .. } => PipelineStage::Confirmed,
            StateTransitionOutcome::Failure { .. } => PipelineStage::Failed,
        }
    }

    /// Success payload, or the rejection as a typed error.
    pub fn into_result(
        self,
    ) -> Result<Option<serde_json::Value>, StateTransitionBroadcastError> {
        match self {
            StateTransitionOutcome::Success { proof, .. } => Ok(proof),
            StateTransitionOutcome::Failure { code, message } => {
                Err(StateTransitionBroadcastError::new(code, message))
            }
        }
    }
}

impl TryFrom<WaitForResultResponse> for StateTransitionOutcome {
    type Error = TransportError;

    /// The `error` key decides: when present the transition failed, whatever
    /// else the payload carries. A `proof` shaped like an error is still a
    /// success.
    fn try_from(response: WaitForResultResponse) -> Result<Self, Self::Error> {
        match response {
            WaitForResultResponse {
                error: Some(error), ..
            } => Ok(StateTransitionOutcome::Failure {
                code: error.code,
                message: error.log,
            }),
            WaitForResultResponse {
                hash: Some(hash),
                proof,
                ..
            } => Ok(StateTransitionOutcome::Success { hash, proof }),
            WaitForResultResponse { proof: Some(_), .. } => Err(
                TransportError::MalformedResponse("result carries a proof but no hash".into()),
            ),
            _ => Err(TransportError::MalformedResponse(
                "result carries neither error nor hash".into(),
            )),
        }
    }
}
