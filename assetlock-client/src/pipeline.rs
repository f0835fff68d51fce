//! Stages of the two-phase funding and broadcast pipeline.
//!
//! `Funding -> Locked -> Submitted -> Confirmed | Failed`. The orchestrator
//! derives each step value from the previous one.

use std::fmt;

use serde::Serialize;

use assetlock_common::{AssetLockProof, FundingTransaction, StateTransition, TransitionHash, TxHash};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Funding,
    Locked,
    Submitted,
    Confirmed,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStage::Funding => "funding",
            PipelineStage::Locked => "locked",
            PipelineStage::Submitted => "submitted",
            PipelineStage::Confirmed => "confirmed",
            PipelineStage::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Funding transaction accepted by the base layer.
#[derive(Clone, Debug)]
pub struct Funded {
    pub transaction: FundingTransaction,
    pub tx_hash: TxHash,
}

impl Funded {
    pub fn stage(&self) -> PipelineStage {
        PipelineStage::Funding
    }
}

/// Funding transaction with its instant lock, as a proof.
#[derive(Clone, Debug)]
pub struct Locked {
    pub proof: AssetLockProof,
}

impl Locked {
    pub fn stage(&self) -> PipelineStage {
        PipelineStage::Locked
    }

    pub fn tx_hash(&self) -> TxHash {
        self.proof.transaction.hash()
    }
}

/// Transition accepted for broadcast, awaiting its verdict.
#[derive(Clone, Debug)]
pub struct Submitted {
    pub transition: StateTransition,
    pub hash: TransitionHash,
}

impl Submitted {
    pub fn stage(&self) -> PipelineStage {
        PipelineStage::Submitted
    }
}

/// Confirmed transition.
#[derive(Clone, Debug)]
pub struct BroadcastReceipt {
    pub transition_hash: TransitionHash,
    /// Opaque proof payload returned by the platform.
    pub proof: Option<serde_json::Value>,
}

impl BroadcastReceipt {
    pub fn stage(&self) -> PipelineStage {
        PipelineStage::Confirmed
    }
}
