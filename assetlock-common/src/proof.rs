//! Asset-lock proofs and the builder that produces them.

use serde::{Deserialize, Serialize};

use crate::chain::{FundingTransaction, LockConfirmation, OutPoint, TxOutput};
use crate::error::ProofConstructionError;
use crate::hash::Identifier;

/// Minimum asset-lock value, in duffs, for identity creation.
pub const MIN_IDENTITY_CREATE_VALUE: u64 = 10_000;

/// Minimum asset-lock value, in duffs, for an identity top-up.
pub const MIN_TOP_UP_VALUE: u64 = 1_000;

/// What a lock is spent on. Fixes the minimum output value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetLockPurpose {
    IdentityCreate,
    IdentityTopUp,
}

impl AssetLockPurpose {
    pub fn default_min_value(&self) -> u64 {
        match self {
            AssetLockPurpose::IdentityCreate => MIN_IDENTITY_CREATE_VALUE,
            AssetLockPurpose::IdentityTopUp => MIN_TOP_UP_VALUE,
        }
    }
}

/// Funding transaction, its lock confirmation and the index of the locked
/// output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLockProof {
    pub transaction: FundingTransaction,
    pub confirmation: LockConfirmation,
    pub output_index: u32,
}

impl AssetLockProof {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.transaction.hash(), self.output_index)
    }

    /// Identifier of the identity this proof creates.
    pub fn create_identifier(&self) -> Identifier {
        self.outpoint().identity_id()
    }

    pub fn output(&self) -> Option<&TxOutput> {
        self.transaction.outputs.get(self.output_index as usize)
    }

    /// Locked value of the referenced output, zero if it does not exist.
    pub fn value(&self) -> u64 {
        self.output().map(|o| o.value).unwrap_or(0)
    }

    /// Re-check the proof invariant against `min_value`.
    pub fn validate(&self, min_value: u64) -> Result<(), ProofConstructionError> {
        check_binding(&self.transaction, &self.confirmation)?;
        check_output(&self.transaction, self.output_index, min_value)
    }
}

fn check_binding(
    tx: &FundingTransaction,
    lock: &LockConfirmation,
) -> Result<(), ProofConstructionError> {
    let transaction = tx.hash();
    if lock.txid != transaction {
        return Err(ProofConstructionError::HashMismatch {
            transaction,
            confirmation: lock.txid,
        });
    }
    Ok(())
}

fn check_output(
    tx: &FundingTransaction,
    index: u32,
    required: u64,
) -> Result<(), ProofConstructionError> {
    let output = tx.outputs.get(index as usize).ok_or(
        ProofConstructionError::OutputIndexOutOfRange {
            index,
            outputs: tx.outputs.len(),
        },
    )?;
    if !output.script.is_asset_lock() {
        return Err(ProofConstructionError::NotAssetLockOutput(index));
    }
    if output.value < required {
        return Err(ProofConstructionError::InsufficientValue {
            index,
            value: output.value,
            required,
        });
    }
    Ok(())
}

/// Turns a funded transaction and its confirmation into an [`AssetLockProof`].
///
/// Pure and deterministic.
#[derive(Clone, Copy, Debug)]
pub struct LockProofBuilder {
    purpose: AssetLockPurpose,
    min_value: u64,
}

impl LockProofBuilder {
    pub fn new(purpose: AssetLockPurpose) -> Self {
        Self {
            purpose,
            min_value: purpose.default_min_value(),
        }
    }

    /// Override the purpose threshold.
    pub fn with_min_value(mut self, min_value: u64) -> Self {
        self.min_value = min_value;
        self
    }

    pub fn purpose(&self) -> AssetLockPurpose {
        self.purpose
    }

    pub fn min_value(&self) -> u64 {
        self.min_value
    }

    /// Reject a funding amount that could never produce a valid proof.
    pub fn check_amount(&self, amount: u64) -> Result<(), ProofConstructionError> {
        if amount < self.min_value {
            return Err(ProofConstructionError::AmountBelowMinimum {
                amount,
                required: self.min_value,
            });
        }
        Ok(())
    }

    /// Build a proof over the first asset-lock output meeting the threshold.
    pub fn build(
        &self,
        tx: FundingTransaction,
        lock: LockConfirmation,
    ) -> Result<AssetLockProof, ProofConstructionError> {
        check_binding(&tx, &lock)?;
        let output_index = tx
            .asset_lock_outputs()
            .find(|(_, o)| o.value >= self.min_value)
            .map(|(i, _)| i)
            .ok_or(ProofConstructionError::NoEligibleOutput {
                required: self.min_value,
            })?;
        Ok(AssetLockProof {
            transaction: tx,
            confirmation: lock,
            output_index,
        })
    }

    /// Build a proof over an explicit output.
    pub fn build_at(
        &self,
        tx: FundingTransaction,
        lock: LockConfirmation,
        output_index: u32,
    ) -> Result<AssetLockProof, ProofConstructionError> {
        check_binding(&tx, &lock)?;
        check_output(&tx, output_index, self.min_value)?;
        Ok(AssetLockProof {
            transaction: tx,
            confirmation: lock,
            output_index,
        })
    }
}
