//! assetlock-common
//!
//! Shared data model for asset-lock funded platform state transitions:
//! base-layer funding transactions and lock confirmations, asset-lock proofs,
//! identity keys, documents and contracts, and the signed state transitions
//! that carry them to the platform.

pub mod chain;
pub mod document;
pub mod encoding;
pub mod error;
pub mod hash;
pub mod identity;
pub mod keys;
pub mod proof;
pub mod transition;

pub use chain::{FundingTransaction, LockConfirmation, OutPoint, OutputScript, TxOutput};
pub use document::{DataContract, Document, DocumentValue};
pub use error::{ProofConstructionError, ProtocolError};
pub use hash::{hash160, sha256d, Identifier, TransitionHash, TxHash};
pub use identity::Identity;
pub use keys::{IdentityPublicKey, IdentitySigner, KeyPurpose, SecurityLevel};
pub use proof::{
    AssetLockProof, AssetLockPurpose, LockProofBuilder, MIN_IDENTITY_CREATE_VALUE,
    MIN_TOP_UP_VALUE,
};
pub use transition::{
    DataContractCreateTransition, DocumentTransition, DocumentsBatchTransition,
    IdentityCreateTransition, IdentityTopUpTransition, StateTransition, StateTransitionType,
    PROTOCOL_VERSION,
};
