//! Error types shared by the data model and the wire codec.

use thiserror::Error;

use crate::hash::TxHash;

/// Failure to turn a funding transaction and its lock confirmation into an
/// asset-lock proof.
///
/// Always raised locally; a proof that fails these checks never reaches the
/// network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofConstructionError {
    /// The confirmation locks a different transaction.
    #[error("lock confirmation references {confirmation}, funding transaction is {transaction}")]
    HashMismatch {
        transaction: TxHash,
        confirmation: TxHash,
    },

    /// No asset-lock output carries the required value.
    #[error("no asset-lock output with at least {required} duffs")]
    NoEligibleOutput { required: u64 },

    /// The pinned output index does not exist on the transaction.
    #[error("output index {index} out of range ({outputs} outputs)")]
    OutputIndexOutOfRange { index: u32, outputs: usize },

    /// The pinned output does not pay an asset-lock script.
    #[error("output {0} is not an asset-lock output")]
    NotAssetLockOutput(u32),

    /// The pinned output is below the purpose threshold.
    #[error("output {index} locks {value} duffs, {required} required")]
    InsufficientValue { index: u32, value: u64, required: u64 },

    /// The requested funding amount cannot satisfy the purpose threshold.
    #[error("funding amount {amount} is below the minimum of {required} duffs")]
    AmountBelowMinimum { amount: u64, required: u64 },
}

/// Codec and signature failures of the platform protocol layer.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Encoding a value to its wire form failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Bytes could not be decoded.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// The wire form carries a protocol version this build does not speak.
    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u32),

    /// A key could not be parsed or derived.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Signature is malformed or does not verify.
    #[error("signature error: {0}")]
    Signature(String),

    /// The transition has not been signed.
    #[error("state transition is not signed")]
    MissingSignature,

    /// An embedded asset-lock proof violates its invariant.
    #[error("invalid asset lock proof: {0}")]
    InvalidAssetLockProof(#[from] ProofConstructionError),
}

impl From<bincode::Error> for ProtocolError {
    fn from(err: bincode::Error) -> Self {
        ProtocolError::Decoding(err.to_string())
    }
}

impl From<secp256k1::Error> for ProtocolError {
    fn from(err: secp256k1::Error) -> Self {
        ProtocolError::Signature(err.to_string())
    }
}
