//! Error types for the client pipeline.

use thiserror::Error;

use assetlock_common::{Identifier, ProofConstructionError, ProtocolError};

/// The network rejected a state transition.
///
/// `code` and `message` are the `code` and `log` of the network's error
/// payload, verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StateTransitionBroadcastError {
    pub code: i64,
    pub message: String,
}

impl StateTransitionBroadcastError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// No key available to the account may sign in this context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no authorized key for identity {identity_id}: {context}")]
pub struct UnauthorizedSignerError {
    pub identity_id: Identifier,
    pub context: String,
}

impl UnauthorizedSignerError {
    pub fn new(identity_id: Identifier, context: impl Into<String>) -> Self {
        Self {
            identity_id,
            context: context.into(),
        }
    }
}

/// Failures of the network collaborator.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("timed out waiting for {0}")]
    Timeout(String),

    /// The node answered with an error unrelated to transition validity.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("insufficient funds: {available} duffs available, {required} required")]
    InsufficientFunds { available: u64, required: u64 },

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("identity {0} already imported")]
    DuplicateIdentity(Identifier),
}

/// Construction and configuration failures of the [`Client`](crate::Client).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Wallet and Client networks are different")]
    NetworkMismatch,

    #[error("no wallet configured")]
    WalletNotConfigured,

    #[error("configuration error: {0}")]
    Config(String),
}

/// Any failure of a pipeline operation.
///
/// Each variant is transparent, so the rendered message is the inner error's.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error(transparent)]
    Broadcast(#[from] StateTransitionBroadcastError),

    #[error(transparent)]
    ProofConstruction(#[from] ProofConstructionError),

    #[error(transparent)]
    UnauthorizedSigner(#[from] UnauthorizedSignerError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl PlatformError {
    /// The broadcast rejection, if this is one.
    pub fn as_broadcast(&self) -> Option<&StateTransitionBroadcastError> {
        match self {
            PlatformError::Broadcast(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T, E = PlatformError> = std::result::Result<T, E>;
