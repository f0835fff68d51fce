//! assetlock-client
//!
//! Funds platform identities from base-layer asset locks and broadcasts
//! signed state transitions.
//!
//! Architecture:
//! 1. [`IdentityLifecycleOrchestrator`] funds, locks and registers or tops up identities
//! 2. [`DocumentAndContractSubmitter`] signs document batches and contract creations
//! 3. [`StateTransitionBroadcaster`] sends transitions and turns rejections into errors
//! 4. [`PlatformNetwork`] and [`WalletAccount`] are the collaborator boundaries
//!
//! Local wallet state changes only after the platform accepts a transition.

pub mod broadcaster;
pub mod client;
pub mod config;
#[cfg(feature = "dapi-http")]
pub mod dapi;
pub mod error;
pub mod identities;
pub mod network;
pub mod pipeline;
pub mod submitter;
pub mod wallet;

pub use broadcaster::StateTransitionBroadcaster;
pub use client::Client;
pub use config::{ClientConfig, DapiConfig, FundingConfig, Network, WalletOptions};
#[cfg(feature = "dapi-http")]
pub use dapi::DapiHttpClient;
pub use error::{
    ClientError, PlatformError, StateTransitionBroadcastError, TransportError,
    UnauthorizedSignerError, WalletError,
};
pub use identities::IdentityLifecycleOrchestrator;
pub use network::{PlatformNetwork, ResultError, StateTransitionOutcome, WaitForResultResponse};
pub use pipeline::{BroadcastReceipt, Funded, Locked, PipelineStage, Submitted};
pub use submitter::{DocumentAndContractSubmitter, DocumentsBatch};
pub use wallet::{InMemoryAccount, Utxo, WalletAccount, DEFAULT_FUNDING_FEE};
