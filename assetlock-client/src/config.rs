//! Client configuration.

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use assetlock_common::{MIN_IDENTITY_CREATE_VALUE, MIN_TOP_UP_VALUE};

use crate::error::ClientError;

// ═══════════════════════════════════════════════════════════════════════════════
// NETWORK
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
    Devnet,
    Regtest,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Regtest => "regtest",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            "regtest" | "local" => Ok(Network::Regtest),
            other => Err(ClientError::Config(format!("unknown network '{}'", other))),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLIENT CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Top-level client configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Network the client talks to.
    #[serde(default)]
    pub network: Network,

    /// Wallet to fund and sign with. No wallet when absent.
    #[serde(default)]
    pub wallet: Option<WalletOptions>,

    #[serde(default)]
    pub funding: FundingConfig,

    #[serde(default)]
    pub dapi: DapiConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct WalletOptions {
    /// Seed phrase the account keys derive from.
    pub seed_phrase: String,
    /// Network the wallet belongs to; inherits the client's when unset.
    #[serde(default)]
    pub network: Option<Network>,
}

impl fmt::Debug for WalletOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletOptions")
            .field("seed_phrase", &"<redacted>")
            .field("network", &self.network)
            .finish()
    }
}

/// Amounts used when funding identities.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FundingConfig {
    /// Duffs locked by `register_identity`.
    #[serde(default = "default_registration_amount")]
    pub identity_registration_amount: u64,
    /// Minimum asset-lock value for identity creation.
    #[serde(default = "default_min_create")]
    pub min_identity_create_value: u64,
    /// Minimum asset-lock value for a top-up.
    #[serde(default = "default_min_top_up")]
    pub min_top_up_value: u64,
}

fn default_registration_amount() -> u64 {
    MIN_IDENTITY_CREATE_VALUE
}

fn default_min_create() -> u64 {
    MIN_IDENTITY_CREATE_VALUE
}

fn default_min_top_up() -> u64 {
    MIN_TOP_UP_VALUE
}

impl Default for FundingConfig {
    fn default() -> Self {
        Self {
            identity_registration_amount: default_registration_amount(),
            min_identity_create_value: default_min_create(),
            min_top_up_value: default_min_top_up(),
        }
    }
}

/// HTTP transport settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DapiConfig {
    /// JSON-RPC endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Per-request timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Delay between instant-lock polls.
    #[serde(default = "default_poll_interval")]
    pub lock_poll_interval_ms: u64,
    /// Instant-lock polls before giving up.
    #[serde(default = "default_poll_attempts")]
    pub lock_poll_attempts: u32,
    /// Bound on the state-transition result wait.
    #[serde(default = "default_result_timeout")]
    pub result_timeout_secs: u64,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    500
}

fn default_poll_attempts() -> u32 {
    60
}

fn default_result_timeout() -> u64 {
    120
}

impl Default for DapiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout(),
            lock_poll_interval_ms: default_poll_interval(),
            lock_poll_attempts: default_poll_attempts(),
            result_timeout_secs: default_result_timeout(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from `ASSETLOCK_*` environment variables, reading a
    /// `.env` file first if one exists. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Some(network) = env_var::<Network>("ASSETLOCK_NETWORK")? {
            config.network = network;
        }

        if let Ok(seed_phrase) = env::var("ASSETLOCK_SEED_PHRASE") {
            config.wallet = Some(WalletOptions {
                seed_phrase,
                network: env_var("ASSETLOCK_WALLET_NETWORK")?,
            });
        }

        if let Some(amount) = env_var("ASSETLOCK_REGISTRATION_AMOUNT")? {
            config.funding.identity_registration_amount = amount;
        }
        if let Some(min) = env_var("ASSETLOCK_MIN_CREATE_VALUE")? {
            config.funding.min_identity_create_value = min;
        }
        if let Some(min) = env_var("ASSETLOCK_MIN_TOP_UP_VALUE")? {
            config.funding.min_top_up_value = min;
        }

        if let Ok(endpoint) = env::var("ASSETLOCK_DAPI_ENDPOINT") {
            config.dapi.endpoint = endpoint;
        }
        if let Some(secs) = env_var("ASSETLOCK_DAPI_TIMEOUT_SECS")? {
            config.dapi.request_timeout_secs = secs;
        }
        if let Some(ms) = env_var("ASSETLOCK_LOCK_POLL_INTERVAL_MS")? {
            config.dapi.lock_poll_interval_ms = ms;
        }
        if let Some(attempts) = env_var("ASSETLOCK_LOCK_POLL_ATTEMPTS")? {
            config.dapi.lock_poll_attempts = attempts;
        }
        if let Some(secs) = env_var("ASSETLOCK_RESULT_TIMEOUT_SECS")? {
            config.dapi.result_timeout_secs = secs;
        }

        Ok(config)
    }
}

fn env_var<T>(name: &str) -> Result<Option<T>, ClientError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ClientError::Config(format!("{}: {}", name, e))),
        Err(_) => Ok(None),
    }
}
