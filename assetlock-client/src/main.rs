//! assetlock
//!
//! Command-line access to a DAPI node: read identities and data contracts,
//! and inspect serialized state transitions.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use assetlock_client::{Client, ClientConfig, DapiHttpClient, Network};
use assetlock_common::{Identifier, StateTransition};

#[derive(Parser)]
#[command(
    name = "assetlock",
    about = "Inspect platform identities, contracts and state transitions"
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConnectionArgs {
    /// DAPI JSON-RPC endpoint; overrides ASSETLOCK_DAPI_ENDPOINT.
    #[arg(long, global = true)]
    endpoint: Option<String>,
    /// Network name; overrides ASSETLOCK_NETWORK.
    #[arg(long, global = true)]
    network: Option<Network>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch an identity by id.
    Identity {
        /// Hex identity id.
        id: Identifier,
    },
    /// Fetch a data contract by id.
    Contract {
        /// Hex contract id.
        id: Identifier,
    },
    /// Decode a hex-encoded state transition.
    Decode {
        /// Serialized transition, hex.
        hex: String,
    },
}

#[derive(Serialize)]
struct DecodedTransition<'a> {
    kind: &'static str,
    hash: String,
    owner_id: Identifier,
    signed: bool,
    signature_public_key_id: u32,
    transition: &'a StateTransition,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "assetlock_client=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context("failed to load configuration")?;
    if let Some(endpoint) = cli.connection.endpoint {
        config.dapi.endpoint = endpoint;
    }
    if let Some(network) = cli.connection.network {
        config.network = network;
    }

    match cli.command {
        Commands::Identity { id } => {
            let client = connect(config)?;
            let identity = client
                .get_identity(&id)
                .await
                .with_context(|| format!("failed to fetch identity {}", id))?;
            print_json(&identity)
        }
        Commands::Contract { id } => {
            let client = connect(config)?;
            let contract = client
                .get_data_contract(&id)
                .await
                .with_context(|| format!("failed to fetch data contract {}", id))?;
            print_json(&contract)
        }
        Commands::Decode { hex } => decode(&hex),
    }
}

fn connect(config: ClientConfig) -> Result<Client<DapiHttpClient>> {
    info!(endpoint = %config.dapi.endpoint, network = %config.network, "connecting");
    let network = DapiHttpClient::new(config.dapi.clone()).context("failed to build transport")?;
    Ok(Client::new(config, Arc::new(network))?)
}

fn decode(input: &str) -> Result<()> {
    let bytes = hex::decode(input.trim().trim_start_matches("0x")).context("input is not hex")?;
    let transition = StateTransition::from_bytes(&bytes).context("not a state transition")?;
    let decoded = DecodedTransition {
        kind: transition.transition_type().as_str(),
        hash: transition.hash()?.to_hex(),
        owner_id: transition.owner_id(),
        signed: transition.is_signed(),
        signature_public_key_id: transition.signature_public_key_id(),
        transition: &transition,
    };
    print_json(&decoded)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
