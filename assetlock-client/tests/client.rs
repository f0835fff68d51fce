mod support;

use std::collections::BTreeMap;

use assetlock_client::{
    Client, ClientConfig, ClientError, InMemoryAccount, Network, PlatformError, TransportError,
    WalletAccount, WalletOptions,
};
use assetlock_common::{DataContract, Identifier, Identity};

use support::{wallet_config, MockNetwork, SEED_PHRASE};

#[test]
fn default_client_uses_testnet_without_wallet() {
    let client = Client::new(ClientConfig::default(), MockNetwork::succeeding())
        .expect("should build");
    assert_eq!(client.network(), Network::Testnet);
    assert!(!client.has_wallet());
    assert!(matches!(
        client.wallet_account(),
        Err(ClientError::WalletNotConfigured)
    ));
}

#[test]
fn wallet_on_another_network_is_refused() {
    let config = ClientConfig {
        network: Network::Testnet,
        wallet: Some(WalletOptions {
            seed_phrase: SEED_PHRASE.to_string(),
            network: Some(Network::Devnet),
        }),
        ..ClientConfig::default()
    };
    let err = match Client::new(config, MockNetwork::succeeding()) {
        Ok(_) => panic!("should refuse mismatched networks"),
        Err(e) => e,
    };
    assert!(matches!(err, ClientError::NetworkMismatch));
    assert_eq!(err.to_string(), "Wallet and Client networks are different");
}

#[test]
fn wallet_inherits_client_network() {
    let client = Client::new(wallet_config(), MockNetwork::succeeding()).expect("should build");
    assert!(client.has_wallet());
    let account = client.wallet_account().expect("wallet configured");
    assert_eq!(account.network(), Network::Testnet);
    assert!(account.identity_ids().is_empty());
}

#[tokio::test]
async fn client_registers_with_its_wallet_account() {
    let network = MockNetwork::succeeding();
    let client = Client::new(wallet_config(), network.clone()).expect("should build");
    let mut account = client.wallet_account().expect("wallet configured");
    account.add_utxo(
        assetlock_common::OutPoint::new(assetlock_common::TxHash([1; 32]), 0),
        50_000,
    );

    let identity = client
        .register_identity(&mut account)
        .await
        .expect("should register");
    assert_eq!(account.identity_ids(), vec![identity.id]);

    client
        .top_up(&mut account, identity.id, 2_000)
        .await
        .expect("should top up");
    assert_eq!(network.broadcasts().len(), 2);
}

#[tokio::test]
async fn account_on_another_network_is_refused() {
    let network = MockNetwork::succeeding();
    let client = Client::new(ClientConfig::default(), network.clone()).expect("should build");
    let mut account = InMemoryAccount::from_seed_phrase(SEED_PHRASE, Network::Mainnet);

    let err = client
        .register_identity(&mut account)
        .await
        .expect_err("should refuse");
    assert!(matches!(
        err,
        PlatformError::Client(ClientError::NetworkMismatch)
    ));
    assert!(network.events().is_empty());
}

#[tokio::test]
async fn reads_back_identities_and_contracts() {
    let network = MockNetwork::succeeding();
    let client = Client::new(ClientConfig::default(), network.clone()).expect("should build");

    let identity = Identity::new(Identifier([4; 32]), vec![]);
    network.insert_identity(&identity);
    let contract = DataContract::new(identity.id, BTreeMap::new());
    network.insert_contract(&contract);

    assert_eq!(
        client.get_identity(&identity.id).await.expect("should fetch"),
        identity
    );
    assert_eq!(
        client
            .get_data_contract(&contract.id)
            .await
            .expect("should fetch"),
        contract
    );

    let err = client
        .get_identity(&Identifier([5; 32]))
        .await
        .expect_err("unknown identity");
    assert!(matches!(
        err,
        PlatformError::Transport(TransportError::NotFound(_))
    ));
}
