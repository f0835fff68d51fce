mod support;

use serde_json::json;

use assetlock_client::{
    FundingConfig, IdentityLifecycleOrchestrator, PlatformError, TransportError, WalletAccount,
    WalletError, WaitForResultResponse,
};
use assetlock_common::{
    Identifier, ProofConstructionError, StateTransition, StateTransitionType,
};

use support::{funded_account, MockNetwork};

fn orchestrator(network: &std::sync::Arc<MockNetwork>) -> IdentityLifecycleOrchestrator<MockNetwork> {
    IdentityLifecycleOrchestrator::new(network.clone(), FundingConfig::default())
}

#[tokio::test]
async fn register_identity_adds_exactly_one_identity() {
    let network = MockNetwork::succeeding();
    let mut account = funded_account(&[100_000]);
    let before = account.identity_ids().len();

    let identity = orchestrator(&network)
        .register_identity(&mut account)
        .await
        .expect("should register");

    let ids = account.identity_ids();
    assert_eq!(ids.len(), before + 1);
    assert_eq!(ids.last(), Some(&identity.id));

    let broadcasts = network.broadcasts();
    assert_eq!(broadcasts.len(), 1);
    let create = match &broadcasts[0] {
        StateTransition::IdentityCreate(t) => t,
        other => panic!("expected identity-create, got {:?}", other.transition_type()),
    };
    assert_eq!(create.identity_id, identity.id);
    assert_eq!(create.asset_lock_proof.create_identifier(), identity.id);
    assert_eq!(identity.public_keys, create.public_keys);

    broadcasts[0]
        .verify_signature(&create.public_keys[0])
        .expect("identity-create should verify against its key 0");
}

#[tokio::test]
async fn register_identity_proof_matches_submitted_transaction() {
    let network = MockNetwork::succeeding();
    let mut account = funded_account(&[100_000]);

    orchestrator(&network)
        .register_identity(&mut account)
        .await
        .expect("should register");

    let sent = network.sent_transactions();
    assert_eq!(sent.len(), 1);
    let proof = network.broadcasts()[0]
        .asset_lock_proof()
        .cloned()
        .expect("identity-create carries a proof");
    assert_eq!(proof.transaction.hash(), sent[0].hash());
    assert_eq!(proof.confirmation.txid, sent[0].hash());
    assert!(proof.value() >= 10_000);
}

#[tokio::test]
async fn register_identity_runs_steps_in_order() {
    let network = MockNetwork::succeeding();
    let mut account = funded_account(&[100_000]);

    orchestrator(&network)
        .register_identity(&mut account)
        .await
        .expect("should register");

    assert_eq!(
        network.events(),
        vec![
            "send_transaction",
            "get_instant_lock",
            "broadcast_state_transition",
            "wait_for_state_transition_result",
        ]
    );
    let broadcast_hash = network.broadcasts()[0].hash().expect("hash");
    assert_eq!(network.result_requests(), vec![broadcast_hash]);
}

#[tokio::test]
async fn rejected_registration_leaves_identities_unchanged() {
    let network = MockNetwork::rejecting(2, "Error happened");
    let mut account = funded_account(&[100_000]);
    let before = account.identity_ids();

    let err = orchestrator(&network)
        .register_identity(&mut account)
        .await
        .expect_err("should be rejected");

    let rejection = err.as_broadcast().expect("should be a broadcast error");
    assert_eq!(rejection.code(), 2);
    assert_eq!(rejection.message(), "Error happened");
    assert_eq!(err.to_string(), "Error happened");
    assert_eq!(account.identity_ids(), before);
}

#[tokio::test]
async fn error_shaped_proof_is_a_success() {
    let network = MockNetwork::succeeding();
    network.set_result(WaitForResultResponse::success(
        "",
        Some(json!({ "code": 2, "log": "Error happened" })),
    ));
    let mut account = funded_account(&[100_000]);

    orchestrator(&network)
        .register_identity(&mut account)
        .await
        .expect("only the error key signals failure");
    assert_eq!(account.identity_ids().len(), 1);
}

#[tokio::test]
async fn stuck_lock_stops_before_broadcast() {
    let network = MockNetwork::succeeding();
    network.set_fail_lock(true);
    let mut account = funded_account(&[100_000]);

    let err = orchestrator(&network)
        .register_identity(&mut account)
        .await
        .expect_err("lock wait should fail");

    assert!(matches!(
        err,
        PlatformError::Transport(TransportError::Timeout(_))
    ));
    assert_eq!(network.sent_transactions().len(), 1);
    assert!(network.broadcasts().is_empty());
    assert!(account.identity_ids().is_empty());
    // The funding transaction is on chain, so its change is kept.
    assert_eq!(account.balance(), 100_000 - 11_000);
}

#[tokio::test]
async fn refused_funding_submit_keeps_the_account_spendable() {
    let network = MockNetwork::succeeding();
    network.set_refuse_send(true);
    let mut account = funded_account(&[100_000]);
    let utxos_before = account.utxos().to_vec();
    let orchestrator = orchestrator(&network);

    let err = orchestrator
        .register_identity(&mut account)
        .await
        .expect_err("send should fail");

    assert!(matches!(
        err,
        PlatformError::Transport(TransportError::Connection(_))
    ));
    assert_eq!(account.balance(), 100_000);
    assert_eq!(account.utxos(), utxos_before.as_slice());
    assert!(account.identity_ids().is_empty());
    assert_eq!(network.events(), vec!["send_transaction"]);

    network.set_refuse_send(false);
    orchestrator
        .register_identity(&mut account)
        .await
        .expect("retry should register");

    let sent = network.sent_transactions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].inputs, vec![utxos_before[0].outpoint]);
    assert_eq!(account.balance(), 100_000 - 11_000);
}

#[tokio::test]
async fn insufficient_funds_never_reaches_the_network() {
    let network = MockNetwork::succeeding();
    let mut account = funded_account(&[5_000]);

    let err = orchestrator(&network)
        .register_identity(&mut account)
        .await
        .expect_err("should fail");

    assert!(matches!(
        err,
        PlatformError::Wallet(WalletError::InsufficientFunds { .. })
    ));
    assert!(network.events().is_empty());
}

#[tokio::test]
async fn registration_amount_below_minimum_is_rejected_locally() {
    let network = MockNetwork::succeeding();
    let mut account = funded_account(&[100_000]);
    let funding = FundingConfig {
        identity_registration_amount: 9_000,
        ..FundingConfig::default()
    };

    let err = IdentityLifecycleOrchestrator::new(network.clone(), funding)
        .register_identity(&mut account)
        .await
        .expect_err("should fail");

    assert!(matches!(
        err,
        PlatformError::ProofConstruction(ProofConstructionError::AmountBelowMinimum {
            amount: 9_000,
            required: 10_000,
        })
    ));
    assert!(network.events().is_empty());
    assert_eq!(account.balance(), 100_000);
}

#[tokio::test]
async fn top_up_after_register_uses_a_new_lock() {
    let network = MockNetwork::succeeding();
    let mut account = funded_account(&[100_000]);
    let orchestrator = orchestrator(&network);

    let identity = orchestrator
        .register_identity(&mut account)
        .await
        .expect("should register");
    let count = account.identity_ids().len();

    let receipt = orchestrator
        .top_up(&mut account, identity.id, 5_000)
        .await
        .expect("should top up");

    assert_eq!(account.identity_ids().len(), count);

    let broadcasts = network.broadcasts();
    assert_eq!(broadcasts.len(), 2);
    assert_eq!(broadcasts[1].transition_type(), StateTransitionType::IdentityTopUp);
    assert_eq!(broadcasts[1].owner_id(), identity.id);
    assert_eq!(receipt.transition_hash, broadcasts[1].hash().expect("hash"));

    let first = broadcasts[0].asset_lock_proof().expect("proof");
    let second = broadcasts[1].asset_lock_proof().expect("proof");
    assert_ne!(first.transaction.hash(), second.transaction.hash());
    assert_eq!(
        second.transaction.hash(),
        network.sent_transactions()[1].hash()
    );

    broadcasts[1]
        .verify_signature(&identity.public_keys[0])
        .expect("top-up should be signed by the identity key");
}

#[tokio::test]
async fn top_up_of_unknown_identity_is_unauthorized() {
    let network = MockNetwork::succeeding();
    let mut account = funded_account(&[100_000]);

    let err = orchestrator(&network)
        .top_up(&mut account, Identifier([0x55; 32]), 5_000)
        .await
        .expect_err("should fail");

    match err {
        PlatformError::UnauthorizedSigner(e) => assert_eq!(e.identity_id, Identifier([0x55; 32])),
        other => panic!("unexpected error {:?}", other),
    }
    assert!(network.events().is_empty());
    assert_eq!(account.balance(), 100_000);
}

#[tokio::test]
async fn rejected_top_up_propagates_code_and_message() {
    let network = MockNetwork::succeeding();
    let mut account = funded_account(&[100_000]);
    let orchestrator = orchestrator(&network);
    let identity = orchestrator
        .register_identity(&mut account)
        .await
        .expect("should register");

    network.set_result(WaitForResultResponse::failure(3, "Insufficient credits"));
    let err = orchestrator
        .top_up(&mut account, identity.id, 5_000)
        .await
        .expect_err("should be rejected");

    let rejection = err.as_broadcast().expect("should be a broadcast error");
    assert_eq!(rejection.code(), 3);
    assert_eq!(rejection.message(), "Insufficient credits");
    assert_eq!(account.identity_ids(), vec![identity.id]);
}

#[tokio::test]
async fn second_registration_derives_a_distinct_key() {
    let network = MockNetwork::succeeding();
    let mut account = funded_account(&[100_000]);
    let orchestrator = orchestrator(&network);

    let first = orchestrator
        .register_identity(&mut account)
        .await
        .expect("should register");
    let second = orchestrator
        .register_identity(&mut account)
        .await
        .expect("should register");

    assert_ne!(first.id, second.id);
    assert_ne!(first.public_keys[0].data, second.public_keys[0].data);
    assert_eq!(account.identity_ids(), vec![first.id, second.id]);
}
