mod support;

use std::collections::BTreeMap;

use assetlock_client::{PipelineStage, PlatformError, StateTransitionBroadcaster};
use assetlock_common::{DataContract, Identifier, IdentitySigner, ProtocolError, StateTransition};

use support::MockNetwork;

fn signed_contract_create() -> StateTransition {
    let signer = IdentitySigner::from_secret_bytes(0, &[0x21; 32]).expect("valid secret");
    let contract = DataContract::new(Identifier([1; 32]), BTreeMap::new());
    let mut transition = StateTransition::data_contract_create(contract);
    transition.sign(&signer).expect("should sign");
    transition
}

#[tokio::test]
async fn unsigned_transition_is_refused_before_the_network() {
    let network = MockNetwork::succeeding();
    let broadcaster = StateTransitionBroadcaster::new(network.clone());
    let unsigned = StateTransition::data_contract_create(DataContract::new(
        Identifier([1; 32]),
        BTreeMap::new(),
    ));

    let err = broadcaster.submit(unsigned).await.expect_err("should refuse");
    assert!(matches!(
        err,
        PlatformError::Protocol(ProtocolError::MissingSignature)
    ));
    assert!(network.events().is_empty());
}

#[tokio::test]
async fn send_then_confirm_exposes_the_submitted_stage() {
    let network = MockNetwork::succeeding();
    let broadcaster = StateTransitionBroadcaster::new(network.clone());
    let transition = signed_contract_create();
    let expected_hash = transition.hash().expect("hash");

    let submitted = broadcaster.send(transition).await.expect("should send");
    assert_eq!(submitted.stage(), PipelineStage::Submitted);
    assert_eq!(submitted.hash, expected_hash);
    assert_eq!(network.events(), vec!["broadcast_state_transition"]);

    let receipt = broadcaster.confirm(submitted).await.expect("should confirm");
    assert_eq!(receipt.stage(), PipelineStage::Confirmed);
    assert_eq!(receipt.transition_hash, expected_hash);
    assert!(receipt.proof.is_some());
    assert_eq!(network.result_requests(), vec![expected_hash]);
}

#[tokio::test]
async fn rejection_is_copied_verbatim() {
    let network = MockNetwork::rejecting(2, "Error happened");
    let broadcaster = StateTransitionBroadcaster::new(network.clone());

    let err = broadcaster
        .submit(signed_contract_create())
        .await
        .expect_err("should be rejected");

    match err {
        PlatformError::Broadcast(e) => {
            assert_eq!(e.code, 2);
            assert_eq!(e.message, "Error happened");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(network.broadcasts().len(), 1);
}

#[tokio::test]
async fn broadcast_bytes_decode_to_the_same_transition() {
    let network = MockNetwork::succeeding();
    let broadcaster = StateTransitionBroadcaster::new(network.clone());
    let transition = signed_contract_create();

    broadcaster
        .submit(transition.clone())
        .await
        .expect("should submit");

    assert_eq!(network.broadcasts(), vec![transition]);
}
