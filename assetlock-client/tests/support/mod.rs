//! Recording in-process network for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use assetlock_client::{
    ClientConfig, InMemoryAccount, Network, PlatformNetwork, TransportError, WaitForResultResponse,
};
use assetlock_common::{
    DataContract, FundingTransaction, Identifier, Identity, LockConfirmation, OutPoint,
    StateTransition, TransitionHash, TxHash,
};

pub const SEED_PHRASE: &str = "birth kingdom trash renew flavor utility donkey gasp regular alert pave layer";

#[derive(Default)]
struct MockState {
    events: Vec<&'static str>,
    sent: Vec<FundingTransaction>,
    broadcasts: Vec<Vec<u8>>,
    result_requests: Vec<TransitionHash>,
    result: WaitForResultResponse,
    fail_lock: bool,
    refuse_send: bool,
    identities: HashMap<Identifier, Vec<u8>>,
    contracts: HashMap<Identifier, Vec<u8>>,
}

/// Accepts every base-layer transaction, locks it instantly and answers
/// result waits with a configurable payload.
#[derive(Default)]
pub struct MockNetwork {
    state: Mutex<MockState>,
}

impl MockNetwork {
    /// Network that confirms every transition with an opaque proof.
    pub fn succeeding() -> Arc<Self> {
        let network = Self::default();
        network.set_result(WaitForResultResponse::success(
            "",
            Some(json!({ "rootTreeProof": "00", "storeTreeProof": "00" })),
        ));
        Arc::new(network)
    }

    /// Network that rejects every transition with `code`/`log`.
    pub fn rejecting(code: i64, log: &str) -> Arc<Self> {
        let network = Self::default();
        network.set_result(WaitForResultResponse::failure(code, log));
        Arc::new(network)
    }

    pub fn set_result(&self, result: WaitForResultResponse) {
        self.state.lock().expect("mock lock").result = result;
    }

    pub fn set_fail_lock(&self, fail: bool) {
        self.state.lock().expect("mock lock").fail_lock = fail;
    }

    pub fn set_refuse_send(&self, refuse: bool) {
        self.state.lock().expect("mock lock").refuse_send = refuse;
    }

    pub fn insert_identity(&self, identity: &Identity) {
        let bytes = identity.to_bytes().expect("identity should encode");
        self.state
            .lock()
            .expect("mock lock")
            .identities
            .insert(identity.id, bytes);
    }

    pub fn insert_contract(&self, contract: &DataContract) {
        let bytes = contract.to_bytes().expect("contract should encode");
        self.state
            .lock()
            .expect("mock lock")
            .contracts
            .insert(contract.id, bytes);
    }

    /// Calls in the order they were made.
    pub fn events(&self) -> Vec<&'static str> {
        self.state.lock().expect("mock lock").events.clone()
    }

    /// Base-layer transactions submitted so far.
    pub fn sent_transactions(&self) -> Vec<FundingTransaction> {
        self.state.lock().expect("mock lock").sent.clone()
    }

    /// Broadcast transitions, decoded.
    pub fn broadcasts(&self) -> Vec<StateTransition> {
        self.state
            .lock()
            .expect("mock lock")
            .broadcasts
            .iter()
            .map(|bytes| StateTransition::from_bytes(bytes).expect("broadcast should decode"))
            .collect()
    }

    pub fn result_requests(&self) -> Vec<TransitionHash> {
        self.state.lock().expect("mock lock").result_requests.clone()
    }
}

pub fn fake_instant_lock(tx: &FundingTransaction) -> LockConfirmation {
    LockConfirmation {
        version: LockConfirmation::VERSION,
        inputs: tx.inputs.clone(),
        txid: tx.hash(),
        cycle_hash: [0x11; 32],
        signature: vec![0x22; 96],
    }
}

#[async_trait]
impl PlatformNetwork for MockNetwork {
    async fn send_transaction(&self, raw: &[u8]) -> Result<TxHash, TransportError> {
        let tx = FundingTransaction::from_bytes(raw)
            .map_err(|e| TransportError::Rpc { code: -22, message: e.to_string() })?;
        let hash = tx.hash();
        let mut state = self.state.lock().expect("mock lock");
        state.events.push("send_transaction");
        if state.refuse_send {
            return Err(TransportError::Connection("refused".into()));
        }
        state.sent.push(tx);
        Ok(hash)
    }

    async fn get_instant_lock(&self, tx_hash: &TxHash) -> Result<LockConfirmation, TransportError> {
        let mut state = self.state.lock().expect("mock lock");
        state.events.push("get_instant_lock");
        if state.fail_lock {
            return Err(TransportError::Timeout(format!("instant lock for {}", tx_hash)));
        }
        state
            .sent
            .iter()
            .find(|tx| tx.hash() == *tx_hash)
            .map(fake_instant_lock)
            .ok_or_else(|| TransportError::NotFound(format!("transaction {}", tx_hash)))
    }

    async fn broadcast_state_transition(&self, bytes: &[u8]) -> Result<(), TransportError> {
        let mut state = self.state.lock().expect("mock lock");
        state.events.push("broadcast_state_transition");
        state.broadcasts.push(bytes.to_vec());
        Ok(())
    }

    async fn wait_for_state_transition_result(
        &self,
        hash: &TransitionHash,
    ) -> Result<WaitForResultResponse, TransportError> {
        let mut state = self.state.lock().expect("mock lock");
        state.events.push("wait_for_state_transition_result");
        state.result_requests.push(*hash);
        Ok(state.result.clone())
    }

    async fn get_identity(&self, id: &Identifier) -> Result<Vec<u8>, TransportError> {
        self.state
            .lock()
            .expect("mock lock")
            .identities
            .get(id)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(format!("identity {}", id)))
    }

    async fn get_data_contract(&self, id: &Identifier) -> Result<Vec<u8>, TransportError> {
        self.state
            .lock()
            .expect("mock lock")
            .contracts
            .get(id)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(format!("data contract {}", id)))
    }
}

/// Testnet account from [`SEED_PHRASE`] holding one output per value.
pub fn funded_account(values: &[u64]) -> InMemoryAccount {
    let mut account = InMemoryAccount::from_seed_phrase(SEED_PHRASE, Network::Testnet);
    for (i, value) in values.iter().enumerate() {
        account.add_utxo(OutPoint::new(TxHash([0xa0 + i as u8; 32]), i as u32), *value);
    }
    account
}

pub fn wallet_config() -> ClientConfig {
    let mut config = ClientConfig::default();
    config.wallet = Some(assetlock_client::WalletOptions {
        seed_phrase: SEED_PHRASE.to_string(),
        network: None,
    });
    config
}
