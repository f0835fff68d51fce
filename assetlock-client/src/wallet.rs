//! Wallet boundary and a seed-derived in-memory account.

use async_trait::async_trait;
use secp256k1::SecretKey;
use sha2::{Digest, Sha256};

use assetlock_common::{
    hash160, FundingTransaction, Identifier, IdentitySigner, OutPoint, OutputScript, TxOutput,
};

use crate::config::Network;
use crate::error::WalletError;

/// Fee, in duffs, charged on top of the locked amount.
pub const DEFAULT_FUNDING_FEE: u64 = 1_000;

/// Caller-owned account the pipeline funds from and records identities in.
///
/// The identity list is unique and keeps insertion order; the position of an
/// identity is its derivation index.
#[async_trait]
pub trait WalletAccount: Send + Sync {
    fn network(&self) -> Network;

    /// Build (but do not submit) a transaction locking `amount` duffs in an
    /// asset-lock output. The account's spendable set is left untouched.
    async fn create_funding_transaction(
        &self,
        amount: u64,
    ) -> Result<FundingTransaction, WalletError>;

    /// Record `tx` as accepted by the base layer: spend its inputs and keep
    /// its change.
    fn commit_funding(&mut self, tx: &FundingTransaction);

    fn identity_ids(&self) -> Vec<Identifier>;

    /// Record an identity. Rejects duplicates.
    fn import_identity(&mut self, id: Identifier) -> Result<(), WalletError>;

    /// Derivation index the next registered identity will occupy.
    fn next_identity_index(&self) -> u32;

    fn identity_index(&self, id: &Identifier) -> Option<u32>;

    /// Signer for key `key_id` of the identity at `identity_index`.
    fn identity_signer(
        &self,
        identity_index: u32,
        key_id: u32,
    ) -> Result<IdentitySigner, WalletError>;
}

/// A spendable output owned by the account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Utxo {
    pub outpoint: OutPoint,
    pub value: u64,
}

/// Account whose keys derive deterministically from a seed phrase.
pub struct InMemoryAccount {
    network: Network,
    seed: [u8; 32],
    utxos: Vec<Utxo>,
    identities: Vec<Identifier>,
    /// Funding transactions committed so far; keeps one-time keys distinct.
    funding_counter: u32,
    fee: u64,
}

impl InMemoryAccount {
    pub fn from_seed_phrase(seed_phrase: &str, network: Network) -> Self {
        let normalized = seed_phrase.split_whitespace().collect::<Vec<_>>().join(" ");
        let mut hasher = Sha256::new();
        hasher.update(b"assetlock-seed");
        hasher.update(normalized.as_bytes());
        Self {
            network,
            seed: hasher.finalize().into(),
            utxos: Vec::new(),
            identities: Vec::new(),
            funding_counter: 0,
            fee: DEFAULT_FUNDING_FEE,
        }
    }

    pub fn with_fee(mut self, fee: u64) -> Self {
        self.fee = fee;
        self
    }

    pub fn add_utxo(&mut self, outpoint: OutPoint, value: u64) {
        self.utxos.push(Utxo { outpoint, value });
    }

    pub fn utxos(&self) -> &[Utxo] {
        &self.utxos
    }

    pub fn balance(&self) -> u64 {
        self.utxos.iter().map(|u| u.value).sum()
    }

    /// Secret for a derivation path, rehashing with a counter until it lands
    /// in the curve order.
    fn derive_secret(&self, path: &str) -> Result<SecretKey, WalletError> {
        for counter in 0u32..16 {
            let mut hasher = Sha256::new();
            hasher.update(self.seed);
            hasher.update(path.as_bytes());
            hasher.update(counter.to_le_bytes());
            let candidate: [u8; 32] = hasher.finalize().into();
            if let Ok(secret) = SecretKey::from_slice(&candidate) {
                return Ok(secret);
            }
        }
        Err(WalletError::KeyDerivation(format!("no valid key at {}", path)))
    }

    fn key_hash(&self, path: &str) -> Result<[u8; 20], WalletError> {
        let secret = self.derive_secret(path)?;
        let public = secp256k1::PublicKey::from_secret_key(secp256k1::SECP256K1, &secret);
        Ok(hash160(&public.serialize()))
    }
}

#[async_trait]
impl WalletAccount for InMemoryAccount {
    fn network(&self) -> Network {
        self.network
    }

    async fn create_funding_transaction(
        &self,
        amount: u64,
    ) -> Result<FundingTransaction, WalletError> {
        let required = amount.saturating_add(self.fee);

        let mut selected = 0usize;
        let mut total = 0u64;
        for utxo in &self.utxos {
            if total >= required {
                break;
            }
            total += utxo.value;
            selected += 1;
        }
        if total < required {
            return Err(WalletError::InsufficientFunds {
                available: total,
                required,
            });
        }

        let n = self.funding_counter;
        let credit_pubkey_hash = self.key_hash(&format!("asset-lock/{}", n))?;
        let mut outputs = vec![TxOutput {
            value: amount,
            script: OutputScript::AssetLock { credit_pubkey_hash },
        }];
        let change = total - required;
        if change > 0 {
            outputs.push(TxOutput {
                value: change,
                script: OutputScript::PayToPubkeyHash(self.key_hash(&format!("change/{}", n))?),
            });
        }

        let inputs = self.utxos[..selected].iter().map(|u| u.outpoint).collect();
        let tx = FundingTransaction::new(inputs, outputs);

        tracing::debug!(
            amount,
            inputs = selected,
            change,
            tx_hash = %tx.hash(),
            "built funding transaction"
        );
        Ok(tx)
    }

    fn commit_funding(&mut self, tx: &FundingTransaction) {
        let tx_hash = tx.hash();
        self.utxos.retain(|u| !tx.inputs.contains(&u.outpoint));
        for (vout, output) in tx.outputs.iter().enumerate() {
            if let OutputScript::PayToPubkeyHash(_) = output.script {
                self.utxos.push(Utxo {
                    outpoint: OutPoint::new(tx_hash, vout as u32),
                    value: output.value,
                });
            }
        }
        self.funding_counter += 1;
        tracing::debug!(%tx_hash, balance = self.balance(), "funding transaction committed");
    }

    fn identity_ids(&self) -> Vec<Identifier> {
        self.identities.clone()
    }

    fn import_identity(&mut self, id: Identifier) -> Result<(), WalletError> {
        if self.identities.contains(&id) {
            return Err(WalletError::DuplicateIdentity(id));
        }
        self.identities.push(id);
        Ok(())
    }

    fn next_identity_index(&self) -> u32 {
        self.identities.len() as u32
    }

    fn identity_index(&self, id: &Identifier) -> Option<u32> {
        self.identities.iter().position(|i| i == id).map(|i| i as u32)
    }

    fn identity_signer(
        &self,
        identity_index: u32,
        key_id: u32,
    ) -> Result<IdentitySigner, WalletError> {
        let secret = self.derive_secret(&format!("identity/{}/{}", identity_index, key_id))?;
        Ok(IdentitySigner::new(key_id, secret))
    }
}
