//! Platform state transitions.
//!
//! Every transition shares one signing and serialization path:
//!
//! * wire form: `protocol_version (u32 LE) || bincode(StateTransition)`
//! * hash: double SHA-256 of the wire form
//! * signature: compact ECDSA over the double SHA-256 of the wire form with
//!   the signature field emptied

use std::fmt;

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::document::{DataContract, Document};
use crate::error::ProtocolError;
use crate::hash::{sha256d, Identifier, TransitionHash};
use crate::keys::{verify_signature, IdentityPublicKey, IdentitySigner};
use crate::proof::AssetLockProof;

/// Protocol version prefixed to every serialized transition.
pub const PROTOCOL_VERSION: u32 = 1;

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum StateTransitionType {
    DataContractCreate = 0,
    DocumentsBatch = 1,
    IdentityCreate = 2,
    IdentityTopUp = 3,
}

impl StateTransitionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateTransitionType::DataContractCreate => "data-contract-create",
            StateTransitionType::DocumentsBatch => "document-batch",
            StateTransitionType::IdentityCreate => "identity-create",
            StateTransitionType::IdentityTopUp => "identity-top-up",
        }
    }
}

impl fmt::Display for StateTransitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSITION PAYLOADS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityCreateTransition {
    pub asset_lock_proof: AssetLockProof,
    pub public_keys: Vec<IdentityPublicKey>,
    /// Derived from the proof's outpoint.
    pub identity_id: Identifier,
    pub signature_public_key_id: u32,
    pub signature: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityTopUpTransition {
    pub asset_lock_proof: AssetLockProof,
    pub identity_id: Identifier,
    pub signature_public_key_id: u32,
    pub signature: Vec<u8>,
}

/// One operation inside a documents batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentTransition {
    Create(Document),
    Replace(Document),
    Delete {
        id: Identifier,
        document_type: String,
        data_contract_id: Identifier,
    },
}

impl DocumentTransition {
    pub fn document_id(&self) -> Identifier {
        match self {
            DocumentTransition::Create(d) | DocumentTransition::Replace(d) => d.id,
            DocumentTransition::Delete { id, .. } => *id,
        }
    }

    /// Owner of the carried document; deletes carry none.
    pub fn owner_id(&self) -> Option<Identifier> {
        match self {
            DocumentTransition::Create(d) | DocumentTransition::Replace(d) => Some(d.owner_id),
            DocumentTransition::Delete { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentsBatchTransition {
    pub owner_id: Identifier,
    pub transitions: Vec<DocumentTransition>,
    pub signature_public_key_id: u32,
    pub signature: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataContractCreateTransition {
    pub data_contract: DataContract,
    pub entropy: [u8; 32],
    pub signature_public_key_id: u32,
    pub signature: Vec<u8>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATE TRANSITION
// ═══════════════════════════════════════════════════════════════════════════════

/// A typed, signable platform instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateTransition {
    IdentityCreate(IdentityCreateTransition),
    IdentityTopUp(IdentityTopUpTransition),
    DocumentsBatch(DocumentsBatchTransition),
    DataContractCreate(DataContractCreateTransition),
}

impl StateTransition {
    /// Unsigned identity creation consuming `proof`.
    pub fn identity_create(proof: AssetLockProof, public_keys: Vec<IdentityPublicKey>) -> Self {
        let identity_id = proof.create_identifier();
        StateTransition::IdentityCreate(IdentityCreateTransition {
            asset_lock_proof: proof,
            public_keys,
            identity_id,
            signature_public_key_id: 0,
            signature: Vec::new(),
        })
    }

    /// Unsigned top-up of `identity_id` consuming `proof`.
    pub fn identity_top_up(proof: AssetLockProof, identity_id: Identifier) -> Self {
        StateTransition::IdentityTopUp(IdentityTopUpTransition {
            asset_lock_proof: proof,
            identity_id,
            signature_public_key_id: 0,
            signature: Vec::new(),
        })
    }

    pub fn documents_batch(owner_id: Identifier, transitions: Vec<DocumentTransition>) -> Self {
        StateTransition::DocumentsBatch(DocumentsBatchTransition {
            owner_id,
            transitions,
            signature_public_key_id: 0,
            signature: Vec::new(),
        })
    }

    pub fn data_contract_create(data_contract: DataContract) -> Self {
        let entropy = data_contract.entropy;
        StateTransition::DataContractCreate(DataContractCreateTransition {
            data_contract,
            entropy,
            signature_public_key_id: 0,
            signature: Vec::new(),
        })
    }

    pub fn transition_type(&self) -> StateTransitionType {
        match self {
            StateTransition::IdentityCreate(_) => StateTransitionType::IdentityCreate,
            StateTransition::IdentityTopUp(_) => StateTransitionType::IdentityTopUp,
            StateTransition::DocumentsBatch(_) => StateTransitionType::DocumentsBatch,
            StateTransition::DataContractCreate(_) => StateTransitionType::DataContractCreate,
        }
    }

    pub fn asset_lock_proof(&self) -> Option<&AssetLockProof> {
        match self {
            StateTransition::IdentityCreate(t) => Some(&t.asset_lock_proof),
            StateTransition::IdentityTopUp(t) => Some(&t.asset_lock_proof),
            _ => None,
        }
    }

    /// Identity the transition acts for.
    pub fn owner_id(&self) -> Identifier {
        match self {
            StateTransition::IdentityCreate(t) => t.identity_id,
            StateTransition::IdentityTopUp(t) => t.identity_id,
            StateTransition::DocumentsBatch(t) => t.owner_id,
            StateTransition::DataContractCreate(t) => t.data_contract.owner_id,
        }
    }

    pub fn signature_public_key_id(&self) -> u32 {
        match self {
            StateTransition::IdentityCreate(t) => t.signature_public_key_id,
            StateTransition::IdentityTopUp(t) => t.signature_public_key_id,
            StateTransition::DocumentsBatch(t) => t.signature_public_key_id,
            StateTransition::DataContractCreate(t) => t.signature_public_key_id,
        }
    }

    pub fn signature(&self) -> &[u8] {
        match self {
            StateTransition::IdentityCreate(t) => &t.signature,
            StateTransition::IdentityTopUp(t) => &t.signature,
            StateTransition::DocumentsBatch(t) => &t.signature,
            StateTransition::DataContractCreate(t) => &t.signature,
        }
    }

    fn signature_mut(&mut self) -> (&mut u32, &mut Vec<u8>) {
        match self {
            StateTransition::IdentityCreate(t) => (&mut t.signature_public_key_id, &mut t.signature),
            StateTransition::IdentityTopUp(t) => (&mut t.signature_public_key_id, &mut t.signature),
            StateTransition::DocumentsBatch(t) => (&mut t.signature_public_key_id, &mut t.signature),
            StateTransition::DataContractCreate(t) => {
                (&mut t.signature_public_key_id, &mut t.signature)
            }
        }
    }

    pub fn is_signed(&self) -> bool {
        !self.signature().is_empty()
    }

    /// Digest covered by the signature: the wire form with the signature emptied.
    pub fn signable_digest(&self) -> Result<[u8; 32], ProtocolError> {
        let mut unsigned = self.clone();
        unsigned.signature_mut().1.clear();
        Ok(sha256d(&unsigned.to_bytes()?))
    }

    /// Sign with `signer`, recording its key id.
    pub fn sign(&mut self, signer: &IdentitySigner) -> Result<(), ProtocolError> {
        *self.signature_mut().0 = signer.key_id();
        let digest = self.signable_digest()?;
        *self.signature_mut().1 = signer.sign(digest);
        Ok(())
    }

    /// Verify the signature against `key`.
    pub fn verify_signature(&self, key: &IdentityPublicKey) -> Result<(), ProtocolError> {
        if !self.is_signed() {
            return Err(ProtocolError::MissingSignature);
        }
        if key.id != self.signature_public_key_id() {
            return Err(ProtocolError::Signature(format!(
                "signed with key {}, verifying with key {}",
                self.signature_public_key_id(),
                key.id
            )));
        }
        verify_signature(key, self.signable_digest()?, self.signature())
    }

    /// Canonical wire form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        let body = codec()
            .serialize(self)
            .map_err(|e| ProtocolError::Encoding(e.to_string()))?;
        let mut out = Vec::with_capacity(4 + body.len());
        out.extend_from_slice(&PROTOCOL_VERSION.to_le_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Decode the wire form, rejecting unknown versions and proofs whose
    /// confirmation does not lock their transaction.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() < 4 {
            return Err(ProtocolError::Decoding(format!(
                "{} bytes is too short for a state transition",
                bytes.len()
            )));
        }
        let (version, body) = bytes.split_at(4);
        let version = u32::from_le_bytes([version[0], version[1], version[2], version[3]]);
        if version != PROTOCOL_VERSION {
            return Err(ProtocolError::UnsupportedVersion(version));
        }
        let transition: StateTransition = codec().deserialize(body)?;
        if let Some(proof) = transition.asset_lock_proof() {
            proof.validate(0)?;
        }
        Ok(transition)
    }

    pub fn hash(&self) -> Result<TransitionHash, ProtocolError> {
        Ok(TransitionHash(sha256d(&self.to_bytes()?)))
    }
}
