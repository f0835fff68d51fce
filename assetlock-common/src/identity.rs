//! Platform identities.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::hash::Identifier;
use crate::keys::IdentityPublicKey;

/// A platform identity as returned by the network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Identifier,
    pub public_keys: Vec<IdentityPublicKey>,
    /// Credit balance.
    pub balance: u64,
    pub revision: u64,
}

impl Identity {
    pub fn new(id: Identifier, public_keys: Vec<IdentityPublicKey>) -> Self {
        Self {
            id,
            public_keys,
            balance: 0,
            revision: 0,
        }
    }

    pub fn public_key_by_id(&self, key_id: u32) -> Option<&IdentityPublicKey> {
        self.public_keys.iter().find(|k| k.id == key_id)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        bincode::serialize(self).map_err(|e| ProtocolError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
