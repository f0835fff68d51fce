//! Identity keys and secp256k1 signing.

use std::fmt;

use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, SecretKey, SECP256K1};
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::hash::hash160;

/// What an identity key may be used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPurpose {
    Authentication,
    Encryption,
    Decryption,
    Transfer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    Master,
    Critical,
    High,
    Medium,
}

/// Public half of an identity key as registered on the platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPublicKey {
    /// Key index within the identity.
    pub id: u32,
    pub purpose: KeyPurpose,
    pub security_level: SecurityLevel,
    /// 33-byte compressed secp256k1 point.
    pub data: Vec<u8>,
    pub read_only: bool,
}

impl IdentityPublicKey {
    /// Master authentication key, the kind every new identity registers at index 0.
    pub fn master(id: u32, public_key: &PublicKey) -> Self {
        Self {
            id,
            purpose: KeyPurpose::Authentication,
            security_level: SecurityLevel::Master,
            data: public_key.serialize().to_vec(),
            read_only: false,
        }
    }

    pub fn to_public_key(&self) -> Result<PublicKey, ProtocolError> {
        PublicKey::from_slice(&self.data).map_err(|e| ProtocolError::InvalidKey(e.to_string()))
    }

    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.data)
    }
}

/// Private key bound to an identity key index.
#[derive(Clone)]
pub struct IdentitySigner {
    key_id: u32,
    secret: SecretKey,
}

impl IdentitySigner {
    pub fn new(key_id: u32, secret: SecretKey) -> Self {
        Self { key_id, secret }
    }

    pub fn from_secret_bytes(key_id: u32, bytes: &[u8; 32]) -> Result<Self, ProtocolError> {
        let secret =
            SecretKey::from_slice(bytes).map_err(|e| ProtocolError::InvalidKey(e.to_string()))?;
        Ok(Self::new(key_id, secret))
    }

    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret_key(SECP256K1, &self.secret)
    }

    /// Public key record for this signer as a master authentication key.
    pub fn identity_public_key(&self) -> IdentityPublicKey {
        IdentityPublicKey::master(self.key_id, &self.public_key())
    }

    /// Compact 64-byte ECDSA signature over a 32-byte digest.
    pub fn sign(&self, digest: [u8; 32]) -> Vec<u8> {
        let message = Message::from_digest(digest);
        SECP256K1
            .sign_ecdsa(&message, &self.secret)
            .serialize_compact()
            .to_vec()
    }
}

impl fmt::Debug for IdentitySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentitySigner")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

/// Verify a compact signature over `digest` against `key`.
pub fn verify_signature(
    key: &IdentityPublicKey,
    digest: [u8; 32],
    signature: &[u8],
) -> Result<(), ProtocolError> {
    let public_key = key.to_public_key()?;
    let signature = Signature::from_compact(signature)?;
    let message = Message::from_digest(digest);
    SECP256K1.verify_ecdsa(&message, &signature, &public_key)?;
    Ok(())
}
