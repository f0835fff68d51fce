//! Data contracts and documents.
//!
//! Schemas are carried as opaque JSON text; validating documents against
//! them is left to the platform.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::hash::{sha256d, Identifier};

/// Fresh 32 bytes of entropy for id derivation.
pub fn generate_entropy() -> [u8; 32] {
    rand::random()
}

/// A document property value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentValue {
    Null,
    Bool(bool),
    Integer(i64),
    Text(String),
    Bytes(Vec<u8>),
}

impl From<&str> for DocumentValue {
    fn from(s: &str) -> Self {
        DocumentValue::Text(s.to_string())
    }
}

impl From<String> for DocumentValue {
    fn from(s: String) -> Self {
        DocumentValue::Text(s)
    }
}

impl From<i64> for DocumentValue {
    fn from(v: i64) -> Self {
        DocumentValue::Integer(v)
    }
}

impl From<bool> for DocumentValue {
    fn from(v: bool) -> Self {
        DocumentValue::Bool(v)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataContract {
    pub id: Identifier,
    pub owner_id: Identifier,
    pub version: u32,
    pub entropy: [u8; 32],
    /// Document type name to JSON schema text.
    pub document_schemas: BTreeMap<String, String>,
}

impl DataContract {
    /// New contract owned by `owner_id`, with fresh entropy.
    pub fn new(owner_id: Identifier, document_schemas: BTreeMap<String, String>) -> Self {
        Self::with_entropy(owner_id, document_schemas, generate_entropy())
    }

    pub fn with_entropy(
        owner_id: Identifier,
        document_schemas: BTreeMap<String, String>,
        entropy: [u8; 32],
    ) -> Self {
        Self {
            id: Self::derive_id(&owner_id, &entropy),
            owner_id,
            version: 1,
            entropy,
            document_schemas,
        }
    }

    pub fn derive_id(owner_id: &Identifier, entropy: &[u8; 32]) -> Identifier {
        let mut preimage = Vec::with_capacity(64);
        preimage.extend_from_slice(owner_id.as_bytes());
        preimage.extend_from_slice(entropy);
        Identifier(sha256d(&preimage))
    }

    pub fn has_document_type(&self, document_type: &str) -> bool {
        self.document_schemas.contains_key(document_type)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        bincode::serialize(self).map_err(|e| ProtocolError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: Identifier,
    pub document_type: String,
    pub data_contract_id: Identifier,
    pub owner_id: Identifier,
    pub revision: u64,
    pub entropy: [u8; 32],
    pub properties: BTreeMap<String, DocumentValue>,
}

impl Document {
    /// New document of `document_type` under `contract`, with fresh entropy.
    pub fn new(
        contract: &DataContract,
        document_type: impl Into<String>,
        owner_id: Identifier,
        properties: BTreeMap<String, DocumentValue>,
    ) -> Self {
        Self::with_entropy(
            contract.id,
            document_type.into(),
            owner_id,
            properties,
            generate_entropy(),
        )
    }

    pub fn with_entropy(
        data_contract_id: Identifier,
        document_type: String,
        owner_id: Identifier,
        properties: BTreeMap<String, DocumentValue>,
        entropy: [u8; 32],
    ) -> Self {
        Self {
            id: Self::derive_id(&data_contract_id, &owner_id, &document_type, &entropy),
            document_type,
            data_contract_id,
            owner_id,
            revision: 1,
            entropy,
            properties,
        }
    }

    pub fn derive_id(
        data_contract_id: &Identifier,
        owner_id: &Identifier,
        document_type: &str,
        entropy: &[u8; 32],
    ) -> Identifier {
        let mut preimage = Vec::with_capacity(96 + document_type.len());
        preimage.extend_from_slice(data_contract_id.as_bytes());
        preimage.extend_from_slice(owner_id.as_bytes());
        preimage.extend_from_slice(document_type.as_bytes());
        preimage.extend_from_slice(entropy);
        Identifier(sha256d(&preimage))
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<DocumentValue>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&DocumentValue> {
        self.properties.get(key)
    }
}
