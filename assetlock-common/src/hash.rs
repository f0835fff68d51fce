//! Hash primitives and 32-byte identifier newtypes.

use std::fmt;
use std::str::FromStr;

use ripemd::Ripemd160;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::ProtocolError;

/// Double SHA-256, the hash used for transactions, identifiers and signatures.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// RIPEMD-160 of SHA-256, used for key hashes in output scripts.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(Sha256::digest(data)).into()
}

macro_rules! hash_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            /// Wrap raw bytes.
            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Borrow the raw bytes.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Lowercase hex rendering.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Parse a 64-character hex string, with or without `0x`.
            pub fn from_hex(s: &str) -> Result<Self, ProtocolError> {
                let trimmed = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(trimmed)
                    .map_err(|e| ProtocolError::Decoding(format!("invalid hex: {}", e)))?;
                let array: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
                    ProtocolError::Decoding(format!("expected 32 bytes, got {}", b.len()))
                })?;
                Ok(Self(array))
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = ProtocolError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        // Hex in JSON, raw bytes in binary formats.
        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                if serializer.is_human_readable() {
                    serializer.serialize_str(&self.to_hex())
                } else {
                    self.0.serialize(serializer)
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                if deserializer.is_human_readable() {
                    let s = String::deserialize(deserializer)?;
                    Self::from_hex(&s).map_err(serde::de::Error::custom)
                } else {
                    <[u8; 32]>::deserialize(deserializer).map(Self)
                }
            }
        }
    };
}

hash_newtype!(
    /// Hash of a base-layer transaction.
    TxHash
);

hash_newtype!(
    /// Platform identifier of an identity, data contract or document.
    Identifier
);

hash_newtype!(
    /// Hash of a serialized state transition; the broadcast correlation handle.
    TransitionHash
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256d_known_vector() {
        // Double SHA-256 of the empty string.
        assert_eq!(
            hex::encode(sha256d(b"")),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn test_hex_parse_accepts_prefix() {
        let id = Identifier::new([0xab; 32]);
        let prefixed = format!("0x{}", id);
        assert_eq!(Identifier::from_hex(&prefixed).expect("should parse"), id);
        assert_eq!(id.to_string().parse::<Identifier>().expect("should parse"), id);
    }

    #[test]
    fn test_hex_parse_rejects_wrong_length() {
        assert!(TxHash::from_hex("abcd").is_err());
        assert!(TxHash::from_hex("zz").is_err());
    }

    #[test]
    fn test_json_uses_hex() {
        let hash = TxHash::new([1u8; 32]);
        let json = serde_json::to_string(&hash).expect("should serialize");
        assert_eq!(json, format!("\"{}\"", "01".repeat(32)));
        let back: TxHash = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(back, hash);
    }

    #[test]
    fn test_binary_uses_raw_bytes() {
        let hash = TransitionHash::new([7u8; 32]);
        let encoded = bincode::serialize(&hash).expect("should serialize");
        assert_eq!(encoded.len(), 32);
    }
}
