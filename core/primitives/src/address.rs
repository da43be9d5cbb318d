use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};

/// A binary-safe identifier: an address, a public key, or a signature.
///
/// Textual (hex) representation only applies at external boundaries (RPC,
/// CLI) — internally these are always raw bytes, never strings.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, BorshSerialize, BorshDeserialize)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        Ok(Bytes(hex::decode(s)?))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(v: Vec<u8>) -> Self {
        Bytes(v)
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes({})", self.to_hex())
    }
}

impl fmt::Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl serde::Serialize for Bytes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Bytes {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Bytes::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Alias used where the role of a `Bytes` value is specifically an account address.
pub type Address = Bytes;
