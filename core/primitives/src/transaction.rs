use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::address::Bytes;
use crate::hash::Hash32;

pub type TransactionId = Hash32;

/// `{ moduleID, assetID, nonce, fee, senderPublicKey, signatures, asset }` — spec §3.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Transaction {
    pub module_id: u32,
    pub asset_id: u32,
    pub nonce: u64,
    pub fee: u64,
    pub sender_public_key: Bytes,
    pub signatures: Vec<Bytes>,
    /// Module-specific payload, decoded against the owning asset's schema.
    pub asset: Vec<u8>,
}

impl Transaction {
    /// `id = hash(encode(tx))`. Callers must pass the transaction's canonical
    /// encoding (see `lisk_codec`); this type does not encode itself to avoid
    /// a cyclic dependency between primitives and codec.
    pub fn id_from_encoding(encoded: &[u8]) -> TransactionId {
        Hash32::of(encoded)
    }
}
