use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::address::{Address, Bytes};
use crate::hash::Hash32;
use crate::transaction::Transaction;

pub type BlockId = Hash32;

/// A single module-scoped asset carried in the header (e.g. seed reveal,
/// punishment info). Kept opaque here; modules interpret the bytes.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct BlockAsset {
    pub module_id: u32,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    pub height: u32,
    pub timestamp: u32,
    pub previous_block_id: BlockId,
    pub generator_address: Address,
    pub transaction_root: Hash32,
    pub state_root: Hash32,
    pub assets: Vec<BlockAsset>,
    pub signature: Bytes,
}

impl BlockHeader {
    /// Header bytes used for signing / id derivation exclude the signature
    /// field itself (spec §3: "hash(encode(header-without-signature...))").
    pub fn without_signature(&self) -> BlockHeader {
        let mut h = self.clone();
        h.signature = Bytes::default();
        h
    }
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub payload: Vec<Transaction>,
}

impl Block {
    pub fn height(&self) -> u32 {
        self.header.height
    }
}
