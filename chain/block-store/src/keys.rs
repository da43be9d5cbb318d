use lisk_primitives::{BlockId, TransactionId};
use lisk_store::columns::height_key as col_height_key;

pub fn block_id_key(id: &BlockId) -> Vec<u8> {
    id.as_bytes().to_vec()
}

pub fn height_key(height: u32) -> Vec<u8> {
    col_height_key(height)
}

pub fn tx_id_key(id: &TransactionId) -> Vec<u8> {
    id.as_bytes().to_vec()
}

pub const FINALIZED_HEIGHT_KEY: &[u8] = b"finalized_height";

pub fn encode_tx_ids(ids: &[TransactionId]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(ids.len() * 32);
    for id in ids {
        buf.extend_from_slice(id.as_bytes());
    }
    buf
}

pub fn decode_tx_ids(bytes: &[u8]) -> Vec<TransactionId> {
    bytes
        .chunks_exact(32)
        .map(|chunk| {
            let mut arr = [0u8; 32];
            arr.copy_from_slice(chunk);
            TransactionId(arr)
        })
        .collect()
}
