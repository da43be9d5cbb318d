use lisk_primitives::{Block, BlockId, Codable, Transaction};
use lisk_state_store::{StateDiff, StateStore};
use lisk_store::{DBCol, KvStore, WriteBatch};

use crate::error::BlockStoreError;
use crate::keys::{block_id_key, decode_tx_ids, encode_tx_ids, height_key, tx_id_key, FINALIZED_HEIGHT_KEY};

/// Persists block headers, transaction payloads, forward/reverse indexes,
/// the temp-block restoration buffer, and per-height state diffs (spec §4.4).
pub struct BlockStore<'a> {
    kv: &'a dyn KvStore,
}

impl<'a> BlockStore<'a> {
    pub fn new(kv: &'a dyn KvStore) -> Self {
        BlockStore { kv }
    }

    pub fn get_finalized_height(&self) -> Result<u32, BlockStoreError> {
        match self.kv.get(DBCol::FinalizedHeight, FINALIZED_HEIGHT_KEY)? {
            Some(bytes) => {
                let arr: [u8; 4] = bytes.try_into().map_err(|_| BlockStoreError::NotFound)?;
                Ok(u32::from_be_bytes(arr))
            }
            None => Ok(0),
        }
    }

    /// Highest height present under BLOCKS_HEIGHT, or `None` before genesis.
    pub fn tip_height(&self) -> Result<Option<u32>, BlockStoreError> {
        let rows = self.kv.range(DBCol::BlocksHeight, &height_key(0), &height_key(u32::MAX), true, Some(1))?;
        Ok(rows.first().map(|(key, _)| {
            let mut arr = [0u8; 4];
            arr.copy_from_slice(&key[..4]);
            u32::from_be_bytes(arr)
        }))
    }

    pub fn get_block_id_by_height(&self, height: u32) -> Result<Option<BlockId>, BlockStoreError> {
        match self.kv.get(DBCol::BlocksHeight, &height_key(height))? {
            Some(bytes) => {
                let arr: [u8; 32] = bytes.try_into().map_err(|_| BlockStoreError::NotFound)?;
                Ok(Some(BlockId(arr)))
            }
            None => Ok(None),
        }
    }

    pub fn get_block_by_id(&self, id: &BlockId) -> Result<Option<Block>, BlockStoreError> {
        let Some(header_bytes) = self.kv.get(DBCol::BlocksId, &block_id_key(id))? else { return Ok(None) };
        let header = lisk_primitives::BlockHeader::decode(&header_bytes)?;

        let tx_ids = match self.kv.get(DBCol::TxBlockId, &block_id_key(id))? {
            Some(bytes) => decode_tx_ids(&bytes),
            None => Vec::new(),
        };
        let mut payload = Vec::with_capacity(tx_ids.len());
        for tx_id in &tx_ids {
            let tx_bytes = self.kv.get(DBCol::TxId, &tx_id_key(tx_id))?.ok_or(BlockStoreError::NotFound)?;
            payload.push(Transaction::decode(&tx_bytes)?);
        }
        Ok(Some(Block { header, payload }))
    }

    pub fn get_block_by_height(&self, height: u32) -> Result<Option<Block>, BlockStoreError> {
        match self.get_block_id_by_height(height)? {
            Some(id) => self.get_block_by_id(&id),
            None => Ok(None),
        }
    }

    pub fn get_transaction_by_id(&self, id: &lisk_primitives::TransactionId) -> Result<Option<Transaction>, BlockStoreError> {
        match self.kv.get(DBCol::TxId, &tx_id_key(id))? {
            Some(bytes) => Ok(Some(Transaction::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn get_temp_block(&self, height: u32) -> Result<Option<Block>, BlockStoreError> {
        match self.kv.get(DBCol::TempBlocksHeight, &height_key(height))? {
            Some(bytes) => Ok(Some(Block::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Spec §4.4 `saveBlock`. Consumes the state store passed by the caller
    /// (one per block application) and commits header, payload, indexes and
    /// the finalized state diff in a single atomic batch.
    pub fn save_block(
        &self,
        block: &Block,
        state_store: StateStore<'_>,
        finalized_height: u32,
        remove_from_temp: bool,
    ) -> Result<StateDiff, BlockStoreError> {
        let id = block.header.compute_id()?;
        let height = block.height();
        let mut batch = WriteBatch::new();

        batch.put(DBCol::BlocksId, block_id_key(&id), block.header.encode()?);
        batch.put(DBCol::BlocksHeight, height_key(height), block_id_key(&id));

        let mut tx_ids = Vec::with_capacity(block.payload.len());
        for tx in &block.payload {
            let encoded = tx.encode()?;
            let tx_id = Transaction::id_from_encoding(&encoded);
            batch.put(DBCol::TxId, tx_id_key(&tx_id), encoded);
            tx_ids.push(tx_id);
        }
        batch.put(DBCol::TxBlockId, block_id_key(&id), encode_tx_ids(&tx_ids));

        if remove_from_temp {
            batch.del(DBCol::TempBlocksHeight, height_key(height));
        }

        let diff = state_store.finalize(&mut batch);
        batch.put(DBCol::DiffState, height_key(height), diff.encode()?);
        batch.put(DBCol::FinalizedHeight, FINALIZED_HEIGHT_KEY, finalized_height.to_be_bytes().to_vec());

        self.kv.write(batch)?;
        tracing::debug!(height, id = %id, finalized_height, "saved block");

        if finalized_height > 0 {
            if let Err(err) = self.kv.clear(DBCol::DiffState, &height_key(0), &height_key(finalized_height)) {
                tracing::warn!(?err, finalized_height, "best-effort state-diff pruning failed, will retry next save");
            }
        }

        Ok(diff)
    }

    /// Spec §4.4 `deleteBlock`. The inverse of `save_block`: restores
    /// pre-image values from the stored diff into `state_store`, then
    /// removes the block's own records.
    pub fn delete_block(
        &self,
        block: &Block,
        mut state_store: StateStore<'_>,
        finalized_height: u32,
        save_temp_block: bool,
    ) -> Result<(), BlockStoreError> {
        let height = block.height();
        if height <= finalized_height {
            return Err(BlockStoreError::BelowFinalizedHeight(height));
        }

        let id = block.header.compute_id()?;
        let mut batch = WriteBatch::new();

        batch.del(DBCol::BlocksId, block_id_key(&id));
        batch.del(DBCol::BlocksHeight, height_key(height));
        for tx in &block.payload {
            let encoded = tx.encode()?;
            let tx_id = Transaction::id_from_encoding(&encoded);
            batch.del(DBCol::TxId, tx_id_key(&tx_id));
        }
        batch.del(DBCol::TxBlockId, block_id_key(&id));

        if save_temp_block {
            batch.put(DBCol::TempBlocksHeight, height_key(height), block.encode()?);
        }

        let diff_bytes = self.kv.get(DBCol::DiffState, &height_key(height))?.ok_or(BlockStoreError::NotFound)?;
        let diff = StateDiff::decode(&diff_bytes)?;
        for key in &diff.created {
            state_store.del_raw(key.col, &key.key)?;
        }
        for entry in diff.updated.iter().chain(diff.deleted.iter()) {
            state_store.set_raw(entry.col, &entry.key, entry.value.clone())?;
        }
        // The overlay's own diff is discarded: the persisted diff already
        // fully describes the rollback, which we delete below.
        let _ = state_store.finalize(&mut batch);
        batch.del(DBCol::DiffState, height_key(height));

        self.kv.write(batch)?;
        tracing::debug!(height, id = %id, "deleted block");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lisk_primitives::{Address, BlockAsset, BlockHeader, Bytes, Hash32};
    use lisk_store::MemoryStore;

    use super::*;

    fn block_at(height: u32, prev: BlockId) -> Block {
        let header = BlockHeader {
            version: 1,
            height,
            timestamp: height * 10,
            previous_block_id: prev,
            generator_address: Address(vec![1]),
            transaction_root: Hash32::ZERO,
            state_root: Hash32::ZERO,
            assets: vec![BlockAsset { module_id: 0, data: vec![] }],
            signature: Bytes(vec![9; 8]),
        };
        Block { header, payload: vec![] }
    }

    #[test]
    fn save_then_get_by_height_and_id_round_trip() {
        let kv = MemoryStore::new();
        let store = BlockStore::new(&kv);
        let block = block_at(1, BlockId::ZERO);
        let id = block.header.compute_id().unwrap();

        let state_store = StateStore::new(&kv);
        store.save_block(&block, state_store, 0, false).unwrap();

        assert_eq!(store.get_block_by_height(1).unwrap().unwrap().header.height, 1);
        assert_eq!(store.get_block_by_id(&id).unwrap().unwrap().header, block.header);
    }

    #[test]
    fn delete_then_reapply_restores_state() {
        let kv = MemoryStore::new();
        let store = BlockStore::new(&kv);
        let block = block_at(11, BlockId::ZERO);

        let mut state_store = StateStore::new(&kv);
        state_store.set_chain_state(b"balance", 150u64.to_be_bytes().to_vec()).unwrap();
        store.save_block(&block, state_store, 0, false).unwrap();
        assert_eq!(kv.get(DBCol::ChainState, b"balance").unwrap(), Some(150u64.to_be_bytes().to_vec()));

        let state_store = StateStore::new(&kv);
        store.delete_block(&block, state_store, 0, false).unwrap();
        assert_eq!(kv.get(DBCol::ChainState, b"balance").unwrap(), None);
        assert_eq!(kv.get(DBCol::DiffState, &height_key(11)).unwrap(), None);

        let state_store = StateStore::new(&kv);
        store.save_block(&block, state_store, 0, false).unwrap();
        assert_eq!(kv.get(DBCol::ChainState, b"balance").unwrap(), None);
    }

    #[test]
    fn tip_height_tracks_highest_saved_block() {
        let kv = MemoryStore::new();
        let store = BlockStore::new(&kv);
        assert_eq!(store.tip_height().unwrap(), None);

        store.save_block(&block_at(1, BlockId::ZERO), StateStore::new(&kv), 0, false).unwrap();
        store.save_block(&block_at(2, BlockId::ZERO), StateStore::new(&kv), 0, false).unwrap();
        assert_eq!(store.tip_height().unwrap(), Some(2));
    }

    #[test]
    fn delete_below_finalized_height_fails() {
        let kv = MemoryStore::new();
        let store = BlockStore::new(&kv);
        let block = block_at(5, BlockId::ZERO);
        let state_store = StateStore::new(&kv);
        store.save_block(&block, state_store, 5, false).unwrap();

        let state_store = StateStore::new(&kv);
        assert!(matches!(store.delete_block(&block, state_store, 5, false), Err(BlockStoreError::BelowFinalizedHeight(5))));
    }
}
