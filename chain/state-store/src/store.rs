use std::collections::HashMap;

use lisk_primitives::{Account, Address, Codable, Hash32};
use lisk_store::{DBCol, DbError, KvStore, WriteBatch};
use sha2::{Digest, Sha256};

use crate::diff::{DiffEntry, DiffKey, StateDiff};
use crate::error::StateStoreError;

type OverlayKey = (DBCol, Vec<u8>);

/// Transactional overlay over a [`KvStore`] (spec §4.3). Reads within one
/// transition see the overlay's own writes first; every value read from the
/// underlying store is cached once as a "snapshot" (the pre-image), which is
/// what lets `finalize` classify each key as created/updated/deleted.
pub struct StateStore<'a> {
    kv: &'a dyn KvStore,
    snapshots: HashMap<OverlayKey, Option<Vec<u8>>>,
    writes: HashMap<OverlayKey, Option<Vec<u8>>>,
}

impl<'a> StateStore<'a> {
    pub fn new(kv: &'a dyn KvStore) -> Self {
        StateStore { kv, snapshots: HashMap::new(), writes: HashMap::new() }
    }

    fn snapshot_of(&mut self, col: DBCol, key: &[u8]) -> Result<Option<Vec<u8>>, DbError> {
        let overlay_key = (col, key.to_vec());
        if let Some(existing) = self.snapshots.get(&overlay_key) {
            return Ok(existing.clone());
        }
        let value = self.kv.get(col, key)?;
        self.snapshots.insert(overlay_key, value.clone());
        Ok(value)
    }

    pub fn get_raw(&mut self, col: DBCol, key: &[u8]) -> Result<Option<Vec<u8>>, DbError> {
        let overlay_key = (col, key.to_vec());
        if let Some(written) = self.writes.get(&overlay_key) {
            return Ok(written.clone());
        }
        self.snapshot_of(col, key)
    }

    pub fn set_raw(&mut self, col: DBCol, key: &[u8], value: Vec<u8>) -> Result<(), DbError> {
        self.snapshot_of(col, key)?;
        self.writes.insert((col, key.to_vec()), Some(value));
        Ok(())
    }

    pub fn del_raw(&mut self, col: DBCol, key: &[u8]) -> Result<(), DbError> {
        self.snapshot_of(col, key)?;
        self.writes.insert((col, key.to_vec()), None);
        Ok(())
    }

    pub fn get_account(&mut self, address: &Address) -> Result<Option<Account>, StateStoreError> {
        match self.get_raw(DBCol::Accounts, address.as_slice())? {
            Some(bytes) => Ok(Some(Account::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn set_account(&mut self, account: &Account) -> Result<(), StateStoreError> {
        let encoded = account.encode()?;
        self.set_raw(DBCol::Accounts, account.address.as_slice(), encoded)?;
        Ok(())
    }

    pub fn del_account(&mut self, address: &Address) -> Result<(), StateStoreError> {
        self.del_raw(DBCol::Accounts, address.as_slice())?;
        Ok(())
    }

    /// Full scan of the accounts column, bypassing the overlay — callers
    /// read this against a store with nothing written yet (e.g. a
    /// validator-list query), never mid-transition.
    pub fn scan_accounts(&self) -> Result<Vec<Account>, StateStoreError> {
        let rows = self.kv.range(DBCol::Accounts, &[], &[0xFF; 64], false, None)?;
        rows.into_iter().map(|(_, value)| Ok(Account::decode(&value)?)).collect()
    }

    pub fn get_chain_state(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, StateStoreError> {
        Ok(self.get_raw(DBCol::ChainState, key)?)
    }

    pub fn set_chain_state(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), StateStoreError> {
        self.set_raw(DBCol::ChainState, key, value)?;
        Ok(())
    }

    pub fn del_chain_state(&mut self, key: &[u8]) -> Result<(), StateStoreError> {
        self.del_raw(DBCol::ChainState, key)?;
        Ok(())
    }

    /// Digest over every pending write, sorted by (column, key). Stands in
    /// for a Merkle root over the account/chain-state tries (out of scope —
    /// spec §1 treats hashing as a pure primitive) while still giving a
    /// block's declared `stateRoot` something real to commit to: two blocks
    /// that mutate state identically produce the same root, and any
    /// divergence in what was written changes it.
    pub fn compute_root(&self) -> Hash32 {
        let mut entries: Vec<(&OverlayKey, &Option<Vec<u8>>)> = self.writes.iter().collect();
        entries.sort_by(|(a, _), (b, _)| (a.0.as_u32(), &a.1).cmp(&(b.0.as_u32(), &b.1)));

        let mut hasher = Sha256::new();
        for ((col, key), value) in entries {
            hasher.update(col.as_u32().to_be_bytes());
            hasher.update((key.len() as u32).to_be_bytes());
            hasher.update(key);
            match value {
                Some(v) => {
                    hasher.update([1u8]);
                    hasher.update((v.len() as u32).to_be_bytes());
                    hasher.update(v);
                }
                None => hasher.update([0u8]),
            }
        }
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Hash32(out)
    }

    /// Flushes accumulated mutations into `batch` and returns the diff
    /// needed to invert them. A key with no effective change (deleted a key
    /// that never existed) contributes neither a batch op nor a diff entry.
    pub fn finalize(self, batch: &mut WriteBatch) -> StateDiff {
        let mut diff = StateDiff::default();
        for (overlay_key, written) in self.writes {
            let (col, key) = overlay_key;
            let snapshot = self.snapshots.get(&(col, key.clone())).cloned().flatten();
            match (snapshot, written) {
                (None, Some(new_value)) => {
                    batch.put(col, key.clone(), new_value);
                    diff.created.push(DiffKey { col, key });
                }
                (Some(pre), Some(new_value)) => {
                    batch.put(col, key.clone(), new_value);
                    diff.updated.push(DiffEntry { col, key, value: pre });
                }
                (Some(pre), None) => {
                    batch.del(col, key.clone());
                    diff.deleted.push(DiffEntry { col, key, value: pre });
                }
                (None, None) => {}
            }
        }
        diff
    }
}
