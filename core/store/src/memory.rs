use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use crate::columns::DBCol;
use crate::error::DbError;
use crate::kv::{BatchOp, KvStore, WriteBatch};

/// In-process, in-memory store used by every crate's unit tests in place of
/// a real RocksDB instance (mirrors the teacher's own `testlib`/in-memory
/// store substitute pattern).
#[derive(Default)]
pub struct MemoryStore {
    cols: RwLock<HashMap<DBCol, BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, col: DBCol, key: &[u8]) -> Result<Option<Vec<u8>>, DbError> {
        Ok(self.cols.read().get(&col).and_then(|m| m.get(key)).cloned())
    }

    fn write(&self, batch: WriteBatch) -> Result<(), DbError> {
        let mut cols = self.cols.write();
        for op in batch.ops() {
            match op {
                BatchOp::Put { col, key, value } => {
                    cols.entry(*col).or_default().insert(key.clone(), value.clone());
                }
                BatchOp::Del { col, key } => {
                    if let Some(m) = cols.get_mut(col) {
                        m.remove(key);
                    }
                }
            }
        }
        Ok(())
    }

    fn range(
        &self,
        col: DBCol,
        gte: &[u8],
        lte: &[u8],
        reverse: bool,
        limit: Option<usize>,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, DbError> {
        let cols = self.cols.read();
        let Some(map) = cols.get(&col) else { return Ok(Vec::new()) };
        let mut items: Vec<(Vec<u8>, Vec<u8>)> = map
            .range(gte.to_vec()..=lte.to_vec())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if reverse {
            items.reverse();
        }
        if let Some(limit) = limit {
            items.truncate(limit);
        }
        Ok(items)
    }

    fn clear(&self, col: DBCol, gte: &[u8], lt: &[u8]) -> Result<(), DbError> {
        let mut cols = self.cols.write();
        if let Some(map) = cols.get_mut(&col) {
            let keys: Vec<Vec<u8>> = map.range(gte.to_vec()..lt.to_vec()).map(|(k, _)| k.clone()).collect();
            for k in keys {
                map.remove(&k);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_del() {
        let store = MemoryStore::new();
        store.put(DBCol::Accounts, b"addr1", b"value1").unwrap();
        assert_eq!(store.get(DBCol::Accounts, b"addr1").unwrap(), Some(b"value1".to_vec()));
        assert!(store.exists(DBCol::Accounts, b"addr1").unwrap());
        store.del(DBCol::Accounts, b"addr1").unwrap();
        assert_eq!(store.get(DBCol::Accounts, b"addr1").unwrap(), None);
    }

    #[test]
    fn batch_write_is_atomic_from_readers_perspective() {
        let store = MemoryStore::new();
        let mut batch = WriteBatch::new();
        batch.put(DBCol::Accounts, b"a".to_vec(), b"1".to_vec());
        batch.put(DBCol::Accounts, b"b".to_vec(), b"2".to_vec());
        store.write(batch).unwrap();
        assert_eq!(store.get(DBCol::Accounts, b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get(DBCol::Accounts, b"b").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn range_scan_is_lexicographic_and_limited() {
        let store = MemoryStore::new();
        for k in [b"a", b"b", b"c", b"d"] {
            store.put(DBCol::ChainState, k, b"x").unwrap();
        }
        let items = store.range(DBCol::ChainState, b"a", b"z", false, Some(2)).unwrap();
        assert_eq!(items.iter().map(|(k, _)| k.clone()).collect::<Vec<_>>(), vec![b"a".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn clear_removes_half_open_range() {
        let store = MemoryStore::new();
        for k in [b"a", b"b", b"c"] {
            store.put(DBCol::DiffState, k, b"x").unwrap();
        }
        store.clear(DBCol::DiffState, b"a", b"c").unwrap();
        assert!(!store.exists(DBCol::DiffState, b"a").unwrap());
        assert!(!store.exists(DBCol::DiffState, b"b").unwrap());
        assert!(store.exists(DBCol::DiffState, b"c").unwrap());
    }
}
