use std::path::Path;

use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch as RocksWriteBatch, DB};

use crate::columns::DBCol;
use crate::error::DbError;
use crate::kv::{BatchOp, KvStore, WriteBatch};

/// RocksDB-backed [`KvStore`], one column family per [`DBCol`] — the real
/// on-disk backend (spec's single source-of-truth, §3 "Ownership").
pub struct RocksDbStore {
    db: DB,
}

impl RocksDbStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs: Vec<ColumnFamilyDescriptor> =
            DBCol::all().map(|col| ColumnFamilyDescriptor::new(col.cf_name(), Options::default())).collect();

        let db = DB::open_cf_descriptors(&opts, path, cfs).map_err(|e| DbError::Io(e.to_string()))?;
        Ok(RocksDbStore { db })
    }

    fn cf(&self, col: DBCol) -> Result<&rocksdb::ColumnFamily, DbError> {
        self.db.cf_handle(col.cf_name()).ok_or_else(|| DbError::Io(format!("missing column family {:?}", col.cf_name())))
    }
}

impl KvStore for RocksDbStore {
    fn get(&self, col: DBCol, key: &[u8]) -> Result<Option<Vec<u8>>, DbError> {
        let cf = self.cf(col)?;
        self.db.get_cf(cf, key).map_err(|e| DbError::Io(e.to_string()))
    }

    fn write(&self, batch: WriteBatch) -> Result<(), DbError> {
        let mut rocks_batch = RocksWriteBatch::default();
        for op in batch.ops() {
            match op {
                BatchOp::Put { col, key, value } => {
                    rocks_batch.put_cf(self.cf(*col)?, key, value);
                }
                BatchOp::Del { col, key } => {
                    rocks_batch.delete_cf(self.cf(*col)?, key);
                }
            }
        }
        self.db.write(rocks_batch).map_err(|e| DbError::Io(e.to_string()))
    }

    fn range(
        &self,
        col: DBCol,
        gte: &[u8],
        lte: &[u8],
        reverse: bool,
        limit: Option<usize>,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, DbError> {
        let cf = self.cf(col)?;
        let mode = if reverse { IteratorMode::From(lte, rocksdb::Direction::Reverse) } else { IteratorMode::From(gte, rocksdb::Direction::Forward) };
        let mut out = Vec::new();
        for item in self.db.iterator_cf(cf, mode) {
            let (key, value) = item.map_err(|e| DbError::Io(e.to_string()))?;
            if reverse {
                if key.as_ref() < gte {
                    break;
                }
            } else if key.as_ref() > lte {
                break;
            }
            out.push((key.to_vec(), value.to_vec()));
            if let Some(limit) = limit {
                if out.len() >= limit {
                    break;
                }
            }
        }
        Ok(out)
    }

    fn clear(&self, col: DBCol, gte: &[u8], lt: &[u8]) -> Result<(), DbError> {
        let cf = self.cf(col)?;
        let mut batch = RocksWriteBatch::default();
        for item in self.db.iterator_cf(cf, IteratorMode::From(gte, rocksdb::Direction::Forward)) {
            let (key, _) = item.map_err(|e| DbError::Io(e.to_string()))?;
            if key.as_ref() >= lt {
                break;
            }
            batch.delete_cf(cf, &key);
        }
        self.db.write(batch).map_err(|e| DbError::Io(e.to_string()))
    }
}
