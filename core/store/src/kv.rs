use crate::columns::DBCol;
use crate::error::DbError;

#[derive(Debug, Clone)]
pub enum BatchOp {
    Put { col: DBCol, key: Vec<u8>, value: Vec<u8> },
    Del { col: DBCol, key: Vec<u8> },
}

/// An append-only queue of puts and dels. `KvStore::write` applies the whole
/// queue atomically — readers never observe a partially-applied batch.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        WriteBatch::default()
    }

    pub fn put(&mut self, col: DBCol, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Put { col, key: key.into(), value: value.into() });
    }

    pub fn del(&mut self, col: DBCol, key: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Del { col, key: key.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }
}

/// Ordered key/value store with prefix scans and atomic write batches
/// (spec §4.2). One column family per storage domain (see [`DBCol`]).
pub trait KvStore: Send + Sync {
    fn get(&self, col: DBCol, key: &[u8]) -> Result<Option<Vec<u8>>, DbError>;

    fn exists(&self, col: DBCol, key: &[u8]) -> Result<bool, DbError> {
        Ok(self.get(col, key)?.is_some())
    }

    fn put(&self, col: DBCol, key: &[u8], value: &[u8]) -> Result<(), DbError> {
        let mut batch = WriteBatch::new();
        batch.put(col, key.to_vec(), value.to_vec());
        self.write(batch)
    }

    fn del(&self, col: DBCol, key: &[u8]) -> Result<(), DbError> {
        let mut batch = WriteBatch::new();
        batch.del(col, key.to_vec());
        self.write(batch)
    }

    fn write(&self, batch: WriteBatch) -> Result<(), DbError>;

    /// Ascending or descending scan over `[gte, lte]`, inclusive both ends.
    fn range(
        &self,
        col: DBCol,
        gte: &[u8],
        lte: &[u8],
        reverse: bool,
        limit: Option<usize>,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, DbError>;

    /// Deletes every key in `[gte, lt)` — half-open, matching `Vec::drain`-style ranges.
    fn clear(&self, col: DBCol, gte: &[u8], lt: &[u8]) -> Result<(), DbError>;
}
