pub mod columns;
pub mod error;
pub mod kv;
pub mod memory;
pub mod rocks;

pub use columns::DBCol;
pub use error::DbError;
pub use kv::{BatchOp, KvStore, WriteBatch};
pub use memory::MemoryStore;
pub use rocks::RocksDbStore;
