pub mod account;
pub mod address;
pub mod block;
pub mod codable;
pub mod hash;
pub mod transaction;

pub use lisk_codec::{Codable, CodecError};

pub use account::{Account, AccountKeys, DposAccountAsset, Unlocking, Vote};
pub use address::{Address, Bytes};
pub use block::{Block, BlockAsset, BlockHeader, BlockId};
pub use hash::Hash32;
pub use transaction::{Transaction, TransactionId};
