pub mod codable;
pub mod diff;
pub mod error;
pub mod store;

pub use diff::{DiffEntry, DiffKey, StateDiff};
pub use error::StateStoreError;
pub use store::StateStore;
