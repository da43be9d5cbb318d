pub mod broadcaster;
pub mod error;
pub mod pool;

pub use broadcaster::{Broadcaster, DEFAULT_BROADCAST_INTERVAL, DEFAULT_RELEASE_LIMIT};
pub use error::PoolError;
pub use pool::TransactionPool;
