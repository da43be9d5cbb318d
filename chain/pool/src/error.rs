use lisk_primitives::{CodecError, TransactionId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("transaction {0} is already in the pool")]
    Duplicate(TransactionId),
}
