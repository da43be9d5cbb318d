use lisk_codec::CodecError;
use lisk_state_store::StateStoreError;
use lisk_store::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlockStoreError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    StateStore(#[from] StateStoreError),
    #[error("block at height {0} is at or below the finalized height and cannot be deleted")]
    BelowFinalizedHeight(u32),
    #[error("not found")]
    NotFound,
}
