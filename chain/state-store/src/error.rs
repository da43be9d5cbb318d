use lisk_codec::CodecError;
use lisk_store::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateStoreError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}
