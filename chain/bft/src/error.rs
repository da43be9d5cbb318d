use lisk_primitives::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BftError {
    #[error(transparent)]
    Codec(#[from] CodecError),
}
