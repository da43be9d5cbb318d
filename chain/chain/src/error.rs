use lisk_block_store::BlockStoreError;
use lisk_primitives::CodecError;
use lisk_state_store::StateStoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error(transparent)]
    BlockStore(#[from] BlockStoreError),
    #[error(transparent)]
    StateStore(#[from] StateStoreError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("header height {incoming} does not extend tip at height {tip}")]
    NonSequentialHeight { incoming: u32, tip: u32 },
    #[error("header previous block id does not match tip")]
    PreviousBlockIdMismatch,
    #[error("header timestamp {incoming} does not advance past tip timestamp {tip}")]
    NonMonotonicTimestamp { incoming: u32, tip: u32 },
    #[error("block signature verification failed")]
    InvalidSignature,
    #[error("generator is not eligible to forge at this height/slot")]
    IneligibleGenerator,
    #[error("declared state root does not match the computed state root")]
    StateRootMismatch,
    #[error("chain has no tip yet; genesis must be applied first")]
    NoTip,
}
