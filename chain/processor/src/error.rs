use lisk_bft::BftError;
use lisk_chain::ChainError;
use lisk_primitives::{CodecError, TransactionId};
use lisk_state_store::StateStoreError;
use thiserror::Error;

/// Spec §7's error kinds, made concrete. Kept as one enum (rather than one
/// per component) since the processor is where they all actually surface to
/// a caller.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    StateStore(#[from] StateStoreError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Bft(#[from] BftError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("block failed consensus validation, issue peer penalty 100")]
    ApplyPenalty,
    #[error("transaction {tx_id} failed to apply: {cause}")]
    TransactionApply { tx_id: TransactionId, cause: String },
    #[error("not found")]
    NotFound,
    #[error("module id {0} is already registered")]
    DuplicateModule(u32),
    #[error("unknown reducer '{0}'")]
    UnknownReducer(String),
    #[error("cannot delete the genesis block")]
    CannotDeleteGenesis,
    #[error("processor is shutting down")]
    ShuttingDown,
}
