use lisk_chain::ChainError;
use lisk_primitives::CodecError;
use lisk_processor::ProcessorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error("request failed schema validation: {0}")]
    InvalidRequest(String),
    #[error("peer exceeded the call rate limit for this RPC")]
    RateLimited,
}
