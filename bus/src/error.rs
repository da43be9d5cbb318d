use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("channel '{0}' is already registered")]
    DuplicateChannel(String),
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error("{0}")]
    Internal(String),
}
