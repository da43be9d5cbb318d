use lisk_primitives::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DposError {
    #[error("malformed transaction asset payload: {0}")]
    Decode(String),
    #[error("username must be 1-20 lowercase alphanumeric characters")]
    InvalidUsername,
    #[error("account {0} not found")]
    AccountNotFound(Address),
    #[error("account is already registered as a delegate")]
    AlreadyRegistered,
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),
    #[error("account {0} is not a registered delegate")]
    NotADelegate(Address),
    #[error("insufficient balance to cast this vote")]
    InsufficientBalance,
    #[error("no matching vote to unvote")]
    NoSuchVote,
    #[error("at most {0} votes per transaction")]
    TooManyVotes(usize),
    #[error("at most {0} concurrent unlocking entries per account")]
    TooManyUnlockingEntries(usize),
    #[error("no unlocking entries have matured yet")]
    NothingToUnlock,
}
