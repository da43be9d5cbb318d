use borsh::{BorshDeserialize, BorshSerialize};
use lisk_primitives::Address;

use crate::error::DposError;

/// Module id the node registers this module under.
pub const MODULE_ID: u32 = 5;

pub const ASSET_REGISTER_DELEGATE: u32 = 0;
pub const ASSET_VOTE_DELEGATE: u32 = 1;
pub const ASSET_UNLOCK: u32 = 2;

pub const MIN_DELEGATE_REGISTRATION_BALANCE: u64 = 1_000_000_000;
pub const MAX_VOTES_PER_TRANSACTION: usize = 10;
pub const MAX_UNLOCKING_ENTRIES: usize = 20;
pub const UNLOCK_WAIT_HEIGHT: u32 = 2_000;
/// Size of the active validator set surfaced by `dpos:validators`.
pub const NUMBER_ACTIVE_DELEGATES: usize = 101;

#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct RegisterDelegateAsset {
    pub username: String,
}

/// Positive `amount` casts or increases a vote; negative unvotes (fully or
/// partially). Zero is rejected at validation time.
#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct VoteEntry {
    pub delegate_address: Address,
    pub amount: i64,
}

#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct VoteDelegateAsset {
    pub votes: Vec<VoteEntry>,
}

/// No parameters: unlocking is driven entirely by which of the sender's own
/// `unlocking` entries have matured by the current height.
#[derive(Debug, Clone, Default, BorshSerialize, BorshDeserialize)]
pub struct UnlockAsset;

pub fn decode<T: BorshDeserialize>(bytes: &[u8]) -> Result<T, DposError> {
    T::try_from_slice(bytes).map_err(|e| DposError::Decode(e.to_string()))
}

pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.len() <= 20
        && username.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-' || c == '.')
}
