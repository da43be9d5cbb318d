use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::address::{Address, Bytes};

#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct AccountKeys {
    pub number_of_signatures: u32,
    pub mandatory_keys: Vec<Bytes>,
    pub optional_keys: Vec<Bytes>,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Vote {
    pub delegate_address: Address,
    pub amount: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Unlocking {
    pub delegate_address: Address,
    pub amount: u64,
    pub unvote_height: u32,
}

/// DPoS-specific sub-object of `Account.asset` (spec §3). Zero-valued by
/// default for accounts that have never registered as a delegate or voted.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct DposAccountAsset {
    pub username: Option<String>,
    pub pom_heights: Vec<u32>,
    pub consecutive_missed_blocks: u32,
    pub last_forged_height: u32,
    pub is_banned: bool,
    pub total_votes_received: u64,
    pub sent_votes: Vec<Vote>,
    pub unlocking: Vec<Unlocking>,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
    pub balance: u64,
    pub nonce: u64,
    pub keys: AccountKeys,
    pub asset: DposAccountAsset,
}

impl Account {
    pub fn new(address: Address) -> Self {
        Account {
            address,
            balance: 0,
            nonce: 0,
            keys: AccountKeys::default(),
            asset: DposAccountAsset::default(),
        }
    }
}
