use lisk_primitives::{Account, Address, Hash32, Transaction, Unlocking, Vote};
use lisk_processor::{Module, ModuleBuilder, ProcessorError, TransactionAsset};
use lisk_state_store::StateStore;
use serde_json::{json, Value};

use crate::error::DposError;
use crate::payload::{
    self, RegisterDelegateAsset, UnlockAsset, VoteDelegateAsset, ASSET_REGISTER_DELEGATE, ASSET_UNLOCK, ASSET_VOTE_DELEGATE,
    MAX_UNLOCKING_ENTRIES, MAX_VOTES_PER_TRANSACTION, MIN_DELEGATE_REGISTRATION_BALANCE, MODULE_ID, NUMBER_ACTIVE_DELEGATES,
    UNLOCK_WAIT_HEIGHT,
};

fn boxed(err: DposError) -> ProcessorError {
    ProcessorError::Validation(err.to_string())
}

/// Lisk addresses are the leading 20 bytes of `sha256(publicKey)`.
fn sender_address(tx: &Transaction) -> Address {
    let digest = Hash32::of(tx.sender_public_key.as_slice());
    Address(digest.as_bytes()[..20].to_vec())
}

fn username_key(username: &str) -> Vec<u8> {
    format!("dpos:username:{username}").into_bytes()
}

fn require_account(state_store: &mut StateStore<'_>, address: &Address) -> Result<Account, ProcessorError> {
    state_store.get_account(address)?.ok_or_else(|| boxed(DposError::AccountNotFound(address.clone())))
}

fn validate_register_delegate(tx: &Transaction) -> Result<(), ProcessorError> {
    let asset: RegisterDelegateAsset = payload::decode(&tx.asset).map_err(boxed)?;
    if !payload::is_valid_username(&asset.username) {
        return Err(boxed(DposError::InvalidUsername));
    }
    Ok(())
}

fn apply_register_delegate(
    tx: &Transaction,
    state_store: &mut StateStore<'_>,
    _reducers: &lisk_processor::ReducerHandler<'_>,
    _height: u32,
) -> Result<(), ProcessorError> {
    let asset: RegisterDelegateAsset = payload::decode(&tx.asset).map_err(boxed)?;
    let address = sender_address(tx);
    let mut account = require_account(state_store, &address)?;

    if account.asset.username.is_some() {
        return Err(boxed(DposError::AlreadyRegistered));
    }
    if account.balance < MIN_DELEGATE_REGISTRATION_BALANCE {
        return Err(boxed(DposError::InsufficientBalance));
    }
    if state_store.get_chain_state(&username_key(&asset.username))?.is_some() {
        return Err(boxed(DposError::UsernameTaken(asset.username)));
    }

    state_store.set_chain_state(&username_key(&asset.username), address.0.clone())?;
    account.asset.username = Some(asset.username);
    state_store.set_account(&account)?;
    tracing::debug!(address = %address, "delegate registered");
    Ok(())
}

fn validate_vote_delegate(tx: &Transaction) -> Result<(), ProcessorError> {
    let asset: VoteDelegateAsset = payload::decode(&tx.asset).map_err(boxed)?;
    if asset.votes.is_empty() || asset.votes.len() > MAX_VOTES_PER_TRANSACTION {
        return Err(boxed(DposError::TooManyVotes(MAX_VOTES_PER_TRANSACTION)));
    }
    if asset.votes.iter().any(|v| v.amount == 0) {
        return Err(ProcessorError::Validation("vote amount must be non-zero".to_string()));
    }
    Ok(())
}

fn apply_vote_delegate(
    tx: &Transaction,
    state_store: &mut StateStore<'_>,
    _reducers: &lisk_processor::ReducerHandler<'_>,
    height: u32,
) -> Result<(), ProcessorError> {
    let asset: VoteDelegateAsset = payload::decode(&tx.asset).map_err(boxed)?;
    let voter_address = sender_address(tx);
    let mut voter = require_account(state_store, &voter_address)?;

    for vote in asset.votes {
        if vote.amount > 0 {
            let increase = vote.amount as u64;
            let mut delegate = require_account(state_store, &vote.delegate_address)?;
            if delegate.asset.username.is_none() {
                return Err(boxed(DposError::NotADelegate(vote.delegate_address)));
            }
            voter.balance = voter.balance.checked_sub(increase).ok_or_else(|| boxed(DposError::InsufficientBalance))?;
            match voter.asset.sent_votes.iter_mut().find(|v| v.delegate_address == vote.delegate_address) {
                Some(existing) => existing.amount += increase,
                None => voter.asset.sent_votes.push(Vote { delegate_address: vote.delegate_address.clone(), amount: increase }),
            }
            delegate.asset.total_votes_received += increase;
            state_store.set_account(&delegate)?;
        } else {
            let decrease = vote.amount.unsigned_abs();
            let position = voter
                .asset
                .sent_votes
                .iter()
                .position(|v| v.delegate_address == vote.delegate_address)
                .ok_or_else(|| boxed(DposError::NoSuchVote))?;
            if voter.asset.sent_votes[position].amount < decrease {
                return Err(boxed(DposError::NoSuchVote));
            }
            voter.asset.sent_votes[position].amount -= decrease;
            if voter.asset.sent_votes[position].amount == 0 {
                voter.asset.sent_votes.remove(position);
            }
            if voter.asset.unlocking.len() >= MAX_UNLOCKING_ENTRIES {
                return Err(boxed(DposError::TooManyUnlockingEntries(MAX_UNLOCKING_ENTRIES)));
            }
            voter.asset.unlocking.push(Unlocking { delegate_address: vote.delegate_address.clone(), amount: decrease, unvote_height: height });

            let mut delegate = require_account(state_store, &vote.delegate_address)?;
            delegate.asset.total_votes_received = delegate.asset.total_votes_received.saturating_sub(decrease);
            state_store.set_account(&delegate)?;
        }
    }

    state_store.set_account(&voter)?;
    Ok(())
}

fn apply_unlock(
    tx: &Transaction,
    state_store: &mut StateStore<'_>,
    _reducers: &lisk_processor::ReducerHandler<'_>,
    height: u32,
) -> Result<(), ProcessorError> {
    let _asset: UnlockAsset = payload::decode(&tx.asset).map_err(boxed)?;
    let address = sender_address(tx);
    let mut account = require_account(state_store, &address)?;

    let (matured, pending): (Vec<_>, Vec<_>) =
        account.asset.unlocking.into_iter().partition(|entry| entry.unvote_height.saturating_add(UNLOCK_WAIT_HEIGHT) <= height);
    if matured.is_empty() {
        return Err(boxed(DposError::NothingToUnlock));
    }
    let reclaimed: u64 = matured.iter().map(|entry| entry.amount).sum();
    account.asset.unlocking = pending;
    account.balance += reclaimed;
    state_store.set_account(&account)?;
    tracing::debug!(address = %address, reclaimed, "unlocked matured votes");
    Ok(())
}

/// `params: {"address": "<hex>"}`, returns the delegate's `totalVotesReceived`.
fn reduce_total_votes_received(params: Value, state_store: &mut StateStore<'_>) -> Result<Value, ProcessorError> {
    let address_hex = params.get("address").and_then(Value::as_str).ok_or_else(|| ProcessorError::Validation("missing 'address'".to_string()))?;
    let address = Address::from_hex(address_hex).map_err(|e| ProcessorError::Validation(e.to_string()))?;
    let account = state_store.get_account(&address)?;
    Ok(json!(account.map(|a| a.asset.total_votes_received).unwrap_or(0)))
}

/// The active validator set: registered delegates ranked by
/// `totalVotesReceived`, capped at [`NUMBER_ACTIVE_DELEGATES`].
fn reduce_validators(_params: Value, state_store: &mut StateStore<'_>) -> Result<Value, ProcessorError> {
    let mut delegates: Vec<Account> = state_store.scan_accounts()?.into_iter().filter(|a| a.asset.username.is_some()).collect();
    delegates.sort_by(|a, b| b.asset.total_votes_received.cmp(&a.asset.total_votes_received));
    delegates.truncate(NUMBER_ACTIVE_DELEGATES);
    Ok(json!(delegates
        .into_iter()
        .map(|a| json!({
            "address": a.address.to_hex(),
            "username": a.asset.username,
            "totalVotesReceived": a.asset.total_votes_received,
        }))
        .collect::<Vec<_>>()))
}

pub fn build() -> Module {
    Module::builder(MODULE_ID, "dpos")
        .asset(TransactionAsset {
            id: ASSET_REGISTER_DELEGATE,
            validate: Some(Box::new(validate_register_delegate)),
            apply: Box::new(apply_register_delegate),
        })
        .asset(TransactionAsset {
            id: ASSET_VOTE_DELEGATE,
            validate: Some(Box::new(validate_vote_delegate)),
            apply: Box::new(apply_vote_delegate),
        })
        .asset(TransactionAsset { id: ASSET_UNLOCK, validate: None, apply: Box::new(apply_unlock) })
        .reducer("totalVotesReceived", Box::new(reduce_total_votes_received))
        .reducer("validators", Box::new(reduce_validators))
        .build()
}

#[cfg(test)]
mod tests {
    use borsh::BorshSerialize;
    use lisk_primitives::Bytes;
    use lisk_processor::{ModuleRegistry, ReducerHandler};
    use lisk_store::MemoryStore;

    use super::*;
    use crate::payload::VoteEntry;

    fn tx(asset_id: u32, public_key: Vec<u8>, asset: Vec<u8>) -> Transaction {
        Transaction { module_id: MODULE_ID, asset_id, nonce: 1, fee: 0, sender_public_key: Bytes(public_key), signatures: vec![], asset }
    }

    fn seeded_account(state_store: &mut StateStore<'_>, public_key: &[u8], balance: u64) -> Address {
        let address = sender_address(&tx(0, public_key.to_vec(), vec![]));
        let mut account = Account::new(address.clone());
        account.balance = balance;
        state_store.set_account(&account).unwrap();
        address
    }

    #[test]
    fn register_delegate_sets_username_and_reserves_it() {
        let kv = MemoryStore::new();
        let mut state_store = StateStore::new(&kv);
        let registry = ModuleRegistry::new();
        let reducers = ReducerHandler::new(&registry);
        let pk = vec![1u8; 32];
        seeded_account(&mut state_store, &pk, MIN_DELEGATE_REGISTRATION_BALANCE);

        let asset = borsh::to_vec(&RegisterDelegateAsset { username: "alice".to_string() }).unwrap();
        let transaction = tx(ASSET_REGISTER_DELEGATE, pk.clone(), asset);
        apply_register_delegate(&transaction, &mut state_store, &reducers, 10).unwrap();

        let address = sender_address(&transaction);
        let account = state_store.get_account(&address).unwrap().unwrap();
        assert_eq!(account.asset.username.as_deref(), Some("alice"));
        assert!(state_store.get_chain_state(&username_key("alice")).unwrap().is_some());
    }

    #[test]
    fn register_delegate_rejects_insufficient_balance() {
        let kv = MemoryStore::new();
        let mut state_store = StateStore::new(&kv);
        let registry = ModuleRegistry::new();
        let reducers = ReducerHandler::new(&registry);
        let pk = vec![2u8; 32];
        seeded_account(&mut state_store, &pk, 10);

        let asset = borsh::to_vec(&RegisterDelegateAsset { username: "bob".to_string() }).unwrap();
        let transaction = tx(ASSET_REGISTER_DELEGATE, pk, asset);
        assert!(apply_register_delegate(&transaction, &mut state_store, &reducers, 10).is_err());
    }

    #[test]
    fn register_delegate_rejects_duplicate_username() {
        let kv = MemoryStore::new();
        let mut state_store = StateStore::new(&kv);
        let registry = ModuleRegistry::new();
        let reducers = ReducerHandler::new(&registry);
        let pk_a = vec![3u8; 32];
        let pk_b = vec![4u8; 32];
        seeded_account(&mut state_store, &pk_a, MIN_DELEGATE_REGISTRATION_BALANCE);
        seeded_account(&mut state_store, &pk_b, MIN_DELEGATE_REGISTRATION_BALANCE);

        let asset_a = borsh::to_vec(&RegisterDelegateAsset { username: "same".to_string() }).unwrap();
        apply_register_delegate(&tx(ASSET_REGISTER_DELEGATE, pk_a, asset_a), &mut state_store, &reducers, 10).unwrap();

        let asset_b = borsh::to_vec(&RegisterDelegateAsset { username: "same".to_string() }).unwrap();
        assert!(apply_register_delegate(&tx(ASSET_REGISTER_DELEGATE, pk_b, asset_b), &mut state_store, &reducers, 10).is_err());
    }

    #[test]
    fn vote_then_unvote_schedules_an_unlock_that_matures() {
        let kv = MemoryStore::new();
        let mut state_store = StateStore::new(&kv);
        let registry = ModuleRegistry::new();
        let reducers = ReducerHandler::new(&registry);

        let delegate_pk = vec![5u8; 32];
        let delegate_address = seeded_account(&mut state_store, &delegate_pk, MIN_DELEGATE_REGISTRATION_BALANCE);
        let register = borsh::to_vec(&RegisterDelegateAsset { username: "delegate".to_string() }).unwrap();
        apply_register_delegate(&tx(ASSET_REGISTER_DELEGATE, delegate_pk, register), &mut state_store, &reducers, 10).unwrap();

        let voter_pk = vec![6u8; 32];
        seeded_account(&mut state_store, &voter_pk, 5_000_000_000);

        let vote_asset =
            borsh::to_vec(&VoteDelegateAsset { votes: vec![VoteEntry { delegate_address: delegate_address.clone(), amount: 1_000_000_000 }] })
                .unwrap();
        apply_vote_delegate(&tx(ASSET_VOTE_DELEGATE, voter_pk.clone(), vote_asset), &mut state_store, &reducers, 100).unwrap();

        let voter_address = sender_address(&tx(0, voter_pk.clone(), vec![]));
        let voter = state_store.get_account(&voter_address).unwrap().unwrap();
        assert_eq!(voter.balance, 4_000_000_000);
        assert_eq!(voter.asset.sent_votes.len(), 1);

        let unvote_asset = borsh::to_vec(&VoteDelegateAsset { votes: vec![VoteEntry { delegate_address, amount: -1_000_000_000 }] }).unwrap();
        apply_vote_delegate(&tx(ASSET_VOTE_DELEGATE, voter_pk.clone(), unvote_asset), &mut state_store, &reducers, 100).unwrap();

        let voter = state_store.get_account(&voter_address).unwrap().unwrap();
        assert!(voter.asset.sent_votes.is_empty());
        assert_eq!(voter.asset.unlocking.len(), 1);
        assert_eq!(voter.balance, 4_000_000_000);

        let too_early = apply_unlock(&tx(ASSET_UNLOCK, voter_pk.clone(), vec![]), &mut state_store, &reducers, 100 + UNLOCK_WAIT_HEIGHT - 1);
        assert!(too_early.is_err());

        apply_unlock(&tx(ASSET_UNLOCK, voter_pk, vec![]), &mut state_store, &reducers, 100 + UNLOCK_WAIT_HEIGHT).unwrap();
        let voter = state_store.get_account(&voter_address).unwrap().unwrap();
        assert!(voter.asset.unlocking.is_empty());
        assert_eq!(voter.balance, 5_000_000_000);
    }

    #[test]
    fn vote_delegate_rejects_voting_for_a_non_delegate() {
        let kv = MemoryStore::new();
        let mut state_store = StateStore::new(&kv);
        let registry = ModuleRegistry::new();
        let reducers = ReducerHandler::new(&registry);
        let voter_pk = vec![7u8; 32];
        seeded_account(&mut state_store, &voter_pk, 5_000_000_000);
        let not_a_delegate = Address(vec![99; 20]);

        let vote_asset = borsh::to_vec(&VoteDelegateAsset { votes: vec![VoteEntry { delegate_address: not_a_delegate, amount: 1 }] }).unwrap();
        assert!(apply_vote_delegate(&tx(ASSET_VOTE_DELEGATE, voter_pk, vote_asset), &mut state_store, &reducers, 10).is_err());
    }

    #[test]
    fn validators_ranks_delegates_by_total_votes_received_and_excludes_non_delegates() {
        use lisk_store::{KvStore, WriteBatch};

        let kv = MemoryStore::new();
        let mut state_store = StateStore::new(&kv);

        let mut plain = Account::new(Address(vec![1; 20]));
        plain.asset.username = None;
        state_store.set_account(&plain).unwrap();

        let mut low = Account::new(Address(vec![2; 20]));
        low.asset.username = Some("low".to_string());
        low.asset.total_votes_received = 10;
        state_store.set_account(&low).unwrap();

        let mut high = Account::new(Address(vec![3; 20]));
        high.asset.username = Some("high".to_string());
        high.asset.total_votes_received = 100;
        state_store.set_account(&high).unwrap();

        let mut batch = WriteBatch::new();
        state_store.finalize(&mut batch);
        kv.write(batch).unwrap();

        let mut query = StateStore::new(&kv);
        let result = reduce_validators(Value::Null, &mut query).unwrap();
        let names: Vec<&str> = result.as_array().unwrap().iter().map(|v| v["username"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["high", "low"]);
    }
}
