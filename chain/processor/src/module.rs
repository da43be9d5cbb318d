use std::collections::HashMap;

use lisk_primitives::{Block, Transaction};
use lisk_state_store::StateStore;
use serde_json::Value;

use crate::error::ProcessorError;
use crate::reducer::ReducerHandler;

pub type ValidateFn = Box<dyn Fn(&Transaction) -> Result<(), ProcessorError> + Send + Sync>;
/// `height` is the block the transaction is being applied as part of — the
/// DPoS module needs it to schedule and mature unlocks.
pub type ApplyFn = Box<dyn Fn(&Transaction, &mut StateStore<'_>, &ReducerHandler<'_>, u32) -> Result<(), ProcessorError> + Send + Sync>;
pub type ReducerFn = Box<dyn Fn(Value, &mut StateStore<'_>) -> Result<Value, ProcessorError> + Send + Sync>;
pub type GenesisHook = Box<dyn Fn(&Block, &mut StateStore<'_>) -> Result<(), ProcessorError> + Send + Sync>;
pub type BlockHook = Box<dyn Fn(&Block, &mut StateStore<'_>) -> Result<(), ProcessorError> + Send + Sync>;
pub type TransactionHook = Box<dyn Fn(&Transaction, &mut StateStore<'_>) -> Result<(), ProcessorError> + Send + Sync>;

/// A module is a plain bundle of function handles — no trait-object
/// hierarchy, composition over inheritance (spec §9 Design Notes).
#[derive(Default)]
pub struct Hooks {
    pub after_genesis_block_apply: Vec<GenesisHook>,
    pub before_block_apply: Vec<BlockHook>,
    pub after_block_apply: Vec<BlockHook>,
    pub before_transaction_apply: Vec<TransactionHook>,
    pub after_transaction_apply: Vec<TransactionHook>,
}

pub struct TransactionAsset {
    pub id: u32,
    pub validate: Option<ValidateFn>,
    pub apply: ApplyFn,
}

#[derive(Default)]
pub struct ModuleBuilder {
    id: u32,
    name: String,
    transaction_assets: Vec<TransactionAsset>,
    reducers: HashMap<String, ReducerFn>,
    hooks: Hooks,
}

pub struct Module {
    pub id: u32,
    pub name: String,
    pub transaction_assets: Vec<TransactionAsset>,
    pub reducers: HashMap<String, ReducerFn>,
    pub hooks: Hooks,
}

impl Module {
    pub fn builder(id: u32, name: impl Into<String>) -> ModuleBuilder {
        ModuleBuilder { id, name: name.into(), ..Default::default() }
    }

    pub fn find_asset(&self, asset_id: u32) -> Option<&TransactionAsset> {
        self.transaction_assets.iter().find(|asset| asset.id == asset_id)
    }
}

impl ModuleBuilder {
    pub fn asset(mut self, asset: TransactionAsset) -> Self {
        self.transaction_assets.push(asset);
        self
    }

    pub fn reducer(mut self, name: impl Into<String>, reducer: ReducerFn) -> Self {
        self.reducers.insert(name.into(), reducer);
        self
    }

    pub fn after_genesis_block_apply(mut self, hook: GenesisHook) -> Self {
        self.hooks.after_genesis_block_apply.push(hook);
        self
    }

    pub fn before_block_apply(mut self, hook: BlockHook) -> Self {
        self.hooks.before_block_apply.push(hook);
        self
    }

    pub fn after_block_apply(mut self, hook: BlockHook) -> Self {
        self.hooks.after_block_apply.push(hook);
        self
    }

    pub fn before_transaction_apply(mut self, hook: TransactionHook) -> Self {
        self.hooks.before_transaction_apply.push(hook);
        self
    }

    pub fn after_transaction_apply(mut self, hook: TransactionHook) -> Self {
        self.hooks.after_transaction_apply.push(hook);
        self
    }

    pub fn build(self) -> Module {
        Module { id: self.id, name: self.name, transaction_assets: self.transaction_assets, reducers: self.reducers, hooks: self.hooks }
    }
}
