use std::collections::HashMap;

use lisk_primitives::{Block, Transaction};
use lisk_state_store::StateStore;

use crate::error::ProcessorError;
use crate::module::{Module, TransactionAsset};

/// Holds registered modules and runs their hook pipelines in registration
/// order (spec §4.7). Registration happens once at startup (`node` wires
/// every module before the processor accepts blocks); there is no
/// unregister — static registration time, per the Design Notes.
#[derive(Default)]
pub struct ModuleRegistry {
    order: Vec<u32>,
    by_id: HashMap<u32, Module>,
    name_to_id: HashMap<String, u32>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        ModuleRegistry::default()
    }

    pub fn register(&mut self, module: Module) -> Result<(), ProcessorError> {
        if self.by_id.contains_key(&module.id) || self.name_to_id.contains_key(&module.name) {
            return Err(ProcessorError::DuplicateModule(module.id));
        }
        self.order.push(module.id);
        self.name_to_id.insert(module.name.clone(), module.id);
        self.by_id.insert(module.id, module);
        Ok(())
    }

    pub fn by_id(&self, id: u32) -> Option<&Module> {
        self.by_id.get(&id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Module> {
        self.name_to_id.get(name).and_then(|id| self.by_id.get(id))
    }

    pub fn find_asset(&self, module_id: u32, asset_id: u32) -> Option<(&Module, &TransactionAsset)> {
        let module = self.by_id(module_id)?;
        let asset = module.find_asset(asset_id)?;
        Some((module, asset))
    }

    fn ordered_modules(&self) -> impl Iterator<Item = &Module> {
        self.order.iter().map(move |id| &self.by_id[id])
    }

    pub fn run_after_genesis_block_apply(&self, block: &Block, state_store: &mut StateStore<'_>) -> Result<(), ProcessorError> {
        for module in self.ordered_modules() {
            for hook in &module.hooks.after_genesis_block_apply {
                hook(block, state_store)?;
            }
        }
        Ok(())
    }

    pub fn run_before_block_apply(&self, block: &Block, state_store: &mut StateStore<'_>) -> Result<(), ProcessorError> {
        for module in self.ordered_modules() {
            for hook in &module.hooks.before_block_apply {
                hook(block, state_store)?;
            }
        }
        Ok(())
    }

    pub fn run_after_block_apply(&self, block: &Block, state_store: &mut StateStore<'_>) -> Result<(), ProcessorError> {
        for module in self.ordered_modules() {
            for hook in &module.hooks.after_block_apply {
                hook(block, state_store)?;
            }
        }
        Ok(())
    }

    pub fn run_before_transaction_apply(&self, tx: &Transaction, state_store: &mut StateStore<'_>) -> Result<(), ProcessorError> {
        for module in self.ordered_modules() {
            for hook in &module.hooks.before_transaction_apply {
                hook(tx, state_store)?;
            }
        }
        Ok(())
    }

    pub fn run_after_transaction_apply(&self, tx: &Transaction, state_store: &mut StateStore<'_>) -> Result<(), ProcessorError> {
        for module in self.ordered_modules() {
            for hook in &module.hooks.after_transaction_apply {
                hook(tx, state_store)?;
            }
        }
        Ok(())
    }
}
