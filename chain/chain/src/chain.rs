use lisk_block_store::BlockStore;
use lisk_primitives::{Block, BlockHeader, BlockId, Hash32, Transaction, TransactionId};
use lisk_state_store::{StateDiff, StateStore};
use lisk_store::KvStore;
use parking_lot::RwLock;

use crate::error::ChainError;
use crate::validate::{GeneratorEligibility, SignatureVerifier};

/// Owns the canonical tip and is the sole writer of block storage (spec
/// §3 Ownership). Cheap to query concurrently — `tip()` is a cloned snapshot
/// behind a read lock, never held across an I/O call.
pub struct Chain<'a> {
    block_store: BlockStore<'a>,
    tip: RwLock<Option<BlockHeader>>,
}

impl<'a> Chain<'a> {
    pub fn load(kv: &'a dyn KvStore) -> Result<Self, ChainError> {
        let block_store = BlockStore::new(kv);
        let tip = match block_store.tip_height()? {
            Some(height) => block_store.get_block_by_height(height)?.map(|block| block.header),
            None => None,
        };
        Ok(Chain { block_store, tip: RwLock::new(tip) })
    }

    pub fn tip(&self) -> Option<BlockHeader> {
        self.tip.read().clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.tip.read().is_some()
    }

    pub fn finalized_height(&self) -> Result<u32, ChainError> {
        Ok(self.block_store.get_finalized_height()?)
    }

    pub fn get_block_by_height(&self, height: u32) -> Result<Option<Block>, ChainError> {
        Ok(self.block_store.get_block_by_height(height)?)
    }

    pub fn get_block_by_id(&self, id: &BlockId) -> Result<Option<Block>, ChainError> {
        Ok(self.block_store.get_block_by_id(id)?)
    }

    pub fn get_transaction_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, ChainError> {
        Ok(self.block_store.get_transaction_by_id(id)?)
    }

    pub fn get_temp_block(&self, height: u32) -> Result<Option<Block>, ChainError> {
        Ok(self.block_store.get_temp_block(height)?)
    }

    /// Spec §4.6 step 2, `chain.verifyBlockHeader`: structural continuity
    /// plus the injected signature/eligibility checks, against whichever
    /// header `incoming` claims to extend. That's the tip for `VALID_BLOCK`
    /// but the tip's parent for `TIE_BREAK` (the incoming block replaces the
    /// tip, so it extends what the tip itself extended) — the caller (the
    /// processor, which already ran fork-status analysis) picks `reference`.
    /// Fork-status comparison against competing tips is `lisk_bft`'s job.
    pub fn verify_block_header(
        &self,
        header: &BlockHeader,
        reference: &BlockHeader,
        sig: &dyn SignatureVerifier,
        eligibility: &dyn GeneratorEligibility,
    ) -> Result<(), ChainError> {
        if header.height != reference.height + 1 {
            return Err(ChainError::NonSequentialHeight { incoming: header.height, tip: reference.height });
        }
        let reference_id = reference.compute_id()?;
        if header.previous_block_id != reference_id {
            return Err(ChainError::PreviousBlockIdMismatch);
        }
        if header.timestamp <= reference.timestamp {
            return Err(ChainError::NonMonotonicTimestamp { incoming: header.timestamp, tip: reference.timestamp });
        }
        if !sig.verify(header) {
            return Err(ChainError::InvalidSignature);
        }
        if !eligibility.is_eligible(&header.generator_address, header.height, header.timestamp) {
            return Err(ChainError::IneligibleGenerator);
        }
        Ok(())
    }

    /// Convenience for the common case: verify against the current tip.
    pub fn verify_block_header_against_tip(
        &self,
        header: &BlockHeader,
        sig: &dyn SignatureVerifier,
        eligibility: &dyn GeneratorEligibility,
    ) -> Result<(), ChainError> {
        let tip = self.tip().ok_or(ChainError::NoTip)?;
        self.verify_block_header(header, &tip, sig, eligibility)
    }

    pub fn verify_state_root(&self, header: &BlockHeader, computed: &Hash32) -> Result<(), ChainError> {
        if &header.state_root != computed {
            return Err(ChainError::StateRootMismatch);
        }
        Ok(())
    }

    pub fn save_block(
        &self,
        block: &Block,
        state_store: StateStore<'_>,
        finalized_height: u32,
        remove_from_temp: bool,
    ) -> Result<StateDiff, ChainError> {
        let diff = self.block_store.save_block(block, state_store, finalized_height, remove_from_temp)?;
        *self.tip.write() = Some(block.header.clone());
        tracing::debug!(height = block.header.height, "chain tip advanced");
        Ok(diff)
    }

    /// `new_tip` is the header the caller is rolling back *to* — the chain
    /// doesn't infer it since that requires walking `previous_block_id`,
    /// which the caller (the processor, mid tie-break or deleteLastBlock)
    /// already did to fetch the block it's about to re-apply or expose.
    pub fn delete_block(
        &self,
        block: &Block,
        state_store: StateStore<'_>,
        finalized_height: u32,
        save_temp_block: bool,
        new_tip: BlockHeader,
    ) -> Result<(), ChainError> {
        self.block_store.delete_block(block, state_store, finalized_height, save_temp_block)?;
        tracing::debug!(height = block.header.height, "chain tip rolled back");
        *self.tip.write() = Some(new_tip);
        Ok(())
    }
}
