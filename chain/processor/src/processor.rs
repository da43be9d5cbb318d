use std::sync::Arc;

use lisk_bft::{compute_fork_status, FinalityTracker, ForkStatus};
use lisk_bus::Bus;
use lisk_chain::{Chain, GeneratorEligibility, SignatureVerifier};
use lisk_pool::TransactionPool;
use lisk_primitives::{Block, BlockHeader, Codable, Transaction};
use lisk_state_store::StateStore;
use lisk_store::KvStore;
use parking_lot::{Mutex, RwLock};
use serde_json::json;

use crate::error::ProcessorError;
use crate::module::Module;
use crate::queue::JobQueue;
use crate::reducer::ReducerHandler;
use crate::registry::ModuleRegistry;

/// Options for [`Processor::process`].
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    pub peer_id: Option<String>,
}

/// Options for [`Processor::process_validated`].
#[derive(Debug, Clone, Default)]
pub struct ProcessValidatedOptions {
    pub remove_from_temp_table: bool,
}

/// Options for [`Processor::delete_last_block`].
#[derive(Debug, Clone, Default)]
pub struct DeleteOptions {
    pub save_temp_block: bool,
}

/// The block-and-transaction entry point (spec §4.6). Owns nothing that
/// `lisk_chain::Chain` doesn't already own — this is the orchestration layer
/// that sequences validation, hooks, module dispatch and persistence, with
/// every mutating call funneled through `queue` so at most one transition
/// runs at a time.
pub struct Processor<'a> {
    kv: &'a dyn KvStore,
    chain: Chain<'a>,
    registry: RwLock<ModuleRegistry>,
    finality: Mutex<FinalityTracker>,
    queue: JobQueue,
    bus: Arc<Bus>,
    pool: Arc<TransactionPool>,
    sig: Box<dyn SignatureVerifier>,
    eligibility: Box<dyn GeneratorEligibility>,
}

impl<'a> Processor<'a> {
    pub fn new(
        kv: &'a dyn KvStore,
        bus: Arc<Bus>,
        pool: Arc<TransactionPool>,
        confirmation_depth: u32,
        sig: Box<dyn SignatureVerifier>,
        eligibility: Box<dyn GeneratorEligibility>,
    ) -> Result<Self, ProcessorError> {
        let chain = Chain::load(kv)?;
        let finalized_height = chain.finalized_height()?;
        Ok(Processor {
            kv,
            chain,
            registry: RwLock::new(ModuleRegistry::new()),
            finality: Mutex::new(FinalityTracker::with_finalized_height(confirmation_depth, finalized_height)),
            queue: JobQueue::new(),
            bus,
            pool,
            sig,
            eligibility,
        })
    }

    pub fn register_module(&self, module: Module) -> Result<(), ProcessorError> {
        self.registry.write().register(module)
    }

    pub fn chain(&self) -> &Chain<'a> {
        &self.chain
    }

    pub fn pool(&self) -> &Arc<TransactionPool> {
        &self.pool
    }

    /// Idempotent: a chain that already has a tip is left untouched.
    pub async fn init(&self, genesis: &Block) -> Result<(), ProcessorError> {
        let _permit = self.queue.acquire().await?;
        if self.chain.is_initialized() {
            return Ok(());
        }
        if genesis.header.height != 0 {
            return Err(ProcessorError::Validation("genesis block must be at height 0".to_string()));
        }

        let kv = self.kv;
        let mut state_store = StateStore::new(kv);
        self.registry.read().run_after_genesis_block_apply(genesis, &mut state_store)?;
        self.chain.save_block(genesis, state_store, 0, false)?;
        tracing::debug!("genesis block applied");
        Ok(())
    }

    pub async fn process(&self, block: Block, options: ProcessOptions) -> Result<(), ProcessorError> {
        let _permit = self.queue.acquire().await?;
        let tip = self.chain.tip().ok_or(ProcessorError::Validation("chain has not been initialized".to_string()))?;
        let status = compute_fork_status(&block.header, &tip)?;

        match status {
            ForkStatus::IdenticalBlock => Ok(()),
            ForkStatus::Discard => {
                self.bus.publish("app:chain:fork", json!({"status": "discard", "peerId": options.peer_id}));
                Ok(())
            }
            ForkStatus::DoubleForging => {
                self.bus.publish("app:chain:fork", json!({"status": "doubleForging", "peerId": options.peer_id}));
                Ok(())
            }
            ForkStatus::DifferentChain => {
                self.bus.publish("app:chain:syncRequired", json!({"peerId": options.peer_id}));
                self.bus.publish("app:chain:fork", json!({"status": "differentChain", "peerId": options.peer_id}));
                Ok(())
            }
            ForkStatus::ValidBlock => {
                self.sig_and_eligibility_check(&block.header, &tip)?;
                self.apply_validated_locked(&block, &tip, true, false).await
            }
            ForkStatus::TieBreak => self.handle_tie_break(block, tip).await,
        }
    }

    /// Skips the header/fork-status checks the synchronizer has already
    /// performed itself.
    pub async fn process_validated(&self, block: Block, options: ProcessValidatedOptions) -> Result<(), ProcessorError> {
        let _permit = self.queue.acquire().await?;
        let tip = self.chain.tip().ok_or(ProcessorError::Validation("chain has not been initialized".to_string()))?;
        self.apply_validated_locked(&block, &tip, true, options.remove_from_temp_table).await
    }

    pub async fn delete_last_block(&self, options: DeleteOptions) -> Result<Block, ProcessorError> {
        let _permit = self.queue.acquire().await?;
        let tip = self.chain.tip().ok_or(ProcessorError::Validation("chain has not been initialized".to_string()))?;
        if tip.height == 0 {
            return Err(ProcessorError::CannotDeleteGenesis);
        }
        let finalized_height = self.chain.finalized_height()?;
        let tip_id = tip.compute_id()?;
        let tip_block = self.chain.get_block_by_id(&tip_id)?.ok_or(ProcessorError::NotFound)?;
        let parent = self.chain.get_block_by_id(&tip.previous_block_id)?.ok_or(ProcessorError::NotFound)?;

        let kv = self.kv;
        let state_store = StateStore::new(kv);
        self.chain.delete_block(&tip_block, state_store, finalized_height, options.save_temp_block, parent.header.clone())?;
        self.bus.publish("app:block:delete", json!({"height": tip_block.header.height}));
        Ok(tip_block)
    }

    /// Static validity only — module asset lookup and the asset's own
    /// `validate`, no state access.
    pub fn validate_transaction(&self, tx: &Transaction) -> Result<(), ProcessorError> {
        let registry = self.registry.read();
        let (_, asset) = registry
            .find_asset(tx.module_id, tx.asset_id)
            .ok_or_else(|| ProcessorError::Validation(format!("no asset registered for module {} asset {}", tx.module_id, tx.asset_id)))?;
        if let Some(validate) = &asset.validate {
            validate(tx)?;
        }
        Ok(())
    }

    /// Dry-run application against a caller-supplied overlay; never touches
    /// `self.chain`, so callers can discard the store to roll back. `height`
    /// is the height the caller intends these transactions to land at (the
    /// mempool dry-runs against the next height, not the current tip).
    pub fn verify_transactions(&self, txs: &[Transaction], state_store: &mut StateStore<'_>, height: u32) -> Result<(), ProcessorError> {
        let registry = self.registry.read();
        let reducers = ReducerHandler::new(&registry);
        for tx in txs {
            self.apply_one_transaction(&registry, &reducers, tx, state_store, height)?;
        }
        Ok(())
    }

    /// Read-only module query surface for RPC handlers (e.g. `dpos:validators`):
    /// a fresh, empty overlay over the live store, never touching `self.chain`.
    pub fn invoke_reducer(&self, name: &str, params: serde_json::Value) -> Result<serde_json::Value, ProcessorError> {
        let registry = self.registry.read();
        let reducers = ReducerHandler::new(&registry);
        let mut state_store = StateStore::new(self.kv);
        reducers.invoke(name, params, &mut state_store)
    }

    pub fn stop(&self) {
        self.queue.stop();
    }

    fn sig_and_eligibility_check(&self, header: &BlockHeader, reference: &BlockHeader) -> Result<(), ProcessorError> {
        self.chain.verify_block_header(header, reference, self.sig.as_ref(), self.eligibility.as_ref())?;
        Ok(())
    }

    async fn handle_tie_break(&self, incoming: Block, tip: BlockHeader) -> Result<(), ProcessorError> {
        let parent = self.chain.get_block_by_id(&tip.previous_block_id)?.ok_or(ProcessorError::NotFound)?;
        self.sig_and_eligibility_check(&incoming.header, &parent.header)?;

        let finalized_height = self.chain.finalized_height()?;
        let tip_id = tip.compute_id()?;
        let previous_tip_block = self.chain.get_block_by_id(&tip_id)?.ok_or(ProcessorError::NotFound)?;

        let kv = self.kv;
        let rollback_store = StateStore::new(kv);
        self.chain.delete_block(&previous_tip_block, rollback_store, finalized_height, true, parent.header.clone())?;
        self.bus.publish("app:block:delete", json!({"height": previous_tip_block.header.height}));

        match self.apply_validated_locked(&incoming, &parent.header, true, true).await {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::warn!(error = %err, "tie-break candidate failed to apply, restoring previous tip");
                let restore_store = StateStore::new(kv);
                self.chain.save_block(&previous_tip_block, restore_store, finalized_height, true)?;
                Err(err)
            }
        }
    }

    /// Spec §4.6 "`_processValidated`": steps 4-9 (header/fork checks are
    /// the caller's job, already done by the time this runs).
    async fn apply_validated_locked(
        &self,
        block: &Block,
        reference: &BlockHeader,
        broadcast: bool,
        remove_from_temp: bool,
    ) -> Result<(), ProcessorError> {
        let kv = self.kv;
        let mut state_store = StateStore::new(kv);
        let registry = self.registry.read();

        registry.run_before_block_apply(block, &mut state_store)?;

        {
            let reducers = ReducerHandler::new(&registry);
            for tx in &block.payload {
                self.apply_one_transaction(&registry, &reducers, tx, &mut state_store, block.header.height)
                    .map_err(|cause| self.wrap_transaction_error(tx, cause))?;
            }
        }

        registry.run_after_block_apply(block, &mut state_store)?;

        let computed_root = state_store.compute_root();
        self.chain.verify_state_root(&block.header, &computed_root)?;

        let finalized_height = self.finality.lock().apply_block_header(block.header.height);
        self.chain.save_block(block, state_store, finalized_height, remove_from_temp)?;

        for tx in &block.payload {
            self.pool.mark_included(self.transaction_id(tx));
        }
        if broadcast {
            self.bus.publish("app:block:new", json!({"height": block.header.height}));
        }
        Ok(())
    }

    fn apply_one_transaction(
        &self,
        registry: &ModuleRegistry,
        reducers: &ReducerHandler<'_>,
        tx: &Transaction,
        state_store: &mut StateStore<'_>,
        height: u32,
    ) -> Result<(), ProcessorError> {
        registry.run_before_transaction_apply(tx, state_store)?;
        let (_, asset) = registry
            .find_asset(tx.module_id, tx.asset_id)
            .ok_or_else(|| ProcessorError::Validation(format!("no asset registered for module {} asset {}", tx.module_id, tx.asset_id)))?;
        (asset.apply)(tx, state_store, reducers, height)?;
        registry.run_after_transaction_apply(tx, state_store)?;
        Ok(())
    }

    fn transaction_id(&self, tx: &Transaction) -> lisk_primitives::Hash32 {
        match tx.encode() {
            Ok(encoded) => Transaction::id_from_encoding(&encoded),
            Err(_) => lisk_primitives::Hash32::ZERO,
        }
    }

    fn wrap_transaction_error(&self, tx: &Transaction, cause: ProcessorError) -> ProcessorError {
        ProcessorError::TransactionApply { tx_id: self.transaction_id(tx), cause: cause.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use lisk_chain::AcceptAll;
    use lisk_pool::TransactionPool;
    use lisk_primitives::{Address, BlockAsset, Bytes, Hash32};
    use lisk_store::MemoryStore;

    use super::*;
    use crate::module::TransactionAsset;

    fn empty_root() -> Hash32 {
        Hash32::of(b"")
    }

    fn header(height: u32, timestamp: u32, generator: u8, previous: lisk_primitives::BlockId) -> BlockHeader {
        BlockHeader {
            version: 1,
            height,
            timestamp,
            previous_block_id: previous,
            generator_address: Address(vec![generator]),
            transaction_root: Hash32::ZERO,
            state_root: empty_root(),
            assets: vec![BlockAsset { module_id: 0, data: vec![] }],
            signature: Bytes(vec![9; 8]),
        }
    }

    fn genesis() -> Block {
        let mut h = header(0, 0, 0, lisk_primitives::BlockId::ZERO);
        h.state_root = Hash32::ZERO;
        Block { header: h, payload: vec![] }
    }

    fn new_processor(kv: &dyn KvStore) -> Processor<'_> {
        Processor::new(kv, Bus::new(), Arc::new(TransactionPool::new(256)), 3, Box::new(AcceptAll), Box::new(AcceptAll)).unwrap()
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let kv = MemoryStore::new();
        let processor = new_processor(&kv);
        processor.init(&genesis()).await.unwrap();
        assert_eq!(processor.chain().tip().unwrap().height, 0);
        processor.init(&genesis()).await.unwrap();
        assert_eq!(processor.chain().tip().unwrap().height, 0);
    }

    #[tokio::test]
    async fn process_applies_a_valid_block() {
        let kv = MemoryStore::new();
        let processor = new_processor(&kv);
        let genesis = genesis();
        processor.init(&genesis).await.unwrap();

        let genesis_id = genesis.header.compute_id().unwrap();
        let next = Block { header: header(1, 10, 1, genesis_id), payload: vec![] };
        processor.process(next, ProcessOptions::default()).await.unwrap();
        assert_eq!(processor.chain().tip().unwrap().height, 1);
    }

    #[tokio::test]
    async fn process_identical_block_is_a_no_op() {
        let kv = MemoryStore::new();
        let processor = new_processor(&kv);
        let genesis = genesis();
        processor.init(&genesis).await.unwrap();

        let genesis_id = genesis.header.compute_id().unwrap();
        let next = Block { header: header(1, 10, 1, genesis_id), payload: vec![] };
        processor.process(next.clone(), ProcessOptions::default()).await.unwrap();
        processor.process(next, ProcessOptions::default()).await.unwrap();
        assert_eq!(processor.chain().tip().unwrap().height, 1);
    }

    #[tokio::test]
    async fn process_discards_a_worse_competing_block_at_tip_height() {
        let kv = MemoryStore::new();
        let processor = new_processor(&kv);
        let genesis = genesis();
        processor.init(&genesis).await.unwrap();

        let genesis_id = genesis.header.compute_id().unwrap();
        let first = Block { header: header(1, 10, 1, genesis_id), payload: vec![] };
        processor.process(first, ProcessOptions::default()).await.unwrap();

        let later_competitor = Block { header: header(1, 20, 2, genesis_id), payload: vec![] };
        processor.process(later_competitor, ProcessOptions::default()).await.unwrap();
        assert_eq!(processor.chain().tip().unwrap().height, 1);
        assert_eq!(processor.chain().tip().unwrap().timestamp, 10);
    }

    #[tokio::test]
    async fn delete_last_block_restores_the_parent_tip() {
        let kv = MemoryStore::new();
        let processor = new_processor(&kv);
        let genesis = genesis();
        processor.init(&genesis).await.unwrap();

        let genesis_id = genesis.header.compute_id().unwrap();
        let next = Block { header: header(1, 10, 1, genesis_id), payload: vec![] };
        processor.process(next, ProcessOptions::default()).await.unwrap();

        let deleted = processor.delete_last_block(DeleteOptions::default()).await.unwrap();
        assert_eq!(deleted.header.height, 1);
        assert_eq!(processor.chain().tip().unwrap().height, 0);
    }

    #[tokio::test]
    async fn delete_last_block_refuses_to_delete_genesis() {
        let kv = MemoryStore::new();
        let processor = new_processor(&kv);
        processor.init(&genesis()).await.unwrap();
        assert!(matches!(processor.delete_last_block(DeleteOptions::default()).await, Err(ProcessorError::CannotDeleteGenesis)));
    }

    fn register_echo_module(processor: &Processor<'_>) {
        let asset = TransactionAsset {
            id: 1,
            validate: Some(Box::new(|tx| {
                if tx.fee == 0 {
                    Err(ProcessorError::Validation("fee must be non-zero".to_string()))
                } else {
                    Ok(())
                }
            })),
            apply: Box::new(|tx, store, _reducers, _height| {
                store.set_chain_state(b"last-nonce", tx.nonce.to_be_bytes().to_vec())?;
                Ok(())
            }),
        };
        processor.register_module(Module::builder(7, "echo").asset(asset).build()).unwrap();
    }

    fn sample_tx(fee: u64) -> Transaction {
        Transaction { module_id: 7, asset_id: 1, nonce: 1, fee, sender_public_key: Bytes(vec![1; 32]), signatures: vec![], asset: vec![] }
    }

    #[test]
    fn validate_transaction_runs_the_assets_static_check() {
        let kv = MemoryStore::new();
        let processor = new_processor(&kv);
        register_echo_module(&processor);
        assert!(processor.validate_transaction(&sample_tx(10)).is_ok());
        assert!(matches!(processor.validate_transaction(&sample_tx(0)), Err(ProcessorError::Validation(_))));
    }

    #[test]
    fn verify_transactions_applies_against_a_scratch_overlay() {
        let kv = MemoryStore::new();
        let processor = new_processor(&kv);
        register_echo_module(&processor);

        let mut scratch = StateStore::new(&kv);
        processor.verify_transactions(&[sample_tx(10)], &mut scratch, 1).unwrap();
        assert_eq!(scratch.get_chain_state(b"last-nonce").unwrap(), Some(1u64.to_be_bytes().to_vec()));
        // the dry run never touched the real store
        let mut real = StateStore::new(&kv);
        assert_eq!(real.get_chain_state(b"last-nonce").unwrap(), None);
    }

    #[tokio::test]
    async fn process_applies_a_block_carrying_transactions() {
        let kv = MemoryStore::new();
        let processor = new_processor(&kv);
        register_echo_module(&processor);
        let genesis = genesis();
        processor.init(&genesis).await.unwrap();

        let tx = sample_tx(10);
        let mut scratch = StateStore::new(&kv);
        processor.verify_transactions(std::slice::from_ref(&tx), &mut scratch, 1).unwrap();
        let expected_root = scratch.compute_root();
        drop(scratch);

        let genesis_id = genesis.header.compute_id().unwrap();
        let mut h = header(1, 10, 1, genesis_id);
        h.state_root = expected_root;
        let block = Block { header: h, payload: vec![tx] };
        processor.process(block, ProcessOptions::default()).await.unwrap();
        assert_eq!(processor.chain().tip().unwrap().height, 1);

        let mut store = StateStore::new(&kv);
        assert_eq!(store.get_chain_state(b"last-nonce").unwrap(), Some(1u64.to_be_bytes().to_vec()));
    }

    #[tokio::test]
    async fn process_marks_included_transactions_in_the_pool() {
        let kv = MemoryStore::new();
        let processor = new_processor(&kv);
        register_echo_module(&processor);
        let genesis = genesis();
        processor.init(&genesis).await.unwrap();

        let tx = sample_tx(10);
        let id = processor.pool().add(tx.clone()).unwrap();
        let mut scratch = StateStore::new(&kv);
        processor.verify_transactions(std::slice::from_ref(&tx), &mut scratch, 1).unwrap();
        let expected_root = scratch.compute_root();
        drop(scratch);

        let genesis_id = genesis.header.compute_id().unwrap();
        let mut h = header(1, 10, 1, genesis_id);
        h.state_root = expected_root;
        let block = Block { header: h, payload: vec![tx] };
        processor.process(block, ProcessOptions::default()).await.unwrap();

        assert!(!processor.pool().contains(&id));
    }

    #[tokio::test]
    async fn process_wraps_transaction_apply_failures() {
        let kv = MemoryStore::new();
        let processor = new_processor(&kv);
        let asset = TransactionAsset {
            id: 1,
            validate: None,
            apply: Box::new(|_tx, _store, _reducers, _height| Err(ProcessorError::Validation("boom".to_string()))),
        };
        processor.register_module(Module::builder(7, "echo").asset(asset).build()).unwrap();
        let genesis = genesis();
        processor.init(&genesis).await.unwrap();

        let genesis_id = genesis.header.compute_id().unwrap();
        let h = header(1, 10, 1, genesis_id);
        let block = Block { header: h, payload: vec![sample_tx(10)] };
        let err = processor.process(block, ProcessOptions::default()).await.unwrap_err();
        assert!(matches!(err, ProcessorError::TransactionApply { .. }));
        assert_eq!(processor.chain().tip().unwrap().height, 0);
    }
}
