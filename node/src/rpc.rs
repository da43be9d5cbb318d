use std::collections::HashMap;
use std::sync::Arc;

use lisk_bus::{ActionHandler, Bus, BusError};
use lisk_pool::TransactionPool;
use lisk_primitives::{Address, Hash32, Transaction};
use lisk_processor::Processor;
use lisk_state_store::StateStore;
use lisk_store::KvStore;
use serde_json::{json, Value};

/// Registers the `"app"` channel (spec §6): the five query/submission
/// actions plus the block/transaction/fork/round events the rest of the
/// node publishes against. `processor` and `kv` must be `'static` — the
/// action closures outlive `start()`'s stack frame for as long as the node
/// runs, so the caller leaks them once at startup rather than borrowing.
pub fn register(
    bus: Arc<Bus>,
    kv: &'static dyn KvStore,
    processor: Arc<Processor<'static>>,
    pool: Arc<TransactionPool>,
) -> Result<(), BusError> {
    let mut actions: HashMap<String, ActionHandler> = HashMap::new();

    actions.insert("getAccount".to_string(), Box::new(move |params: Value| get_account(kv, params)));

    {
        let processor = processor.clone();
        actions.insert("getBlockByHeight".to_string(), Box::new(move |params: Value| get_block_by_height(&processor, params)));
    }

    {
        let processor = processor.clone();
        actions.insert("getTransactionByID".to_string(), Box::new(move |params: Value| get_transaction_by_id(&processor, params)));
    }

    {
        let processor = processor.clone();
        let pool = pool.clone();
        let bus = bus.clone();
        actions.insert("postTransaction".to_string(), Box::new(move |params: Value| post_transaction(&processor, &pool, &bus, params)));
    }

    {
        let processor = processor.clone();
        actions.insert("getValidators".to_string(), Box::new(move |_params: Value| get_validators(&processor)));
    }

    bus.register_channel("app", &["block:new", "block:delete", "chain:fork", "chain:syncRequired", "transaction:new", "round:change"], actions)
}

fn get_account(kv: &dyn KvStore, params: Value) -> Result<Value, BusError> {
    let address = address_param(&params)?;
    let mut state_store = StateStore::new(kv);
    let account = state_store.get_account(&address).map_err(|e| BusError::Internal(e.to_string()))?;
    Ok(json!(account))
}

fn get_block_by_height(processor: &Processor<'_>, params: Value) -> Result<Value, BusError> {
    let height = params.get("height").and_then(Value::as_u64).ok_or_else(|| BusError::InvalidParams("missing 'height'".to_string()))?;
    let block = processor.chain().get_block_by_height(height as u32).map_err(|e| BusError::Internal(e.to_string()))?;
    Ok(json!(block))
}

fn get_transaction_by_id(processor: &Processor<'_>, params: Value) -> Result<Value, BusError> {
    let id_hex = params.get("id").and_then(Value::as_str).ok_or_else(|| BusError::InvalidParams("missing 'id'".to_string()))?;
    let id = Hash32::from_hex(id_hex).map_err(|e| BusError::InvalidParams(e.to_string()))?;
    let tx = processor.chain().get_transaction_by_id(&id).map_err(|e| BusError::Internal(e.to_string()))?;
    Ok(json!(tx))
}

fn post_transaction(processor: &Processor<'_>, pool: &Arc<TransactionPool>, bus: &Bus, params: Value) -> Result<Value, BusError> {
    let tx: Transaction = serde_json::from_value(params).map_err(|e| BusError::InvalidParams(e.to_string()))?;
    processor.validate_transaction(&tx).map_err(|e| BusError::InvalidParams(e.to_string()))?;
    let id = pool.add(tx).map_err(|e| BusError::InvalidParams(e.to_string()))?;
    bus.publish("app:transaction:new", json!({"id": id.to_hex()}));
    Ok(json!({"transactionId": id.to_hex()}))
}

fn get_validators(processor: &Processor<'_>) -> Result<Value, BusError> {
    processor.invoke_reducer("dpos:validators", Value::Null).map_err(|e| BusError::Internal(e.to_string()))
}

fn address_param(params: &Value) -> Result<Address, BusError> {
    let address_hex = params.get("address").and_then(Value::as_str).ok_or_else(|| BusError::InvalidParams("missing 'address'".to_string()))?;
    Address::from_hex(address_hex).map_err(|e| BusError::InvalidParams(e.to_string()))
}
