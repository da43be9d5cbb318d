use lisk_state_store::StateStore;
use serde_json::Value;

use crate::error::ProcessorError;
use crate::registry::ModuleRegistry;

/// Cross-module call surface (spec §4.8): a transaction asset's `apply` fn
/// reaches another module's reducer by name instead of holding a reference
/// to it directly, so modules never depend on each other's types.
pub struct ReducerHandler<'a> {
    registry: &'a ModuleRegistry,
}

impl<'a> ReducerHandler<'a> {
    pub fn new(registry: &'a ModuleRegistry) -> Self {
        ReducerHandler { registry }
    }

    /// `name` is `"<module>:<reducer>"`, exactly one colon.
    pub fn invoke(&self, name: &str, params: Value, state_store: &mut StateStore<'_>) -> Result<Value, ProcessorError> {
        let mut parts = name.splitn(3, ':');
        let module_name = parts.next().unwrap_or("");
        let reducer_name = match (parts.next(), parts.next()) {
            (Some(reducer_name), None) => reducer_name,
            _ => return Err(ProcessorError::UnknownReducer(name.to_string())),
        };
        let module = self.registry.by_name(module_name).ok_or_else(|| ProcessorError::UnknownReducer(name.to_string()))?;
        let reducer = module.reducers.get(reducer_name).ok_or_else(|| ProcessorError::UnknownReducer(name.to_string()))?;
        reducer(params, state_store)
    }
}

#[cfg(test)]
mod tests {
    use lisk_store::MemoryStore;
    use serde_json::json;

    use super::*;
    use crate::module::Module;

    #[test]
    fn invoke_routes_to_module_reducer() {
        let mut registry = ModuleRegistry::new();
        registry
            .register(
                Module::builder(5, "dpos")
                    .reducer("delegateCount", Box::new(|_params, _store| Ok(json!(3))))
                    .build(),
            )
            .unwrap();
        let handler = ReducerHandler::new(&registry);
        let kv = MemoryStore::new();
        let mut store = StateStore::new(&kv);
        assert_eq!(handler.invoke("dpos:delegateCount", Value::Null, &mut store).unwrap(), json!(3));
    }

    #[test]
    fn invoke_rejects_malformed_name() {
        let registry = ModuleRegistry::new();
        let handler = ReducerHandler::new(&registry);
        let kv = MemoryStore::new();
        let mut store = StateStore::new(&kv);
        assert!(matches!(handler.invoke("dpos:a:b", Value::Null, &mut store), Err(ProcessorError::UnknownReducer(_))));
        assert!(matches!(handler.invoke("dpos", Value::Null, &mut store), Err(ProcessorError::UnknownReducer(_))));
    }

    #[test]
    fn invoke_rejects_unknown_module_or_reducer() {
        let mut registry = ModuleRegistry::new();
        registry.register(Module::builder(5, "dpos").build()).unwrap();
        let handler = ReducerHandler::new(&registry);
        let kv = MemoryStore::new();
        let mut store = StateStore::new(&kv);
        assert!(matches!(handler.invoke("token:transfer", Value::Null, &mut store), Err(ProcessorError::UnknownReducer(_))));
        assert!(matches!(handler.invoke("dpos:transfer", Value::Null, &mut store), Err(ProcessorError::UnknownReducer(_))));
    }
}
