use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::envelope::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, Notification};
use crate::error::BusError;

pub type ActionHandler = Box<dyn Fn(Value) -> Result<Value, BusError> + Send + Sync>;

const NOTIFICATION_CAPACITY: usize = 1024;

/// In-process pub/sub and request/response router (spec §4.10). IPC/WS/HTTP
/// transports are out of scope (spec §1) — only the in-process contract
/// matters: namespacing, duplicate rejection, and JSON-RPC error codes.
pub struct Bus {
    actions: RwLock<HashMap<String, ActionHandler>>,
    events: RwLock<HashSet<String>>,
    channels: RwLock<HashSet<String>>,
    sender: broadcast::Sender<Notification>,
}

impl Bus {
    pub fn new() -> Arc<Self> {
        let (sender, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Arc::new(Bus { actions: RwLock::new(HashMap::new()), events: RwLock::new(HashSet::new()), channels: RwLock::new(HashSet::new()), sender })
    }

    /// Namespaces `events` and the keys of `actions` as `moduleAlias:name`.
    /// Since the alias itself is checked for uniqueness first, namespaced
    /// names can never collide across channels — only a re-registration of
    /// the same alias is rejected.
    pub fn register_channel(
        &self,
        module_alias: &str,
        events: &[&str],
        actions: HashMap<String, ActionHandler>,
    ) -> Result<(), BusError> {
        let mut channels = self.channels.write();
        if channels.contains(module_alias) {
            return Err(BusError::DuplicateChannel(module_alias.to_string()));
        }

        let namespaced_events = events.iter().map(|e| format!("{module_alias}:{e}"));
        let namespaced_actions = actions.into_iter().map(|(name, handler)| (format!("{module_alias}:{name}"), handler));

        self.events.write().extend(namespaced_events);
        self.actions.write().extend(namespaced_actions);
        channels.insert(module_alias.to_string());
        tracing::debug!(module_alias, "channel registered");
        Ok(())
    }

    pub fn invoke(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(request.id, JsonRpcError::invalid_request());
        }
        match self.invoke_action(&request.method, request.params.unwrap_or(Value::Null)) {
            Ok(result) => JsonRpcResponse::result(request.id, result),
            Err(BusError::UnknownAction(method)) => JsonRpcResponse::error(request.id, JsonRpcError::method_not_found(&method)),
            Err(BusError::InvalidParams(message)) => JsonRpcResponse::error(request.id, JsonRpcError::invalid_params(message)),
            Err(other) => JsonRpcResponse::error(request.id, JsonRpcError::internal(other.to_string())),
        }
    }

    /// Typed-error counterpart to `invoke` for in-process callers (e.g. RPC
    /// handlers implemented on top of the bus) that want a `Result` instead
    /// of unpacking a JSON-RPC envelope.
    pub fn invoke_action(&self, name: &str, params: Value) -> Result<Value, BusError> {
        let actions = self.actions.read();
        match actions.get(name) {
            Some(handler) => handler(params),
            None => Err(BusError::UnknownAction(name.to_string())),
        }
    }

    pub fn publish(&self, event: impl Into<String>, params: Value) {
        let event = event.into();
        if !self.events.read().contains(&event) {
            tracing::warn!(event = %event, "publishing an event no channel registered");
        }
        // No subscribers is not an error — plenty of events have none yet.
        let _ = self.sender.send(Notification { event, params });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Awaits the next notification whose `event` matches `event_name`.
    pub async fn once(&self, event_name: &str) -> Notification {
        let mut rx = self.subscribe();
        loop {
            match rx.recv().await {
                Ok(notification) if notification.event == event_name => return notification,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    panic!("bus notification channel closed while the bus itself is still alive")
                }
            }
        }
    }
}
