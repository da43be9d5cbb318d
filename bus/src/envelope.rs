use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        JsonRpcRequest { jsonrpc: "2.0".to_string(), id: Some(Value::from(1)), method: method.into(), params: Some(params) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn invalid_request() -> Self {
        JsonRpcError { code: INVALID_REQUEST, message: "invalid request".to_string(), data: None }
    }

    pub fn method_not_found(method: &str) -> Self {
        JsonRpcError { code: METHOD_NOT_FOUND, message: format!("method not found: {method}"), data: None }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        JsonRpcError { code: INVALID_PARAMS, message: message.into(), data: None }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        JsonRpcError { code: INTERNAL_ERROR, message: message.into(), data: None }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum JsonRpcOutcome {
    Result { result: Value },
    Error { error: JsonRpcError },
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(flatten)]
    pub outcome: JsonRpcOutcome,
}

impl JsonRpcResponse {
    pub fn result(id: Option<Value>, result: Value) -> Self {
        JsonRpcResponse { jsonrpc: "2.0".to_string(), id, outcome: JsonRpcOutcome::Result { result } }
    }

    pub fn error(id: Option<Value>, error: JsonRpcError) -> Self {
        JsonRpcResponse { jsonrpc: "2.0".to_string(), id, outcome: JsonRpcOutcome::Error { error } }
    }
}

/// A published event, namespaced as `moduleAlias:eventName`.
#[derive(Debug, Clone)]
pub struct Notification {
    pub event: String,
    pub params: Value,
}
