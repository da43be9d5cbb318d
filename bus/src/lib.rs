pub mod bus;
pub mod envelope;
pub mod error;

pub use bus::{ActionHandler, Bus};
pub use envelope::{JsonRpcError, JsonRpcOutcome, JsonRpcRequest, JsonRpcResponse, Notification};
pub use error::BusError;
