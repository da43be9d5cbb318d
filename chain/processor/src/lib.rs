pub mod error;
pub mod module;
pub mod processor;
pub mod queue;
pub mod reducer;
pub mod registry;

pub use error::ProcessorError;
pub use module::{Hooks, Module, ModuleBuilder, TransactionAsset};
pub use processor::{DeleteOptions, ProcessOptions, ProcessValidatedOptions, Processor};
pub use queue::JobQueue;
pub use reducer::ReducerHandler;
pub use registry::ModuleRegistry;
