pub mod chain;
pub mod error;
pub mod validate;

pub use chain::Chain;
pub use error::ChainError;
pub use validate::{AcceptAll, GeneratorEligibility, SignatureVerifier};
