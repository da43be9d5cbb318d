pub mod error;
pub mod peer;
pub mod rate_limit;
pub mod transport;
pub mod types;

pub use error::NetworkError;
pub use peer::{NoPeerRequester, PeerContext, PeerRequester};
pub use rate_limit::RateLimiter;
pub use transport::{Transport, MAX_GET_TX, RATE_LIMIT_MAX_CALLS, RATE_LIMIT_WINDOW};
pub use types::{GetHighestCommonBlockRequest, GetTransactionsRequest, PostTransactionsAnnouncementRequest};
