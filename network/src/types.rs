use lisk_primitives::{BlockId, TransactionId};
use serde::{Deserialize, Serialize};

/// `handleRPCGetHighestCommonBlock` request payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GetHighestCommonBlockRequest {
    pub ids: Vec<BlockId>,
}

/// `handleRPCGetTransactions` request payload; a missing `transaction_ids`
/// falls back to the pool's merged view.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GetTransactionsRequest {
    #[serde(default)]
    pub transaction_ids: Option<Vec<TransactionId>>,
}

/// `handleEventPostTransactionsAnnouncement` request payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostTransactionsAnnouncementRequest {
    pub transaction_ids: Vec<TransactionId>,
}
