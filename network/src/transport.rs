use std::sync::Arc;
use std::time::{Duration, Instant};

use lisk_bus::Bus;
use lisk_pool::{Broadcaster, TransactionPool};
use lisk_primitives::{Codable, Transaction, TransactionId};
use lisk_processor::Processor;
use serde_json::json;
use tracing::warn;

use crate::error::NetworkError;
use crate::peer::{PeerContext, PeerRequester};
use crate::rate_limit::RateLimiter;
use crate::types::{GetHighestCommonBlockRequest, GetTransactionsRequest, PostTransactionsAnnouncementRequest};

/// Calls per 10 s window before `handleRPCGetTransactions` /
/// `handleEventPostTransactionsAnnouncement` start applying penalty 10.
pub const RATE_LIMIT_MAX_CALLS: usize = 3;
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(10);
/// `|transactionIds| > MAX_GET_TX` is an oversize request: penalty 100.
pub const MAX_GET_TX: usize = 25;
const PENALTY_SCHEMA_VIOLATION: u32 = 100;
const PENALTY_RATE_LIMIT: u32 = 10;

/// Per-peer P2P handlers (spec §4.9), wired over a shared pool, broadcaster,
/// processor and bus. One `Transport` serves every connected peer; peer
/// identity is carried per-call via `PeerContext`, not held as transport
/// state — mirrors the teacher's `PeerManager` handing a `PeerId` into each
/// message handler rather than keeping one handler instance per peer.
pub struct Transport<'a> {
    processor: &'a Processor<'a>,
    pool: Arc<TransactionPool>,
    broadcaster: Arc<Broadcaster>,
    bus: Arc<Bus>,
    requester: Box<dyn PeerRequester>,
    rate_limiter: RateLimiter,
    merged_limit: usize,
}

impl<'a> Transport<'a> {
    pub fn new(
        processor: &'a Processor<'a>,
        pool: Arc<TransactionPool>,
        broadcaster: Arc<Broadcaster>,
        bus: Arc<Bus>,
        requester: Box<dyn PeerRequester>,
        merged_limit: usize,
    ) -> Self {
        Transport { processor, pool, broadcaster, bus, requester, rate_limiter: RateLimiter::new(RATE_LIMIT_WINDOW), merged_limit }
    }

    fn apply_penalty(&self, peer: &PeerContext, penalty: u32) {
        warn!(peer_id = %peer.peer_id, penalty, "applying peer penalty");
        self.bus.publish("app:applyPenaltyOnPeer", json!({ "peerId": peer.peer_id, "penalty": penalty }));
    }

    fn check_rate_limit(&self, peer: &PeerContext, rpc: &str) -> Result<(), NetworkError> {
        if self.rate_limiter.record(&peer.peer_id, rpc, RATE_LIMIT_MAX_CALLS, Instant::now()) {
            Ok(())
        } else {
            self.apply_penalty(peer, PENALTY_RATE_LIMIT);
            Err(NetworkError::RateLimited)
        }
    }

    /// Enqueues a gossiped transaction for re-broadcast; the broadcaster
    /// itself dedups on id, so no additional bookkeeping lives here.
    pub fn handle_broadcast_transaction(&self, tx: &Transaction) -> Result<TransactionId, NetworkError> {
        let id = Transaction::id_from_encoding(&tx.encode()?);
        self.broadcaster.enqueue(id);
        Ok(id)
    }

    pub fn handle_rpc_get_highest_common_block(
        &self,
        request: GetHighestCommonBlockRequest,
        peer: &PeerContext,
    ) -> Result<Option<lisk_primitives::BlockId>, NetworkError> {
        if request.ids.is_empty() {
            self.apply_penalty(peer, PENALTY_SCHEMA_VIOLATION);
            return Err(NetworkError::InvalidRequest("ids must not be empty".to_string()));
        }
        for id in &request.ids {
            if self.processor.chain().get_block_by_id(id)?.is_some() {
                return Ok(Some(*id));
            }
        }
        Ok(None)
    }

    pub fn handle_rpc_get_transactions(
        &self,
        request: GetTransactionsRequest,
        peer: &PeerContext,
    ) -> Result<Vec<Transaction>, NetworkError> {
        self.check_rate_limit(peer, "getTransactions")?;

        let Some(ids) = request.transaction_ids else {
            return Ok(self.pool.merged(self.merged_limit));
        };

        if ids.len() > MAX_GET_TX {
            self.apply_penalty(peer, PENALTY_SCHEMA_VIOLATION);
            return Err(NetworkError::InvalidRequest(format!("{} exceeds MAX_GET_TX ({MAX_GET_TX})", ids.len())));
        }

        let mut found = Vec::with_capacity(ids.len());
        let mut unresolved = Vec::new();
        for id in &ids {
            match self.pool.get(id) {
                Some(tx) => found.push(tx),
                None => unresolved.push(*id),
            }
        }
        for id in unresolved {
            if let Some(tx) = self.processor.chain().get_transaction_by_id(&id)? {
                found.push(tx);
            }
        }
        Ok(found)
    }

    pub async fn handle_event_post_transactions_announcement(
        &self,
        request: PostTransactionsAnnouncementRequest,
        peer: &PeerContext,
    ) -> Result<(), NetworkError> {
        self.check_rate_limit(peer, "postTransactionsAnnouncement")?;

        if request.transaction_ids.is_empty() {
            self.apply_penalty(peer, PENALTY_SCHEMA_VIOLATION);
            return Err(NetworkError::InvalidRequest("transactionIds must not be empty".to_string()));
        }

        let mut unknown = Vec::new();
        for id in &request.transaction_ids {
            let known_locally = self.pool.contains(id) || self.processor.chain().get_transaction_by_id(id)?.is_some();
            if !known_locally {
                unknown.push(*id);
            }
        }
        if unknown.is_empty() {
            return Ok(());
        }

        let encoded = self.requester.request_transactions(&peer.peer_id, &unknown).await;
        for bytes in encoded {
            let tx = match Transaction::decode(&bytes) {
                Ok(tx) => tx,
                Err(_) => {
                    self.apply_penalty(peer, PENALTY_SCHEMA_VIOLATION);
                    continue;
                }
            };
            if let Err(err) = self.processor.validate_transaction(&tx) {
                warn!(peer_id = %peer.peer_id, error = %err, "rejected announced transaction");
                self.apply_penalty(peer, PENALTY_SCHEMA_VIOLATION);
                continue;
            }
            // Duplicate or capacity rejection is not the peer's fault.
            let _ = self.pool.add(tx);
        }
        Ok(())
    }
}
