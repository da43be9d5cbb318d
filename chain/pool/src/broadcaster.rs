use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use lisk_bus::Bus;
use lisk_primitives::TransactionId;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::pool::TransactionPool;

pub const DEFAULT_RELEASE_LIMIT: usize = 25;
pub const DEFAULT_BROADCAST_INTERVAL: Duration = Duration::from_secs(5);

/// Ordered, dedup'd outbound announcement queue (spec §4.8). Ids accumulate
/// here independently of pool eviction — a transaction dropped from the pool
/// before its release window simply fails the `pool.contains` filter at
/// release time rather than being proactively removed.
pub struct Broadcaster {
    queue: Mutex<VecDeque<TransactionId>>,
    seen: Mutex<HashSet<TransactionId>>,
    release_limit: usize,
    interval: Duration,
}

impl Broadcaster {
    pub fn new(release_limit: usize, interval: Duration) -> Self {
        Broadcaster { queue: Mutex::new(VecDeque::new()), seen: Mutex::new(HashSet::new()), release_limit, interval }
    }

    pub fn enqueue(&self, id: TransactionId) {
        let mut seen = self.seen.lock();
        if seen.insert(id) {
            self.queue.lock().push_back(id);
        }
    }

    pub fn pending_len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Releases up to `release_limit` ids, oldest first, keeping ids that
    /// don't survive the pool-membership filter off the front of the queue
    /// (dropped, not requeued — they were already handled some other way).
    fn release(&self, pool: &TransactionPool) -> Vec<TransactionId> {
        let mut queue = self.queue.lock();
        let mut seen = self.seen.lock();
        let mut released = Vec::new();
        for _ in 0..self.release_limit {
            let Some(id) = queue.pop_front() else { break };
            seen.remove(&id);
            if pool.contains(&id) {
                released.push(id);
            }
        }
        released
    }

    /// Runs until `shutdown` reports `true`. Intended to be spawned as a
    /// `tokio` task alongside the job queue worker.
    pub async fn run(self: Arc<Self>, pool: Arc<TransactionPool>, bus: Arc<Bus>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let ids = self.release(&pool);
                    if !ids.is_empty() {
                        tracing::debug!(count = ids.len(), "releasing transaction announcement batch");
                        let hex_ids: Vec<String> = ids.iter().map(|id| id.to_hex()).collect();
                        bus.publish("app:postTransactionsAnnouncement", serde_json::json!({ "transactionIds": hex_ids }));
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(byte: u8) -> TransactionId {
        lisk_primitives::Hash32([byte; 32])
    }

    #[test]
    fn enqueue_dedups_by_id() {
        let broadcaster = Broadcaster::new(25, DEFAULT_BROADCAST_INTERVAL);
        broadcaster.enqueue(id(1));
        broadcaster.enqueue(id(1));
        assert_eq!(broadcaster.pending_len(), 1);
    }

    #[test]
    fn release_caps_at_limit_leaving_the_rest_queued() {
        let pool = TransactionPool::new(10);
        let broadcaster = Broadcaster::new(2, DEFAULT_BROADCAST_INTERVAL);
        for n in 1..=3u8 {
            broadcaster.enqueue(id(n));
        }
        let released = broadcaster.release(&pool);
        assert!(released.is_empty(), "none of the enqueued ids are in the empty pool");
        assert_eq!(broadcaster.pending_len(), 1, "third id never reached because the limit is 2");
    }

    #[test]
    fn released_ids_surviving_pool_membership_are_returned() {
        let pool = TransactionPool::new(10);
        let t1 = lisk_primitives::Transaction {
            module_id: 1,
            asset_id: 0,
            nonce: 1,
            fee: 0,
            sender_public_key: lisk_primitives::Bytes(vec![1]),
            signatures: vec![],
            asset: vec![],
        };
        let id1 = pool.add(t1).unwrap();
        let broadcaster = Broadcaster::new(25, DEFAULT_BROADCAST_INTERVAL);
        broadcaster.enqueue(id1);
        let released = broadcaster.release(&pool);
        assert_eq!(released, vec![id1]);
    }
}
