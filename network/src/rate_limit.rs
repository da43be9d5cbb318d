use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Sliding 10 s window keyed by `(peerId, rpc-name)` (spec §4.9). Each key
/// owns a ring buffer of call timestamps; a call is allowed only if fewer
/// than `max_calls` timestamps remain inside the window once expired ones
/// are dropped.
pub struct RateLimiter {
    window: Duration,
    calls: Mutex<HashMap<(String, String), VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(window: Duration) -> Self {
        RateLimiter { window, calls: Mutex::new(HashMap::new()) }
    }

    /// Records a call at `now` and reports whether it falls within
    /// `max_calls` for this peer+rpc inside the trailing window. Call first,
    /// then branch on the result — a rejected call still counts toward the
    /// window so a peer can't reset its budget by spamming past the limit.
    pub fn record(&self, peer_id: &str, rpc: &str, max_calls: usize, now: Instant) -> bool {
        let key = (peer_id.to_string(), rpc.to_string());
        let mut calls = self.calls.lock();
        let timestamps = calls.entry(key).or_default();
        while let Some(&front) = timestamps.front() {
            if now.duration_since(front) > self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }
        timestamps.push_back(now);
        timestamps.len() <= max_calls
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        RateLimiter::new(Duration::from_secs(10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_calls_up_to_the_limit_then_rejects() {
        let limiter = RateLimiter::new(Duration::from_secs(10));
        let now = Instant::now();
        assert!(limiter.record("p1", "getTransactions", 3, now));
        assert!(limiter.record("p1", "getTransactions", 3, now));
        assert!(limiter.record("p1", "getTransactions", 3, now));
        assert!(!limiter.record("p1", "getTransactions", 3, now));
    }

    #[test]
    fn separate_peers_and_rpcs_have_independent_budgets() {
        let limiter = RateLimiter::new(Duration::from_secs(10));
        let now = Instant::now();
        for _ in 0..3 {
            assert!(limiter.record("p1", "getTransactions", 3, now));
        }
        assert!(limiter.record("p2", "getTransactions", 3, now));
        assert!(limiter.record("p1", "getHighestCommonBlock", 3, now));
    }

    #[test]
    fn window_expiry_frees_up_budget() {
        let limiter = RateLimiter::new(Duration::from_millis(50));
        let t0 = Instant::now();
        for _ in 0..3 {
            assert!(limiter.record("p1", "getTransactions", 3, t0));
        }
        assert!(!limiter.record("p1", "getTransactions", 3, t0));
        let later = t0 + Duration::from_millis(60);
        assert!(limiter.record("p1", "getTransactions", 3, later));
    }
}
