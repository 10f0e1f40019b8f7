//! Per-user sliding window rate limiter
//!
//! Each user owns an ordered list of request timestamps. A check prunes the
//! list to the current window and admits the request only while the pruned
//! count is below the threshold.
//!
//! The map is never swept: a user who stops writing keeps an entry (holding
//! at most `threshold` stale timestamps) until their next check, `reset` or
//! `clear`. Memory therefore grows with the number of distinct users seen by
//! the process.

use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::domain::UserId;

/// Default requests allowed per window
pub const DEFAULT_THRESHOLD: usize = 3;

/// Default window length
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Time source for the limiter
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by `Instant::now`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock
///
/// Clones share the same time, so a test can keep one handle and hand
/// another to the limiter.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Sliding window limiter keyed by user
pub struct RateLimiter<K = UserId>
where
    K: Eq + Hash,
{
    requests: DashMap<K, Vec<Instant>>,
    threshold: usize,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl<K> RateLimiter<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    /// Create a limiter on the system clock
    pub fn new(threshold: usize, window: Duration) -> Self {
        Self {
            requests: DashMap::new(),
            threshold,
            window,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Check and record one request.
    ///
    /// Returns `true` when the request is denied. A denied request is not
    /// recorded.
    pub fn is_rate_limited(&self, user: &K) -> bool {
        let now = self.clock.now();
        // entry() holds the shard lock for the whole prune-check-push
        let mut timestamps = self.requests.entry(user.clone()).or_default();

        timestamps.retain(|&ts| now.saturating_duration_since(ts) < self.window);

        if timestamps.len() >= self.threshold {
            debug!(user = ?user, count = timestamps.len(), "rate limit hit");
            return true;
        }

        timestamps.push(now);
        false
    }

    /// Requests currently counted for `user`, without pruning
    pub fn recorded(&self, user: &K) -> usize {
        self.requests.get(user).map(|ts| ts.len()).unwrap_or(0)
    }

    /// Forget one user's history
    pub fn reset(&self, user: &K) {
        self.requests.remove(user);
    }

    /// Forget every user's history
    pub fn clear(&self) {
        self.requests.clear();
    }

    /// Number of users with an entry in the map
    pub fn tracked_users(&self) -> usize {
        self.requests.len()
    }
}

impl Default for RateLimiter<UserId> {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DEFAULT_WINDOW)
    }
}
