use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::metrics::RATE_LIMIT_ENTRIES;
use crate::rate_limit::store::CounterStore;

/// Window length and quota for one class of callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub window_ms: u64,
    pub max_requests: u32,
    /// Successful attempts are handed back via [`RateLimiter::refund`].
    pub skip_successful_requests: bool,
}

impl RateLimitPolicy {
    pub const fn new(window_ms: u64, max_requests: u32) -> Self {
        Self {
            window_ms,
            max_requests,
            skip_successful_requests: false,
        }
    }

    pub const fn skip_successful(mut self) -> Self {
        self.skip_successful_requests = true;
        self
    }

    // 5 attempts per 15 minutes
    pub const fn login() -> Self {
        Self::new(15 * 60 * 1000, 5).skip_successful()
    }

    // 60 requests per minute
    pub const fn api() -> Self {
        Self::new(60 * 1000, 60)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_time: u64,
    pub total_requests: u32,
}

impl RateLimitDecision {
    // Whole seconds until the window ends, rounded up
    pub fn retry_after_secs(&self, now: u64) -> u64 {
        self.reset_time.saturating_sub(now).div_ceil(1000)
    }
}

/// Answers allow/deny for a key against a policy, backed by a shared store.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<CounterStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(store: Arc<CounterStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<CounterStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    #[cfg(test)]
    pub fn store(&self) -> &CounterStore {
        &self.store
    }

    /// Records an attempt for `key` and reports whether it is within quota.
    ///
    /// Exactly `max_requests` attempts pass per window. Once the boundary is
    /// reached further attempts are denied without touching the count.
    pub fn check(&self, policy: &RateLimitPolicy, key: &str) -> RateLimitDecision {
        let now = self.clock.now_ms();

        // must run before the shard lock below is taken
        self.store.compact(now);

        let decision = {
            let (mut entry, created) = self.store.get_or_create(key, now, policy.window_ms);

            if created {
                RateLimitDecision {
                    allowed: true,
                    remaining: policy.max_requests.saturating_sub(1),
                    reset_time: entry.reset_time,
                    total_requests: entry.count,
                }
            } else if entry.count >= policy.max_requests {
                RateLimitDecision {
                    allowed: false,
                    remaining: 0,
                    reset_time: entry.reset_time,
                    total_requests: entry.count,
                }
            } else {
                entry.increment();
                RateLimitDecision {
                    allowed: true,
                    remaining: policy.max_requests.saturating_sub(entry.count),
                    reset_time: entry.reset_time,
                    total_requests: entry.count,
                }
            }
        };

        RATE_LIMIT_ENTRIES.set(self.store.len() as f64);

        if !decision.allowed {
            tracing::warn!(
                key,
                count = decision.total_requests,
                reset_time = decision.reset_time,
                "rate limit exceeded"
            );
        }
        decision
    }

    /// Hands back the attempt recorded by `decision` when the policy skips
    /// successful requests. Returns the decision adjusted to the new count.
    pub fn refund(
        &self,
        policy: &RateLimitPolicy,
        key: &str,
        decision: RateLimitDecision,
    ) -> RateLimitDecision {
        if !policy.skip_successful_requests || !decision.allowed {
            return decision;
        }

        match self.store.refund(key, decision.reset_time) {
            Some(entry) if entry.reset_time == decision.reset_time => RateLimitDecision {
                remaining: policy.max_requests.saturating_sub(entry.count),
                total_requests: entry.count,
                ..decision
            },
            _ => decision,
        }
    }
}
