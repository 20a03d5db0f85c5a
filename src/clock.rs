// Time source for the rate limiter, in epoch milliseconds

pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        // clamp pre-epoch clocks to zero
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

// Manually advanced clock, shared between clones
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    now: std::sync::Arc<std::sync::atomic::AtomicU64>,
}

#[cfg(test)]
impl MockClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: std::sync::Arc::new(std::sync::atomic::AtomicU64::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now.load(std::sync::atomic::Ordering::SeqCst)
    }
}
