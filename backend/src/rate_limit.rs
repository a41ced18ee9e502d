use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// Fixed-window request budget per client key.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clients: DashMap<String, (AtomicU32, Instant)>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: DashMap::new(),
        }
    }

    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    /// Counts one request for `client`; false once its budget is spent.
    pub fn check(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut entry = self
            .clients
            .entry(client.to_string())
            .or_insert_with(|| (AtomicU32::new(0), now));

        if now.duration_since(entry.1) > self.window {
            entry.0.store(0, Ordering::Relaxed);
            entry.1 = now;
        }

        entry.0.fetch_add(1, Ordering::Relaxed) < self.max_requests
    }

    /// Drops clients whose window has expired.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.clients.len();
        self.clients
            .retain(|_, (_, started)| now.duration_since(*started) <= self.window);
        before - self.clients.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_is_per_client() {
        let limiter = RateLimiter::per_minute(2);
        assert!(limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.1"));
        assert!(!limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.2"));
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn window_expiry_resets_the_budget() {
        let limiter = RateLimiter::new(1, Duration::from_millis(20));
        assert!(limiter.check("client"));
        assert!(!limiter.check("client"));
        std::thread::sleep(Duration::from_millis(40));
        assert!(limiter.check("client"));
    }

    #[test]
    fn expired_clients_are_purged() {
        let limiter = RateLimiter::new(5, Duration::from_millis(10));
        limiter.check("a");
        limiter.check("b");
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(limiter.purge_expired(), 2);
        assert_eq!(limiter.tracked_clients(), 0);
    }
}
