//! Per-address lookup counter for the captcha gate.
//!
//! The gate itself is rendered by the presentation tier; this counter only
//! decides when object lookups from one address are diverted back to the
//! search form. Counts live in a fixed 24-hour window per address.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy)]
struct AddressWindow {
    count: u32,
    window_ends_at: Instant,
}

/// Shared per-address hit counter.
#[derive(Clone)]
pub struct CaptchaCounter {
    hits: Arc<RwLock<HashMap<String, AddressWindow>>>,
    window: Duration,
}

impl Default for CaptchaCounter {
    fn default() -> Self {
        Self::new(Duration::from_secs(60 * 60 * 24))
    }
}

impl CaptchaCounter {
    pub fn new(window: Duration) -> Self {
        Self {
            hits: Arc::new(RwLock::new(HashMap::new())),
            window,
        }
    }

    /// Record one lookup and return the count within the current window.
    pub async fn record(&self, source_ip: &str) -> u32 {
        let mut hits = self.hits.write().await;
        let now = Instant::now();
        let entry = hits
            .entry(source_ip.to_string())
            .or_insert(AddressWindow {
                count: 0,
                window_ends_at: now + self.window,
            });
        if now > entry.window_ends_at {
            entry.count = 0;
            entry.window_ends_at = now + self.window;
        }
        entry.count += 1;
        entry.count
    }

    /// Current count without recording a lookup.
    pub async fn count(&self, source_ip: &str) -> u32 {
        let hits = self.hits.read().await;
        match hits.get(source_ip) {
            Some(entry) if Instant::now() <= entry.window_ends_at => entry.count,
            _ => 0,
        }
    }

    /// Forget an address. Called when the visitor passes the gate.
    pub async fn reset(&self, source_ip: &str) {
        self.hits.write().await.remove(source_ip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_accumulate_per_address() {
        let counter = CaptchaCounter::default();
        assert_eq!(counter.record("203.0.113.7").await, 1);
        assert_eq!(counter.record("203.0.113.7").await, 2);
        assert_eq!(counter.record("198.51.100.3").await, 1);
        assert_eq!(counter.count("203.0.113.7").await, 2);
    }

    #[tokio::test]
    async fn window_expiry_resets_the_count() {
        let counter = CaptchaCounter::new(Duration::from_millis(1));
        counter.record("203.0.113.7").await;
        counter.record("203.0.113.7").await;

        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(counter.count("203.0.113.7").await, 0);
        assert_eq!(counter.record("203.0.113.7").await, 1);
    }

    #[tokio::test]
    async fn reset_forgets_the_address() {
        let counter = CaptchaCounter::default();
        counter.record("203.0.113.7").await;
        counter.record("203.0.113.7").await;
        counter.reset("203.0.113.7").await;
        assert_eq!(counter.count("203.0.113.7").await, 0);
    }
}
