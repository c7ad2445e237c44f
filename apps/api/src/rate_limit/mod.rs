//! Fixed-window request limiter keyed by client identity.
//!
//! Each key gets `max_requests` per `window`, counted from its first request
//! in the window. Rejected requests do not increment the count. Because the
//! window is fixed, a client can issue up to `2 × max_requests` across a
//! window boundary.
//!
//! Expired entries are dropped lazily on access and by [`FixedWindowLimiter::sweep_expired`],
//! which `main` runs on an interval so the map stays bounded by the number of
//! clients active within one window.

pub mod client_key;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Per-key counter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub window_start: Instant,
}

/// Outcome of a single `check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Request admitted; `count` includes it.
    Allowed { count: u32, remaining: u32 },
    /// Quota exhausted until the window closes.
    Rejected { retry_after: Duration },
}

#[derive(Debug)]
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Counts a request from `key` against its window.
    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let mut entries = self.entries.lock();

        let Some(entry) = entries.get_mut(key) else {
            entries.insert(
                key.to_string(),
                RateLimitEntry {
                    count: 1,
                    window_start: now,
                },
            );
            return self.allowed(1);
        };

        let elapsed = now.saturating_duration_since(entry.window_start);
        if elapsed > self.window {
            *entry = RateLimitEntry {
                count: 1,
                window_start: now,
            };
            return self.allowed(1);
        }

        if entry.count >= self.max_requests {
            return RateLimitDecision::Rejected {
                retry_after: self.window - elapsed,
            };
        }

        entry.count += 1;
        self.allowed(entry.count)
    }

    fn allowed(&self, count: u32) -> RateLimitDecision {
        RateLimitDecision::Allowed {
            count,
            remaining: self.max_requests.saturating_sub(count),
        }
    }

    /// Current entry for `key`, if any.
    pub fn entry(&self, key: &str) -> Option<RateLimitEntry> {
        self.entries.lock().get(key).copied()
    }

    /// Drops entries whose window has elapsed. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    pub fn sweep_expired_at(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, e| now.saturating_duration_since(e.window_start) <= self.window);
        before - entries.len()
    }

    /// Number of clients currently tracked.
    pub fn client_count(&self) -> usize {
        self.entries.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_first_request_creates_entry() {
        let limiter = FixedWindowLimiter::new(50, HOUR);
        let now = Instant::now();
        assert_eq!(
            limiter.check_at("1.2.3.4", now),
            RateLimitDecision::Allowed {
                count: 1,
                remaining: 49
            }
        );
        assert_eq!(limiter.entry("1.2.3.4").unwrap().window_start, now);
    }

    #[test]
    fn test_fifty_first_request_rejected_then_window_reset() {
        let limiter = FixedWindowLimiter::new(50, HOUR);
        let start = Instant::now();

        for i in 1..=50 {
            let decision = limiter.check_at("client", start + Duration::from_secs(i));
            assert!(matches!(decision, RateLimitDecision::Allowed { count, .. } if count == i as u32));
        }

        let rejected = limiter.check_at("client", start + Duration::from_secs(60));
        assert!(matches!(rejected, RateLimitDecision::Rejected { .. }));
        assert_eq!(limiter.entry("client").unwrap().count, 50);

        let after_window = start + HOUR + Duration::from_secs(1);
        assert_eq!(
            limiter.check_at("client", after_window),
            RateLimitDecision::Allowed {
                count: 1,
                remaining: 49
            }
        );
        let entry = limiter.entry("client").unwrap();
        assert_eq!(entry.count, 1);
        assert_eq!(entry.window_start, after_window);
    }

    #[test]
    fn test_window_boundary_is_exclusive() {
        let limiter = FixedWindowLimiter::new(1, HOUR);
        let start = Instant::now();
        limiter.check_at("k", start);
        // exactly one window later is still inside it
        assert!(matches!(
            limiter.check_at("k", start + HOUR),
            RateLimitDecision::Rejected { .. }
        ));
    }

    #[test]
    fn test_retry_after_counts_down_to_window_end() {
        let limiter = FixedWindowLimiter::new(1, HOUR);
        let start = Instant::now();
        limiter.check_at("k", start);
        match limiter.check_at("k", start + Duration::from_secs(600)) {
            RateLimitDecision::Rejected { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(3000));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_distinct_keys_are_independent() {
        let limiter = FixedWindowLimiter::new(2, HOUR);
        let now = Instant::now();
        limiter.check_at("a", now);
        limiter.check_at("a", now);
        assert!(matches!(
            limiter.check_at("a", now),
            RateLimitDecision::Rejected { .. }
        ));
        assert!(matches!(
            limiter.check_at("b", now),
            RateLimitDecision::Allowed { count: 1, .. }
        ));
    }

    #[test]
    fn test_sweep_removes_only_expired_entries() {
        let limiter = FixedWindowLimiter::new(5, HOUR);
        let start = Instant::now();
        limiter.check_at("old", start);
        limiter.check_at("fresh", start + Duration::from_secs(1800));

        let removed = limiter.sweep_expired_at(start + HOUR + Duration::from_secs(1));
        assert_eq!(removed, 1);
        assert!(limiter.entry("old").is_none());
        assert!(limiter.entry("fresh").is_some());
        assert_eq!(limiter.client_count(), 1);
    }
}
