//! Sliding window rate limiter

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

/// Sliding window rate limiter.
///
/// Keeps the timestamps of admitted requests. A request is admitted when fewer
/// than `threshold` admitted requests fall inside the trailing window. Pruning,
/// the threshold check and the append happen under one lock so concurrent
/// callers cannot both pass the check for the last free slot.
#[derive(Debug)]
pub struct RateLimiter {
    /// Timestamps of admitted requests
    window: Mutex<VecDeque<Instant>>,
    /// Admitted requests allowed per window
    threshold: usize,
    /// Length of the trailing window
    window_length: Duration,
}

impl RateLimiter {
    /// Create a new limiter
    pub fn new(threshold: usize, window_length: Duration) -> Self {
        Self {
            window: Mutex::new(VecDeque::with_capacity(threshold)),
            threshold,
            window_length,
        }
    }

    /// Admit or reject a request arriving at `now`.
    ///
    /// Rejected requests are not recorded.
    pub fn allow(&self, now: Instant) -> bool {
        let mut window = self.window.lock();
        Self::prune(&mut window, now, self.window_length);

        if window.len() >= self.threshold {
            return false;
        }

        window.push_back(now);
        true
    }

    /// Number of admitted requests still inside the window at `now`
    pub fn in_window(&self, now: Instant) -> usize {
        let mut window = self.window.lock();
        Self::prune(&mut window, now, self.window_length);
        window.len()
    }

    /// Get statistics about the limiter
    pub fn stats(&self) -> RateLimiterStats {
        RateLimiterStats {
            threshold: self.threshold,
            window_secs: self.window_length.as_secs(),
            in_window: self.in_window(Instant::now()),
        }
    }

    // Callers stamp `now` before taking the lock, so entries are not strictly
    // ordered; a full retain keeps late stamps that are still in range.
    fn prune(window: &mut VecDeque<Instant>, now: Instant, window_length: Duration) {
        window.retain(|admitted| now.saturating_duration_since(*admitted) < window_length);
    }
}

/// Statistics about the rate limiter
#[derive(Debug, Clone, Serialize)]
pub struct RateLimiterStats {
    pub threshold: usize,
    pub window_secs: u64,
    pub in_window: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_admits_up_to_threshold() {
        let limiter = RateLimiter::new(5, Duration::from_secs(10));
        let now = Instant::now();

        for _ in 0..5 {
            assert!(limiter.allow(now));
        }

        // 6th inside the same window is rejected
        assert!(!limiter.allow(now + Duration::from_secs(9)));
        assert_eq!(limiter.in_window(now), 5);
    }

    #[test]
    fn test_rejection_is_not_recorded() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        let now = Instant::now();

        assert!(limiter.allow(now));
        for _ in 0..10 {
            assert!(!limiter.allow(now));
        }
        assert_eq!(limiter.in_window(now), 1);
    }

    #[test]
    fn test_admits_again_after_window() {
        let window = Duration::from_secs(10);
        let limiter = RateLimiter::new(3, window);
        let start = Instant::now();

        for _ in 0..3 {
            assert!(limiter.allow(start));
        }
        assert!(!limiter.allow(start + Duration::from_secs(5)));

        // Entries exactly one window old have expired
        let later = start + window;
        assert!(limiter.allow(later));
        assert_eq!(limiter.in_window(later), 1);
    }

    #[test]
    fn test_window_slides() {
        let limiter = RateLimiter::new(2, Duration::from_secs(10));
        let start = Instant::now();

        assert!(limiter.allow(start));
        assert!(limiter.allow(start + Duration::from_secs(6)));
        assert!(!limiter.allow(start + Duration::from_secs(8)));

        // First entry expired, second still counts
        assert!(limiter.allow(start + Duration::from_secs(11)));
        assert!(!limiter.allow(start + Duration::from_secs(12)));
    }

    #[test]
    fn test_concurrent_callers_never_exceed_threshold() {
        let limiter = RateLimiter::new(50, Duration::from_secs(10));
        let admitted = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..25 {
                        if limiter.allow(Instant::now()) {
                            admitted.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                });
            }
        });

        assert_eq!(admitted.load(Ordering::Relaxed), 50);
        assert_eq!(limiter.in_window(Instant::now()), 50);
    }

    #[test]
    fn test_stats() {
        let limiter = RateLimiter::new(10, Duration::from_secs(10));
        limiter.allow(Instant::now());
        limiter.allow(Instant::now());

        let stats = limiter.stats();
        assert_eq!(stats.threshold, 10);
        assert_eq!(stats.window_secs, 10);
        assert_eq!(stats.in_window, 2);
    }
}
