//! Rate limiting module using a sliding time window.
//!
//! The provider simulator admits at most `threshold` requests within any trailing
//! window; the limiter owns its timestamp window and only exposes `allow`.

mod sliding_window;

pub use sliding_window::{RateLimiter, RateLimiterStats};
