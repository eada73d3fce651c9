//! Time-related abstractions.
//!
//! Thin re-exports of `tokio::time` and the standard library's monotonic
//! clock types.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep, Duration, Instant};
//!
//! async fn example() {
//!     let start = Instant::now();
//!     sleep(Duration::from_millis(10)).await;
//!     println!("Took {:?}", start.elapsed());
//! }
//! ```

pub use tokio::time::{interval, sleep, sleep_until, timeout, Interval, Sleep, Timeout};

pub use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Returns the current time as milliseconds since UNIX_EPOCH.
///
/// A clock set before the epoch reports 0.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
