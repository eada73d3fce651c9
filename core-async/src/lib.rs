//! Async runtime layer for the audio streaming workspace.
//!
//! All core-* crates depend on this crate instead of reaching for tokio
//! directly, so the executor choice lives in one place.
//!
//! # Modules
//!
//! - `task`: Task spawning, including dedicated OS-thread workers
//! - `time`: Sleep, timeouts and instants
//! - `sync`: Synchronization primitives and cancellation
//! - `runtime`: Building and driving runtimes outside of an async context
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::CancellationToken;
//! use core_async::task;
//!
//! let token = CancellationToken::new();
//! let worker_token = token.clone();
//! let handle = task::spawn_dedicated("idle-worker", move || async move {
//!     worker_token.cancelled().await;
//!     "exited"
//! })
//! .unwrap();
//!
//! token.cancel();
//! assert_eq!(handle.join().unwrap().unwrap(), "exited");
//! ```

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

// Re-export commonly used types at crate root for convenience
pub use task::{spawn, spawn_dedicated};
pub use time::{sleep, Duration, Instant};
