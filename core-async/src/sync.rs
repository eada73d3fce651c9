//! Synchronization primitives.
//!
//! Re-exports of the Tokio primitives used across the workspace, plus
//! cooperative cancellation from `tokio-util`.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::watch;
//!
//! let (tx, rx) = watch::channel(0u8);
//! tx.send(1).unwrap();
//! assert_eq!(*rx.borrow(), 1);
//! ```

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify, RwLock, RwLockReadGuard,
    RwLockWriteGuard,
};

pub use tokio_util::sync::{CancellationToken, DropGuard, WaitForCancellationFuture};
