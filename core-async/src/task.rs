//! Task spawning and execution abstractions.
//!
//! - `spawn`: Runs a future on the ambient Tokio runtime
//! - `spawn_blocking`: Runs CPU-bound work on the blocking pool
//! - `spawn_dedicated`: Runs a future on its own named OS thread with a
//!   private current-thread runtime
//!
//! `spawn_dedicated` exists for thread-affine work such as an audio device
//! whose context must stay on the thread that created it. The future is
//! constructed on the new thread, so it does not need to be `Send`.
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//!
//! async fn example() {
//!     let handle = task::spawn(async { 42 });
//!     assert_eq!(handle.await.unwrap(), 42);
//! }
//! ```

pub use tokio::task::{spawn_blocking, yield_now, JoinError, JoinHandle};

use std::future::Future;
use std::io;
use std::thread;

/// Join handle of a dedicated worker thread.
///
/// The inner `io::Result` reports failure to build the worker's runtime.
pub type DedicatedHandle<T> = thread::JoinHandle<io::Result<T>>;

/// Spawns a new asynchronous task using the Tokio runtime.
///
/// The spawned task may run on a different thread.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Spawns a named OS thread and drives the future built by `make_future`
/// to completion on a current-thread runtime owned by that thread.
///
/// # Errors
///
/// Returns an error if the operating system refuses to create the thread.
pub fn spawn_dedicated<F, Fut>(name: impl Into<String>, make_future: F) -> io::Result<DedicatedHandle<Fut::Output>>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future,
    Fut::Output: Send + 'static,
{
    thread::Builder::new().name(name.into()).spawn(move || {
        let runtime = crate::runtime::current_thread()?;
        Ok(runtime.block_on(make_future()))
    })
}

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, JoinError>;
