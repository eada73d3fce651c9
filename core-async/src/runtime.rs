//! Runtime utilities that abstract over the underlying async executor.
//!
//! We wrap Tokio's runtime primitives so that downstream crates never need to
//! depend on Tokio directly.

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Build a single-threaded runtime with IO and timers enabled.
pub fn current_thread() -> std::io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}

/// Runs the provided future to completion on a fresh current-thread runtime.
///
/// Must not be called from inside another runtime.
pub fn try_block_on<F>(future: F) -> std::io::Result<F::Output>
where
    F: std::future::Future,
{
    Ok(current_thread()?.block_on(future))
}
