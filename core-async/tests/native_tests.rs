//! Integration tests for core-async on native platforms.
//!
//! These tests verify that the async abstraction works correctly with Tokio.

use core_async::{sync, task, time};
use std::sync::Arc;

#[tokio::test]
async fn test_task_spawn() {
    let handle = task::spawn(async { 42 });
    let result = handle.await.unwrap();
    assert_eq!(result, 42);
}

#[tokio::test]
async fn test_timeout_failure() {
    let result = time::timeout(time::Duration::from_millis(10), async {
        time::sleep(time::Duration::from_millis(100)).await;
        42
    })
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_watch_wait_for() {
    let (tx, mut rx) = sync::watch::channel(0u32);
    let handle = task::spawn(async move {
        rx.wait_for(|value| *value == 3).await.map(|v| *v).ok()
    });

    for value in 1..=3 {
        tx.send(value).unwrap();
    }

    assert_eq!(handle.await.unwrap(), Some(3));
}

#[test]
fn test_spawn_dedicated_runs_on_named_thread() {
    let handle = task::spawn_dedicated("dedicated-test", || async {
        std::thread::current().name().map(str::to_owned)
    })
    .unwrap();

    let name = handle.join().unwrap().unwrap();
    assert_eq!(name.as_deref(), Some("dedicated-test"));
}

#[test]
fn test_spawn_dedicated_observes_cancellation() {
    let token = sync::CancellationToken::new();
    let worker_token = token.clone();
    let observed = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let worker_observed = Arc::clone(&observed);

    let handle = task::spawn_dedicated("cancel-test", move || async move {
        worker_token.cancelled().await;
        worker_observed.store(true, std::sync::atomic::Ordering::SeqCst);
    })
    .unwrap();

    token.cancel();
    handle.join().unwrap().unwrap();
    assert!(observed.load(std::sync::atomic::Ordering::SeqCst));
}

#[test]
fn test_try_block_on() {
    let value = core_async::runtime::try_block_on(async { 7 }).unwrap();
    assert_eq!(value, 7);
}
