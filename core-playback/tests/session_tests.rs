//! Device session lifecycle.

use bridge_desktop::VirtualBackend;
use bridge_traits::device::AudioDevice;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use core_playback::{DeviceSession, PlaybackError, SessionState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Device that counts open/close calls and records the calling thread.
#[derive(Clone, Default)]
struct ProbeDevice {
    opens: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    thread: Arc<parking_lot::Mutex<Option<String>>>,
}

impl AudioDevice for ProbeDevice {
    fn name(&self) -> &str {
        "probe"
    }

    fn open(&mut self) -> BridgeResult<()> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        *self.thread.lock() = std::thread::current().name().map(str::to_string);
        Ok(())
    }

    fn close(&mut self) -> BridgeResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct BrokenDevice;

impl AudioDevice for BrokenDevice {
    fn name(&self) -> &str {
        "broken"
    }

    fn open(&mut self) -> BridgeResult<()> {
        Err(BridgeError::NotAvailable("no output device".to_string()))
    }

    fn close(&mut self) -> BridgeResult<()> {
        panic!("a device that never opened must not be closed");
    }
}

#[tokio::test]
async fn session_opens_device_on_worker_thread() {
    let device = ProbeDevice::default();
    let session = DeviceSession::start(Box::new(device.clone())).unwrap();

    session.wait_ready_timeout(READY_TIMEOUT).await.unwrap();

    assert!(session.is_initialized());
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.device_name(), "probe");
    assert_eq!(device.opens.load(Ordering::SeqCst), 1);
    assert_eq!(
        device.thread.lock().as_deref(),
        Some("audio-session-probe")
    );

    session.shutdown().unwrap();
    assert_eq!(device.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_open_never_becomes_ready() {
    let session = DeviceSession::start(Box::new(BrokenDevice)).unwrap();

    let err = session.wait_ready().await.unwrap_err();
    assert!(matches!(err, PlaybackError::SessionFailed(ref reason) if reason.contains("no output device")));
    assert!(!session.is_initialized());
    assert!(matches!(session.state(), SessionState::Failed(_)));

    session.shutdown().unwrap();
}

#[tokio::test]
async fn virtual_device_gates_backend_commands() {
    let backend = VirtualBackend::new();
    let session = DeviceSession::start(Box::new(backend.device("virtual"))).unwrap();
    session.wait_ready_timeout(READY_TIMEOUT).await.unwrap();
    assert!(backend.is_context_open());

    session.shutdown().unwrap();
    assert!(!backend.is_context_open());
}

#[tokio::test]
async fn unavailable_virtual_device_fails_session() {
    let backend = VirtualBackend::new();
    let session =
        DeviceSession::start(Box::new(backend.device("virtual").unavailable())).unwrap();

    assert!(session.wait_ready_timeout(READY_TIMEOUT).await.is_err());
    assert!(!backend.is_context_open());
}

#[tokio::test]
async fn request_exit_terminates_worker() {
    let device = ProbeDevice::default();
    let session = DeviceSession::start(Box::new(device.clone())).unwrap();
    session.wait_ready_timeout(READY_TIMEOUT).await.unwrap();

    session.request_exit();
    tokio::time::timeout(READY_TIMEOUT, async {
        while session.state() != SessionState::Terminated {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    assert!(!session.is_initialized());
    assert!(matches!(
        session.wait_ready().await,
        Err(PlaybackError::SessionFailed(_))
    ));
    assert_eq!(device.closes.load(Ordering::SeqCst), 1);
}

#[test]
fn dropping_session_closes_device() {
    let device = ProbeDevice::default();
    {
        let session = DeviceSession::start(Box::new(device.clone())).unwrap();
        session.wait_ready_blocking(READY_TIMEOUT).unwrap();
    }
    assert_eq!(device.opens.load(Ordering::SeqCst), 1);
    assert_eq!(device.closes.load(Ordering::SeqCst), 1);
}
