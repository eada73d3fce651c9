//! # Device Session
//!
//! Owns the audio device for the lifetime of the engine. The device is opened
//! on a dedicated thread which then idles until it is told to exit, so a
//! backend that needs a thread-current context keeps it alive while the rest
//! of the engine issues commands.
//!
//! ```no_run
//! use bridge_desktop::VirtualBackend;
//! use core_playback::DeviceSession;
//!
//! # async fn run() -> core_playback::Result<()> {
//! let backend = VirtualBackend::new();
//! let session = DeviceSession::start(Box::new(backend.device("default")))?;
//! session.wait_ready().await?;
//! // ... create sources against `backend` ...
//! session.shutdown()?;
//! # Ok(())
//! # }
//! ```

use crate::error::{PlaybackError, Result};
use bridge_traits::device::AudioDevice;
use core_async::sync::{watch, CancellationToken};
use core_async::task::{spawn_dedicated, DedicatedHandle};
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Lifecycle of a [`DeviceSession`] worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Worker spawned, device not yet open.
    Starting,
    /// Device open; backend commands are legal.
    Ready,
    /// Device could not be opened. The worker has exited.
    Failed(String),
    /// Device closed after an exit request.
    Terminated,
}

/// Background worker holding an open audio device.
pub struct DeviceSession {
    device_name: String,
    cancel: CancellationToken,
    state: watch::Receiver<SessionState>,
    worker: Option<DedicatedHandle<()>>,
}

impl DeviceSession {
    /// Spawn the worker thread and begin opening `device`.
    ///
    /// Returns as soon as the thread exists; use
    /// [`wait_ready`](Self::wait_ready) before issuing backend commands.
    pub fn start(device: Box<dyn AudioDevice>) -> Result<Self> {
        let device_name = device.name().to_string();
        let (state_tx, state_rx) = watch::channel(SessionState::Starting);
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();

        let worker = spawn_dedicated(format!("audio-session-{}", device_name), move || {
            run_session(device, state_tx, worker_cancel)
        })?;

        Ok(Self {
            device_name,
            cancel,
            state: state_rx,
            worker: Some(worker),
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Current worker state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Whether the device is open and backend commands are legal.
    pub fn is_initialized(&self) -> bool {
        *self.state.borrow() == SessionState::Ready
    }

    /// Wait until the worker has opened the device.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::SessionFailed`] if the device could not be
    /// opened or the session has already terminated.
    pub async fn wait_ready(&self) -> Result<()> {
        let mut state = self.state.clone();
        let settled = state
            .wait_for(|s| *s != SessionState::Starting)
            .await
            .map_err(|_| PlaybackError::SessionFailed("session worker exited".to_string()))?
            .clone();

        match settled {
            SessionState::Ready => Ok(()),
            SessionState::Failed(reason) => Err(PlaybackError::SessionFailed(reason)),
            SessionState::Terminated => Err(PlaybackError::SessionFailed(
                "session already terminated".to_string(),
            )),
            SessionState::Starting => Err(PlaybackError::Internal(
                "session settled while still starting".to_string(),
            )),
        }
    }

    /// [`wait_ready`](Self::wait_ready) bounded by `timeout`.
    pub async fn wait_ready_timeout(&self, timeout: Duration) -> Result<()> {
        core_async::time::timeout(timeout, self.wait_ready())
            .await
            .map_err(|_| PlaybackError::SessionTimeout(timeout))?
    }

    /// Blocking variant of [`wait_ready_timeout`](Self::wait_ready_timeout)
    /// for callers without an async runtime.
    ///
    /// Must not be called from within an async context.
    pub fn wait_ready_blocking(&self, timeout: Duration) -> Result<()> {
        core_async::runtime::try_block_on(self.wait_ready_timeout(timeout))?
    }

    /// Ask the worker to close the device without waiting for it.
    pub fn request_exit(&self) {
        self.cancel.cancel();
    }

    /// Close the device and join the worker thread.
    pub fn shutdown(mut self) -> Result<()> {
        self.cancel.cancel();
        self.join()
    }

    fn join(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        worker
            .join()
            .map_err(|_| PlaybackError::Internal("session worker panicked".to_string()))??;
        Ok(())
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Err(e) = self.join() {
            warn!(device = %self.device_name, error = %e, "Session worker did not exit cleanly");
        }
    }
}

impl std::fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("device", &self.device_name)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

#[instrument(skip_all, fields(device = %device.name()))]
async fn run_session(
    mut device: Box<dyn AudioDevice>,
    state: watch::Sender<SessionState>,
    cancel: CancellationToken,
) {
    if let Err(e) = device.open() {
        error!(error = %e, "Failed to open audio device");
        state.send_replace(SessionState::Failed(e.to_string()));
        return;
    }

    info!("Audio device session ready");
    state.send_replace(SessionState::Ready);

    cancel.cancelled().await;

    if let Err(e) = device.close() {
        warn!(error = %e, "Failed to close audio device");
    }
    state.send_replace(SessionState::Terminated);
    info!("Audio device session terminated");
}
