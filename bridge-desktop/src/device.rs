//! Virtual audio device.

use crate::audio::Inner;
use bridge_traits::{
    device::AudioDevice,
    error::{BridgeError, Result},
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

/// Device half of the software backend.
///
/// Opening the device makes the paired [`VirtualBackend`](crate::VirtualBackend)
/// accept commands; closing it makes every command fail with `NotAvailable`.
pub struct VirtualAudioDevice {
    name: String,
    inner: Arc<Inner>,
    refuse_open: bool,
}

impl VirtualAudioDevice {
    pub(crate) fn new(name: impl Into<String>, inner: Arc<Inner>) -> Self {
        Self {
            name: name.into(),
            inner,
            refuse_open: false,
        }
    }

    /// Make `open` fail, as a host without an output device would.
    pub fn unavailable(mut self) -> Self {
        self.refuse_open = true;
        self
    }
}

impl AudioDevice for VirtualAudioDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&mut self) -> Result<()> {
        if self.refuse_open {
            return Err(BridgeError::NotAvailable(format!(
                "audio device '{}' could not be opened",
                self.name
            )));
        }
        if self.inner.context_open.swap(true, Ordering::AcqRel) {
            return Err(BridgeError::InvalidOperation(format!(
                "audio device '{}' is already open",
                self.name
            )));
        }
        info!(device = %self.name, "Virtual audio device opened");
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.inner.context_open.swap(false, Ordering::AcqRel) {
            return Err(BridgeError::InvalidOperation(format!(
                "audio device '{}' is not open",
                self.name
            )));
        }
        info!(device = %self.name, "Virtual audio device closed");
        Ok(())
    }
}
