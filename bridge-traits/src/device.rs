//! Audio device bring-up abstraction.
//!
//! A device is opened once on the session worker and kept alive until the
//! session is told to exit. Opening covers both the output device and the
//! rendering context; once `open` returns `Ok`, backend commands are legal.

use crate::error::Result;

/// Host audio device plus its rendering context.
pub trait AudioDevice: Send {
    /// Human-readable device name, used for logging.
    fn name(&self) -> &str;

    /// Open the device, create a context and make it current.
    fn open(&mut self) -> Result<()>;

    /// Destroy the context and close the device.
    fn close(&mut self) -> Result<()>;
}
