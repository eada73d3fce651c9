//! # Desktop Bridge Implementations
//!
//! Default implementations of the audio bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `VirtualBackend` implements `AudioBackend` as an in-process software
//!   device that drains queued buffers in real time
//! - `VirtualAudioDevice` implements `AudioDevice` and gates the backend's
//!   commands on an open context
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::VirtualBackend;
//! use bridge_traits::AudioDevice;
//!
//! let backend = VirtualBackend::new();
//! let mut device = backend.device("default");
//! device.open()?;
//! // Hand `Arc::new(backend)` to a playback source.
//! ```

mod audio;
mod device;

pub use audio::VirtualBackend;
pub use device::VirtualAudioDevice;
