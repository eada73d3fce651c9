//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and the
//! platform-specific audio stack. Each trait represents a capability the core
//! requires but that is implemented differently per platform.
//!
//! ## Traits
//!
//! ### Audio
//! - [`AudioBackend`](audio::AudioBackend) - Source/buffer command sink (queue, play, poll)
//! - [`AudioDevice`](device::AudioDevice) - Device and context bring-up on the session worker
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should convert native error codes into the closest variant
//! and include the offending handle in the message.
//!
//! ## Thread Safety
//!
//! [`AudioBackend`](audio::AudioBackend) requires `Send + Sync` so one backend
//! can be shared by every source through an `Arc`. Devices only need `Send`
//! because they are moved onto the session worker and never shared.

pub mod audio;
pub mod device;
pub mod error;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use audio::{AudioBackend, BufferId, SampleLayout, SourceId, SourceState};
pub use device::AudioDevice;
pub use time::{Clock, LogLevel, ManualClock, SystemClock};
