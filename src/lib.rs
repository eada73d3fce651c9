//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (`core-playback`, `core-runtime`, `bridge-desktop`).
//! Host applications can depend on `audio-stream-workspace` and enable the
//! documented features without needing to wire each crate individually.
//!
//! - `desktop` (default): the playback core, runtime configuration and the
//!   software backend
//! - `decoder`: adds the symphonia-backed streaming provider

#[cfg(feature = "desktop")]
pub use bridge_desktop;
#[cfg(feature = "desktop")]
pub use core_playback;
#[cfg(feature = "desktop")]
pub use core_runtime;
