//! # Core Playback
//!
//! Double-buffered playback of static and streaming PCM through an
//! [`AudioBackend`](bridge_traits::AudioBackend).
//!
//! ## Overview
//!
//! - [`WaveDataProvider`]: where PCM comes from (a clip in memory, a chunked
//!   stream, a decoder)
//! - [`PlaybackSource`]: one backend source bound to a provider, keeping two
//!   buffers in flight while streaming
//! - [`BufferPool`]: the buffers owned by a binding
//! - [`DeviceSession`]: the worker thread holding the audio device open
//!
//! ## Usage
//!
//! ```no_run
//! use bridge_desktop::VirtualBackend;
//! use core_playback::{
//!     providers::MemoryStreamProvider, shared, DeviceSession, PlaybackSource, SourceConfig,
//!     WaveFormat,
//! };
//! use std::sync::Arc;
//!
//! # async fn run(pcm: Vec<u8>) -> core_playback::Result<()> {
//! let backend = VirtualBackend::new();
//! let session = DeviceSession::start(Box::new(backend.device("default")))?;
//! session.wait_ready().await?;
//!
//! let mut source = PlaybackSource::new(Arc::new(backend), SourceConfig::default())?;
//! let stream = MemoryStreamProvider::new(pcm, WaveFormat::cd_quality());
//! source.bind_waveform(Some(shared(stream)))?;
//! source.play()?;
//!
//! while source.is_playing()? {
//!     source.update(0.1)?;
//!     core_async::sleep(std::time::Duration::from_millis(100)).await;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `decoder`: `DecodedStreamProvider`, streaming compressed audio through
//!   symphonia

pub mod buffer_pool;
pub mod config;
pub mod error;
pub mod format;
pub mod provider;
pub mod providers;
pub mod session;
pub mod source;

#[cfg(feature = "decoder")]
pub mod decoder;

pub use buffer_pool::{BufferPool, BufferSlot, SlotState};
pub use config::SourceConfig;
pub use error::{PlaybackError, Result};
pub use format::{sample_layout, WaveFormat};
pub use provider::{shared, SharedProvider, WaveDataProvider};
pub use session::{DeviceSession, SessionState};
pub use source::{PlaybackSource, PlaybackState};

#[cfg(feature = "decoder")]
pub use decoder::DecodedStreamProvider;

/// Bytes pulled into a streaming buffer per fill unless configured otherwise.
pub const BUFFER_SIZE: usize = core_runtime::config::DEFAULT_CHUNK_BYTES;
