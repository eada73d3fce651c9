//! Audio backend command interface.
//!
//! The playback core treats the platform audio API as an opaque command sink:
//! it allocates sources and buffers, submits PCM into buffers, manipulates a
//! source's buffer queue and polls a handful of integer state queries. Hosts
//! provide an [`AudioBackend`] implementation wrapping their native API
//! (OpenAL, a software mixer, a test double).
//!
//! All commands are synchronous. Backends that require a "current context"
//! expect every call to originate from the playback-control thread once the
//! device session has reported ready.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a backend playback source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(u32);

impl SourceId {
    /// Construct a handle from a raw backend name.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Borrow the raw backend name.
    pub fn as_raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// Opaque handle to a backend PCM buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BufferId(u32);

impl BufferId {
    /// Construct a handle from a raw backend name.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Borrow the raw backend name.
    pub fn as_raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer#{}", self.0)
    }
}

/// PCM layouts accepted by [`AudioBackend::buffer_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleLayout {
    Mono8,
    Stereo8,
    Mono16,
    Stereo16,
}

impl SampleLayout {
    /// Number of interleaved channels.
    pub fn channels(&self) -> u16 {
        match self {
            SampleLayout::Mono8 | SampleLayout::Mono16 => 1,
            SampleLayout::Stereo8 | SampleLayout::Stereo16 => 2,
        }
    }

    /// Size of a single sample in bytes.
    pub fn bytes_per_sample(&self) -> u16 {
        match self {
            SampleLayout::Mono8 | SampleLayout::Stereo8 => 1,
            SampleLayout::Mono16 | SampleLayout::Stereo16 => 2,
        }
    }

    /// Size of one frame (one sample for every channel) in bytes.
    pub fn bytes_per_frame(&self) -> u16 {
        self.channels() * self.bytes_per_sample()
    }
}

/// Play state reported by the backend for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceState {
    /// Never played since creation or rewind.
    Initial,
    Playing,
    Paused,
    Stopped,
}

/// Platform audio API surface consumed by the playback core.
///
/// ## Queue semantics
///
/// A source owns a FIFO of buffers. While playing, the backend consumes the
/// head buffer; consumed buffers stay in the queue and are counted by
/// [`buffers_processed`](AudioBackend::buffers_processed) until they are
/// unqueued. [`unqueue_buffers`](AudioBackend::unqueue_buffers) detaches from
/// the head of the queue and returns the detached handles in order. While a
/// source is playing or paused only processed buffers may be detached, so a
/// backend may return fewer handles than requested.
///
/// A source may alternatively have a single buffer attached statically via
/// [`attach_buffer`](AudioBackend::attach_buffer), which replaces the whole
/// queue.
pub trait AudioBackend: Send + Sync {
    /// Allocate a playback source.
    fn create_source(&self) -> Result<SourceId>;

    /// Release a playback source. Any attached buffers are detached first.
    fn delete_source(&self, source: SourceId) -> Result<()>;

    /// Allocate `count` empty PCM buffers.
    fn create_buffers(&self, count: usize) -> Result<Vec<BufferId>>;

    /// Release PCM buffers. Buffers still attached to a source are rejected.
    fn delete_buffers(&self, buffers: &[BufferId]) -> Result<()>;

    /// Copy `data` into `buffer`, replacing its previous contents.
    fn buffer_data(
        &self,
        buffer: BufferId,
        layout: SampleLayout,
        data: &[u8],
        sample_rate: u32,
    ) -> Result<()>;

    /// Attach a single buffer to `source`, or detach everything with `None`.
    fn attach_buffer(&self, source: SourceId, buffer: Option<BufferId>) -> Result<()>;

    /// Append buffers to the tail of the source's queue.
    fn queue_buffers(&self, source: SourceId, buffers: &[BufferId]) -> Result<()>;

    /// Detach up to `count` buffers from the head of the source's queue.
    fn unqueue_buffers(&self, source: SourceId, count: usize) -> Result<Vec<BufferId>>;

    fn play(&self, source: SourceId) -> Result<()>;

    fn stop(&self, source: SourceId) -> Result<()>;

    fn pause(&self, source: SourceId) -> Result<()>;

    /// Current play state of the source.
    fn source_state(&self, source: SourceId) -> Result<SourceState>;

    /// Number of buffers currently in the source's queue.
    fn buffers_queued(&self, source: SourceId) -> Result<usize>;

    /// Number of queued buffers the backend has finished consuming.
    fn buffers_processed(&self, source: SourceId) -> Result<usize>;

    /// Set the linear gain of the source.
    fn set_gain(&self, source: SourceId, gain: f32) -> Result<()>;

    /// Enable or disable looping of the source's attached buffer.
    fn set_looping(&self, source: SourceId, looping: bool) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_layout_sizes() {
        assert_eq!(SampleLayout::Mono8.bytes_per_frame(), 1);
        assert_eq!(SampleLayout::Stereo8.bytes_per_frame(), 2);
        assert_eq!(SampleLayout::Mono16.bytes_per_frame(), 2);
        assert_eq!(SampleLayout::Stereo16.bytes_per_frame(), 4);
        assert_eq!(SampleLayout::Stereo16.channels(), 2);
    }

    #[test]
    fn handle_display() {
        assert_eq!(SourceId::from_raw(3).to_string(), "source#3");
        assert_eq!(BufferId::from_raw(7).to_string(), "buffer#7");
        assert_eq!(BufferId::from_raw(7).as_raw(), 7);
    }
}
