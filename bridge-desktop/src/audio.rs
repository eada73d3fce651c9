//! Software audio backend.
//!
//! `VirtualBackend` keeps sources and buffers in memory and drains queued
//! buffers at the rate implied by their sample layout and sample rate, as
//! measured by an injected [`Clock`]. It is what the desktop host uses when no
//! hardware API is wired in, and what tests use with a [`ManualClock`] to
//! step playback deterministically.
//!
//! The command rules follow the usual driver semantics:
//! - a buffer that sits in any source's queue cannot be refilled or deleted
//! - a source with a statically attached buffer cannot have buffers queued
//! - only processed buffers can be unqueued from a playing or paused source
//! - stopping a source marks its whole queue as processed
//! - every command fails with `NotAvailable` until the owning device is open
//!
//! [`ManualClock`]: bridge_traits::time::ManualClock

use crate::device::VirtualAudioDevice;
use bridge_traits::{
    audio::{AudioBackend, BufferId, SampleLayout, SourceId, SourceState},
    error::{BridgeError, Result},
    time::{Clock, SystemClock},
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// In-memory audio backend driven by a clock.
#[derive(Clone)]
pub struct VirtualBackend {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) context_open: AtomicBool,
    clock: Arc<dyn Clock>,
    state: Mutex<BackendState>,
}

#[derive(Default)]
struct BackendState {
    next_name: u32,
    sources: HashMap<SourceId, VirtualSource>,
    buffers: HashMap<BufferId, VirtualBuffer>,
}

struct VirtualBuffer {
    data: Vec<u8>,
    duration: Duration,
    fills: usize,
}

struct VirtualSource {
    state: SourceState,
    queue: VecDeque<BufferId>,
    processed: usize,
    static_buffer: bool,
    looping: bool,
    gain: f32,
    /// Playback offset into the head pending buffer.
    offset: Duration,
    last_tick: DateTime<Utc>,
}

impl VirtualBackend {
    /// Create a backend that drains buffers in wall-clock time.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a backend that drains buffers according to `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                context_open: AtomicBool::new(false),
                clock,
                state: Mutex::new(BackendState::default()),
            }),
        }
    }

    /// Device whose open/close gates this backend's commands.
    pub fn device(&self, name: impl Into<String>) -> VirtualAudioDevice {
        VirtualAudioDevice::new(name, Arc::clone(&self.inner))
    }

    /// Whether a device context is currently open.
    pub fn is_context_open(&self) -> bool {
        self.inner.context_open.load(Ordering::Acquire)
    }

    /// Copy of the PCM last submitted to `buffer`.
    pub fn buffer_contents(&self, buffer: BufferId) -> Option<Vec<u8>> {
        self.inner
            .state
            .lock()
            .buffers
            .get(&buffer)
            .map(|b| b.data.clone())
    }

    /// How many times `buffer` has been filled.
    pub fn fill_count(&self, buffer: BufferId) -> usize {
        self.inner
            .state
            .lock()
            .buffers
            .get(&buffer)
            .map_or(0, |b| b.fills)
    }

    /// Number of buffers that have not been deleted.
    pub fn live_buffers(&self) -> usize {
        self.inner.state.lock().buffers.len()
    }

    /// Number of sources that have not been deleted.
    pub fn live_sources(&self) -> usize {
        self.inner.state.lock().sources.len()
    }

    /// Gain last applied to `source`.
    pub fn gain(&self, source: SourceId) -> Option<f32> {
        self.inner.state.lock().sources.get(&source).map(|s| s.gain)
    }

    /// Looping flag last applied to `source`.
    pub fn is_looping(&self, source: SourceId) -> Option<bool> {
        self.inner
            .state
            .lock()
            .sources
            .get(&source)
            .map(|s| s.looping)
    }

    fn ensure_context(&self) -> Result<()> {
        if self.is_context_open() {
            Ok(())
        } else {
            Err(BridgeError::NotAvailable(
                "no current audio context; open the device first".to_string(),
            ))
        }
    }

    /// Run `f` against a source after draining it up to the current time.
    fn with_source<T>(
        &self,
        source: SourceId,
        f: impl FnOnce(&mut VirtualSource, &mut HashMap<BufferId, VirtualBuffer>) -> Result<T>,
    ) -> Result<T> {
        self.ensure_context()?;
        let now = self.inner.clock.now();
        let mut state = self.inner.state.lock();
        let BackendState {
            sources, buffers, ..
        } = &mut *state;
        let src = sources
            .get_mut(&source)
            .ok_or_else(|| BridgeError::InvalidHandle(source.to_string()))?;
        src.advance(now, buffers);
        f(src, buffers)
    }
}

impl Default for VirtualBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendState {
    fn allocate_name(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }

    fn is_enqueued(&self, buffer: BufferId) -> bool {
        self.sources.values().any(|s| s.queue.contains(&buffer))
    }
}

impl VirtualSource {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: SourceState::Initial,
            queue: VecDeque::new(),
            processed: 0,
            static_buffer: false,
            looping: false,
            gain: 1.0,
            offset: Duration::ZERO,
            last_tick: now,
        }
    }

    /// Consume queued audio for the time elapsed since the last tick.
    fn advance(&mut self, now: DateTime<Utc>, buffers: &HashMap<BufferId, VirtualBuffer>) {
        let mut elapsed = (now - self.last_tick).to_std().unwrap_or_default();
        self.last_tick = now;

        if self.state != SourceState::Playing {
            return;
        }

        loop {
            if self.processed >= self.queue.len() {
                let loop_length: Duration = self
                    .queue
                    .iter()
                    .filter_map(|id| buffers.get(id))
                    .map(|b| b.duration)
                    .sum();
                if self.looping && !loop_length.is_zero() {
                    self.processed = 0;
                    continue;
                }
                self.state = SourceState::Stopped;
                self.offset = Duration::ZERO;
                return;
            }

            let head = self.queue[self.processed];
            let length = buffers.get(&head).map_or(Duration::ZERO, |b| b.duration);
            let remaining = length.saturating_sub(self.offset);

            if elapsed >= remaining {
                elapsed -= remaining;
                self.offset = Duration::ZERO;
                self.processed += 1;
            } else {
                self.offset += elapsed;
                return;
            }
        }
    }

    /// Buffers that may be detached in the current state.
    fn detachable(&self) -> usize {
        match self.state {
            SourceState::Playing | SourceState::Paused => self.processed,
            SourceState::Initial | SourceState::Stopped => self.queue.len(),
        }
    }
}

fn layout_duration(layout: SampleLayout, bytes: usize, sample_rate: u32) -> Duration {
    let bytes_per_second = layout.bytes_per_frame() as u64 * sample_rate as u64;
    if bytes_per_second == 0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(bytes as f64 / bytes_per_second as f64)
}

impl AudioBackend for VirtualBackend {
    fn create_source(&self) -> Result<SourceId> {
        self.ensure_context()?;
        let now = self.inner.clock.now();
        let mut state = self.inner.state.lock();
        let id = SourceId::from_raw(state.allocate_name());
        state.sources.insert(id, VirtualSource::new(now));
        debug!(source = %id, "Created virtual source");
        Ok(id)
    }

    fn delete_source(&self, source: SourceId) -> Result<()> {
        self.ensure_context()?;
        let mut state = self.inner.state.lock();
        state
            .sources
            .remove(&source)
            .ok_or_else(|| BridgeError::InvalidHandle(source.to_string()))?;
        debug!(source = %source, "Deleted virtual source");
        Ok(())
    }

    fn create_buffers(&self, count: usize) -> Result<Vec<BufferId>> {
        self.ensure_context()?;
        let mut state = self.inner.state.lock();
        let ids: Vec<BufferId> = (0..count)
            .map(|_| BufferId::from_raw(state.allocate_name()))
            .collect();
        for id in &ids {
            state.buffers.insert(
                *id,
                VirtualBuffer {
                    data: Vec::new(),
                    duration: Duration::ZERO,
                    fills: 0,
                },
            );
        }
        Ok(ids)
    }

    fn delete_buffers(&self, buffers: &[BufferId]) -> Result<()> {
        self.ensure_context()?;
        let mut state = self.inner.state.lock();
        for id in buffers {
            if !state.buffers.contains_key(id) {
                return Err(BridgeError::InvalidHandle(id.to_string()));
            }
            if state.is_enqueued(*id) {
                return Err(BridgeError::InvalidOperation(format!(
                    "{} is still attached to a source",
                    id
                )));
            }
        }
        for id in buffers {
            state.buffers.remove(id);
        }
        Ok(())
    }

    fn buffer_data(
        &self,
        buffer: BufferId,
        layout: SampleLayout,
        data: &[u8],
        sample_rate: u32,
    ) -> Result<()> {
        self.ensure_context()?;
        let mut state = self.inner.state.lock();
        if state.is_enqueued(buffer) {
            return Err(BridgeError::InvalidOperation(format!(
                "{} is queued and cannot be refilled",
                buffer
            )));
        }
        let slot = state
            .buffers
            .get_mut(&buffer)
            .ok_or_else(|| BridgeError::InvalidHandle(buffer.to_string()))?;
        slot.data.clear();
        slot.data.extend_from_slice(data);
        slot.duration = layout_duration(layout, data.len(), sample_rate);
        slot.fills += 1;
        trace!(buffer = %buffer, bytes = data.len(), ?layout, sample_rate, "Buffer filled");
        Ok(())
    }

    fn attach_buffer(&self, source: SourceId, buffer: Option<BufferId>) -> Result<()> {
        self.ensure_context()?;
        let now = self.inner.clock.now();
        let mut state = self.inner.state.lock();
        if let Some(id) = buffer {
            if !state.buffers.contains_key(&id) {
                return Err(BridgeError::InvalidHandle(id.to_string()));
            }
        }
        let BackendState {
            sources, buffers, ..
        } = &mut *state;
        let src = sources
            .get_mut(&source)
            .ok_or_else(|| BridgeError::InvalidHandle(source.to_string()))?;
        src.advance(now, buffers);
        if matches!(src.state, SourceState::Playing | SourceState::Paused) {
            return Err(BridgeError::InvalidOperation(format!(
                "{} must be stopped before changing its buffer",
                source
            )));
        }
        src.queue.clear();
        src.processed = 0;
        src.offset = Duration::ZERO;
        src.static_buffer = buffer.is_some();
        if let Some(id) = buffer {
            src.queue.push_back(id);
        }
        Ok(())
    }

    fn queue_buffers(&self, source: SourceId, ids: &[BufferId]) -> Result<()> {
        {
            let state = self.inner.state.lock();
            if let Some(missing) = ids.iter().find(|id| !state.buffers.contains_key(id)) {
                return Err(BridgeError::InvalidHandle(missing.to_string()));
            }
        }
        self.with_source(source, |src, _| {
            if src.static_buffer {
                return Err(BridgeError::InvalidOperation(format!(
                    "{} has a static buffer attached",
                    source
                )));
            }
            src.queue.extend(ids.iter().copied());
            Ok(())
        })
    }

    fn unqueue_buffers(&self, source: SourceId, count: usize) -> Result<Vec<BufferId>> {
        self.with_source(source, |src, _| {
            let take = count.min(src.detachable());
            let detached: Vec<BufferId> = src.queue.drain(..take).collect();
            src.processed = src.processed.saturating_sub(take);
            if src.queue.is_empty() {
                src.static_buffer = false;
            }
            Ok(detached)
        })
    }

    fn play(&self, source: SourceId) -> Result<()> {
        self.with_source(source, |src, _| {
            match src.state {
                SourceState::Playing => {}
                SourceState::Paused => src.state = SourceState::Playing,
                SourceState::Initial | SourceState::Stopped => {
                    src.processed = 0;
                    src.offset = Duration::ZERO;
                    src.state = if src.queue.is_empty() {
                        SourceState::Stopped
                    } else {
                        SourceState::Playing
                    };
                }
            }
            Ok(())
        })
    }

    fn stop(&self, source: SourceId) -> Result<()> {
        self.with_source(source, |src, _| {
            src.state = SourceState::Stopped;
            src.processed = src.queue.len();
            src.offset = Duration::ZERO;
            Ok(())
        })
    }

    fn pause(&self, source: SourceId) -> Result<()> {
        self.with_source(source, |src, _| {
            if src.state == SourceState::Playing {
                src.state = SourceState::Paused;
            }
            Ok(())
        })
    }

    fn source_state(&self, source: SourceId) -> Result<SourceState> {
        self.with_source(source, |src, _| Ok(src.state))
    }

    fn buffers_queued(&self, source: SourceId) -> Result<usize> {
        self.with_source(source, |src, _| Ok(src.queue.len()))
    }

    fn buffers_processed(&self, source: SourceId) -> Result<usize> {
        self.with_source(source, |src, _| Ok(src.processed))
    }

    fn set_gain(&self, source: SourceId, gain: f32) -> Result<()> {
        if gain.is_nan() || gain < 0.0 {
            return Err(BridgeError::InvalidOperation(format!(
                "gain must be non-negative, got {}",
                gain
            )));
        }
        self.with_source(source, |src, _| {
            src.gain = gain;
            Ok(())
        })
    }

    fn set_looping(&self, source: SourceId, looping: bool) -> Result<()> {
        self.with_source(source, |src, _| {
            src.looping = looping;
            Ok(())
        })
    }
}
