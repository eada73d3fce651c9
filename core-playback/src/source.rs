//! # Playback Source
//!
//! A backend source bound to at most one [`WaveDataProvider`](crate::WaveDataProvider).
//!
//! ## Static providers
//!
//! The whole clip is copied into a single buffer when the provider is bound
//! and attached to the source. Play, pause and stop only drive the transport.
//!
//! ## Streaming providers
//!
//! Two buffers take turns. [`play`](PlaybackSource::play) from a stopped
//! source fills both and queues them; [`update`](PlaybackSource::update) must
//! then be called regularly to pull every buffer the backend has finished
//! playing, refill it with the next chunk and queue it again behind the one
//! still playing:
//!
//! ```text
//!   play()            update()            update()
//!   [A: c1][B: c2] -> [B: c2][A: c3] -> [A: c3][B: c4] -> ...
//! ```
//!
//! A drained buffer whose refill comes back empty is parked instead of
//! queued, so the source stops by itself once the provider runs dry. Buffers
//! detached by [`pause`](PlaybackSource::pause) rejoin the rotation on the
//! first `update` after playback resumes.

use crate::buffer_pool::{BufferPool, SlotState};
use crate::config::SourceConfig;
use crate::error::Result;
use crate::provider::SharedProvider;
use bridge_traits::audio::{AudioBackend, BufferId, SourceId, SourceState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, trace, warn};

/// Transport state last requested through a [`PlaybackSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// A playback source with double-buffered streaming.
pub struct PlaybackSource {
    backend: Arc<dyn AudioBackend>,
    source: SourceId,
    provider: Option<SharedProvider>,
    pool: Option<BufferPool>,
    state: PlaybackState,
    config: SourceConfig,
}

impl PlaybackSource {
    /// Create a backend source with the configured gain and looping flag.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or the backend rejects any of
    /// the setup commands. A source created before the failure is deleted.
    pub fn new(backend: Arc<dyn AudioBackend>, config: SourceConfig) -> Result<Self> {
        config.validate()?;

        let source = backend.create_source()?;
        let setup = backend
            .set_gain(source, config.initial_gain)
            .and_then(|_| backend.set_looping(source, config.looping));
        if let Err(e) = setup {
            let _ = backend.delete_source(source);
            return Err(e.into());
        }

        debug!(source = %source, chunk_bytes = config.chunk_bytes, "Created playback source");

        Ok(Self {
            backend,
            source,
            provider: None,
            pool: None,
            state: PlaybackState::Stopped,
            config,
        })
    }

    /// Backend handle of this source.
    pub fn id(&self) -> SourceId {
        self.source
    }

    /// Last transition requested through this source.
    ///
    /// The backend may since have stopped on its own; use
    /// [`is_playing`](Self::is_playing) for the live state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Currently bound provider.
    pub fn provider(&self) -> Option<&SharedProvider> {
        self.provider.as_ref()
    }

    /// Buffers owned by the current binding.
    pub fn buffer_pool(&self) -> Option<&BufferPool> {
        self.pool.as_ref()
    }

    /// Whether the backend reports the source as playing.
    pub fn is_playing(&self) -> Result<bool> {
        Ok(self.backend.source_state(self.source)? == SourceState::Playing)
    }

    /// Start or resume playback.
    ///
    /// Does nothing without a bound provider or while already playing. A
    /// streaming source that is not paused is primed first: whatever is still
    /// queued is detached, both buffers are refilled from the provider and
    /// queued in order. A paused source resumes from where it stopped.
    pub fn play(&mut self) -> Result<()> {
        let Some(provider) = self.provider.clone() else {
            return Ok(());
        };
        let backend_state = self.backend.source_state(self.source)?;
        if backend_state == SourceState::Playing {
            return Ok(());
        }

        let streaming = provider.lock().is_streaming();
        if streaming && backend_state != SourceState::Paused {
            self.unqueue_all()?;
            let ids = self.pool_ids();
            for id in &ids {
                self.stream_buffer(*id, self.config.chunk_bytes)?;
            }
            self.backend.queue_buffers(self.source, &ids)?;
            self.mark_all(&ids, SlotState::Queued);
            debug!(source = %self.source, buffers = ids.len(), "Primed streaming buffers");
        }

        self.backend.play(self.source)?;
        self.state = PlaybackState::Playing;
        info!(source = %self.source, streaming, "Playback started");
        Ok(())
    }

    /// Stop playback. Queued buffers stay attached until the next
    /// [`play`](Self::play) or rebind.
    pub fn stop(&mut self) -> Result<()> {
        self.backend.stop(self.source)?;
        self.state = PlaybackState::Stopped;
        info!(source = %self.source, "Playback stopped");
        Ok(())
    }

    /// Pause playback and detach the buffers the backend lets go of.
    ///
    /// Only streaming bindings are detached; a static clip keeps its buffer.
    /// Detached slots are refilled by the next [`update`](Self::update) once
    /// playback has resumed.
    pub fn pause(&mut self) -> Result<()> {
        self.backend.pause(self.source)?;
        if self.is_streaming() {
            let detached = self.unqueue_all()?;
            debug!(source = %self.source, detached, "Detached buffers on pause");
        }
        self.state = PlaybackState::Paused;
        info!(source = %self.source, "Playback paused");
        Ok(())
    }

    /// Recycle drained buffers of a playing streaming source.
    ///
    /// Every buffer the backend reports as processed is unqueued, refilled
    /// with one chunk and queued again. Slots left detached by a pause are
    /// refilled the same way. A buffer whose pull produced nothing is left
    /// unqueued.
    ///
    /// Returns the number of buffers refilled. `delta_seconds` is only
    /// recorded in the refill log.
    pub fn update(&mut self, delta_seconds: f32) -> Result<usize> {
        let Some(provider) = self.provider.clone() else {
            return Ok(0);
        };
        if !provider.lock().is_streaming() || !self.is_playing()? {
            return Ok(0);
        }

        let processed = self.backend.buffers_processed(self.source)?;
        for _ in 0..processed {
            let Some(id) = self.backend.unqueue_buffers(self.source, 1)?.first().copied() else {
                break;
            };
            self.mark(id, SlotState::Processed);
        }

        let mut refilled = 0;
        for id in self.parked_ids() {
            if self.stream_buffer(id, self.config.chunk_bytes)? == 0 {
                trace!(source = %self.source, buffer = %id, "Provider exhausted, parking buffer");
                break;
            }
            self.backend.queue_buffers(self.source, &[id])?;
            self.mark(id, SlotState::Queued);
            refilled += 1;
        }

        if processed > 0 || refilled > 0 {
            debug!(
                source = %self.source,
                processed,
                refilled,
                delta_seconds,
                "Refill cycle"
            );
        }
        Ok(refilled)
    }

    /// Replace the bound provider.
    ///
    /// The previous binding is torn down first: the source is stopped, its
    /// buffers detached and deleted, and its provider share dropped. A new
    /// provider gets a fresh pool; a static one is uploaded and attached
    /// right away. `None` leaves the source unbound.
    #[instrument(skip(self, provider), fields(source = %self.source))]
    pub fn bind_waveform(&mut self, provider: Option<SharedProvider>) -> Result<()> {
        self.release_binding()?;

        let Some(provider) = provider else {
            info!("Source unbound");
            return Ok(());
        };

        let streaming = provider.lock().is_streaming();
        let pool = BufferPool::allocate(self.backend.as_ref(), streaming)?;
        let ids = pool.ids();
        self.pool = Some(pool);
        self.provider = Some(provider);

        if !streaming {
            if let Err(e) = self.attach_static(ids[0]) {
                self.provider = None;
                if let Some(pool) = self.pool.take() {
                    if let Err(release) = pool.release(self.backend.as_ref()) {
                        warn!(error = %release, "Failed to delete buffers of rejected clip");
                    }
                }
                return Err(e);
            }
        }

        info!(streaming, buffers = ids.len(), "Bound waveform");
        Ok(())
    }

    /// Set the source gain.
    pub fn set_volume(&mut self, gain: f32) -> Result<()> {
        self.backend.set_gain(self.source, gain)?;
        Ok(())
    }

    /// Enable or disable backend looping of the attached buffer.
    pub fn loop_sound(&mut self, enabled: bool) -> Result<()> {
        self.backend.set_looping(self.source, enabled)?;
        Ok(())
    }

    /// Pull up to `size` bytes from the streaming provider into `buffer`.
    ///
    /// Whatever the provider exposes after the pull is submitted, including
    /// an empty chunk. Returns the number of bytes the provider produced.
    pub fn stream_buffer(&self, buffer: BufferId, size: usize) -> Result<usize> {
        let Some(provider) = self.provider.as_ref() else {
            return Ok(0);
        };
        let mut provider = provider.lock();
        let produced = provider.stream_wave_data(size);
        let format = provider.format();
        let data = provider.wave_data();
        let valid = provider.wave_data_size().min(data.len());
        self.backend
            .buffer_data(buffer, format.layout(), &data[..valid], format.sample_rate)?;
        trace!(
            source = %self.source,
            buffer = %buffer,
            requested = size,
            produced,
            duration = ?format.duration_of(valid),
            "Buffer filled"
        );
        Ok(produced)
    }

    fn attach_static(&mut self, buffer: BufferId) -> Result<()> {
        self.upload_static(buffer)?;
        self.backend.attach_buffer(self.source, Some(buffer))?;
        self.mark(buffer, SlotState::Queued);
        Ok(())
    }

    fn upload_static(&self, buffer: BufferId) -> Result<()> {
        let Some(provider) = self.provider.as_ref() else {
            return Ok(());
        };
        let provider = provider.lock();
        let format = provider.format();
        let data = provider.wave_data();
        let valid = provider.wave_data_size().min(data.len());
        self.backend
            .buffer_data(buffer, format.layout(), &data[..valid], format.sample_rate)?;
        trace!(buffer = %buffer, bytes = valid, "Static clip uploaded");
        Ok(())
    }

    fn release_binding(&mut self) -> Result<()> {
        let Some(pool) = self.pool.take() else {
            self.provider = None;
            return Ok(());
        };

        let detach = self
            .backend
            .stop(self.source)
            .and_then(|_| self.backend.attach_buffer(self.source, None));
        if let Err(e) = detach {
            self.pool = Some(pool);
            return Err(e.into());
        }
        self.state = PlaybackState::Stopped;
        self.provider = None;
        pool.release(self.backend.as_ref())
    }

    fn unqueue_all(&mut self) -> Result<usize> {
        let queued = self.backend.buffers_queued(self.source)?;
        if queued == 0 {
            return Ok(0);
        }
        let detached = self.backend.unqueue_buffers(self.source, queued)?;
        self.mark_all(&detached, SlotState::Processed);
        Ok(detached.len())
    }

    fn is_streaming(&self) -> bool {
        self.provider
            .as_ref()
            .is_some_and(|provider| provider.lock().is_streaming())
    }

    /// Slots that are detached and waiting for a refill, in pool order.
    fn parked_ids(&self) -> Vec<BufferId> {
        self.pool
            .as_ref()
            .map(|pool| {
                pool.slots()
                    .iter()
                    .filter(|slot| slot.state == SlotState::Processed)
                    .map(|slot| slot.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn pool_ids(&self) -> Vec<BufferId> {
        self.pool.as_ref().map(BufferPool::ids).unwrap_or_default()
    }

    fn mark(&mut self, id: BufferId, state: SlotState) {
        if let Some(pool) = self.pool.as_mut() {
            pool.mark(id, state);
        }
    }

    fn mark_all(&mut self, ids: &[BufferId], state: SlotState) {
        for id in ids {
            self.mark(*id, state);
        }
    }
}

impl Drop for PlaybackSource {
    fn drop(&mut self) {
        if let Err(e) = self.backend.stop(self.source) {
            warn!(source = %self.source, error = %e, "Failed to stop source on drop");
        }
        self.provider = None;
        if let Err(e) = self.backend.delete_source(self.source) {
            warn!(source = %self.source, error = %e, "Failed to delete source on drop");
        }
        if let Some(pool) = self.pool.take() {
            if let Err(e) = pool.release(self.backend.as_ref()) {
                warn!(source = %self.source, error = %e, "Failed to delete buffers on drop");
            }
        }
    }
}

impl std::fmt::Debug for PlaybackSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSource")
            .field("source", &self.source)
            .field("state", &self.state)
            .field("bound", &self.provider.is_some())
            .field("pool", &self.pool)
            .field("config", &self.config)
            .finish()
    }
}
