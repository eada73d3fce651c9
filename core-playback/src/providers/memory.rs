use crate::format::WaveFormat;
use crate::provider::WaveDataProvider;
use bytes::Bytes;
use tracing::trace;

/// A complete clip of PCM, submitted to the backend once at bind time.
#[derive(Debug, Clone)]
pub struct StaticWaveProvider {
    pcm: Bytes,
    format: WaveFormat,
}

impl StaticWaveProvider {
    pub fn new(pcm: impl Into<Bytes>, format: WaveFormat) -> Self {
        Self {
            pcm: pcm.into(),
            format,
        }
    }
}

impl WaveDataProvider for StaticWaveProvider {
    fn wave_data(&self) -> &[u8] {
        &self.pcm
    }

    fn format(&self) -> WaveFormat {
        self.format
    }
}

/// Streams in-memory PCM in frame-aligned chunks.
///
/// With looping enabled the provider wraps to the start whenever it runs out
/// and keeps filling the same chunk, so it never reports end of stream.
#[derive(Debug, Clone)]
pub struct MemoryStreamProvider {
    pcm: Bytes,
    format: WaveFormat,
    cursor: usize,
    chunk: Vec<u8>,
    looping: bool,
    eof: bool,
}

impl MemoryStreamProvider {
    pub fn new(pcm: impl Into<Bytes>, format: WaveFormat) -> Self {
        let pcm = pcm.into();
        let eof = pcm.is_empty();
        Self {
            pcm,
            format,
            cursor: 0,
            chunk: Vec::new(),
            looping: false,
            eof,
        }
    }

    /// Wrap to the start instead of ending.
    pub fn looping(mut self, looping: bool) -> Self {
        self.set_looping(looping);
        self
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
        self.eof = self.exhausted();
    }

    /// Byte offset of the next chunk within the clip.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Total length of the clip in bytes.
    pub fn len(&self) -> usize {
        self.pcm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pcm.is_empty()
    }

    fn exhausted(&self) -> bool {
        if self.looping && !self.pcm.is_empty() {
            return false;
        }
        self.cursor >= self.pcm.len()
    }
}

impl WaveDataProvider for MemoryStreamProvider {
    fn wave_data(&self) -> &[u8] {
        &self.chunk
    }

    fn format(&self) -> WaveFormat {
        self.format
    }

    fn is_eof(&self) -> bool {
        self.eof
    }

    fn seek(&mut self, seconds: f32) {
        let offset = self.format.byte_offset(seconds).min(self.pcm.len());
        self.cursor = self.format.align_down(offset);
        self.eof = self.exhausted();
        trace!(seconds, cursor = self.cursor, "Memory stream repositioned");
    }

    fn is_streaming(&self) -> bool {
        true
    }

    fn stream_wave_data(&mut self, requested: usize) -> usize {
        self.chunk.clear();
        let requested = self.format.align_down(requested);

        while self.chunk.len() < requested {
            if self.cursor >= self.pcm.len() {
                if self.looping && !self.pcm.is_empty() {
                    self.cursor = 0;
                } else {
                    break;
                }
            }
            let take = (requested - self.chunk.len()).min(self.pcm.len() - self.cursor);
            self.chunk
                .extend_from_slice(&self.pcm[self.cursor..self.cursor + take]);
            self.cursor += take;
        }

        self.eof = self.exhausted();
        self.chunk.len()
    }
}
