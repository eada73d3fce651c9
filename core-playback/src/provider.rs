//! # Wave Data Provider
//!
//! The contract between a source of PCM and a
//! [`PlaybackSource`](crate::PlaybackSource).
//!
//! A provider owns one chunk of PCM and exposes it through
//! [`wave_data`](WaveDataProvider::wave_data). Static providers expose their
//! whole clip once. Streaming providers replace the chunk on every
//! [`stream_wave_data`](WaveDataProvider::stream_wave_data) call, and the
//! source copies it into a backend buffer before pulling again.

use crate::format::WaveFormat;
use parking_lot::Mutex;
use std::sync::Arc;

/// Source of PCM for a playback source.
pub trait WaveDataProvider: Send {
    /// PCM currently exposed. Valid until the next mutating call.
    fn wave_data(&self) -> &[u8];

    /// Number of valid bytes in [`wave_data`](Self::wave_data).
    fn wave_data_size(&self) -> usize {
        self.wave_data().len()
    }

    /// Format of the exposed PCM.
    fn format(&self) -> WaveFormat;

    /// Whether the provider has nothing left to produce.
    fn is_eof(&self) -> bool {
        true
    }

    /// Reposition the stream to `seconds` from the start.
    fn seek(&mut self, _seconds: f32) {}

    /// Whether PCM is produced incrementally through
    /// [`stream_wave_data`](Self::stream_wave_data).
    fn is_streaming(&self) -> bool {
        false
    }

    /// Produce up to `requested` bytes into the exposed chunk.
    ///
    /// Returns the number of bytes produced; 0 means the provider is exhausted
    /// for this call.
    fn stream_wave_data(&mut self, _requested: usize) -> usize {
        0
    }
}

/// Provider handle shared between a caller and the source it is bound to.
pub type SharedProvider = Arc<Mutex<dyn WaveDataProvider>>;

/// Wrap a provider for binding to a source.
pub fn shared<P>(provider: P) -> SharedProvider
where
    P: WaveDataProvider + 'static,
{
    Arc::new(Mutex::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Clip(Vec<u8>);

    impl WaveDataProvider for Clip {
        fn wave_data(&self) -> &[u8] {
            &self.0
        }

        fn format(&self) -> WaveFormat {
            WaveFormat::new(1, 8, 8_000)
        }
    }

    #[test]
    fn defaults_describe_a_static_clip() {
        let mut clip = Clip(vec![1, 2, 3]);
        assert_eq!(clip.wave_data_size(), 3);
        assert!(clip.is_eof());
        assert!(!clip.is_streaming());
        assert_eq!(clip.stream_wave_data(1024), 0);
        clip.seek(2.0);
        assert_eq!(clip.wave_data(), &[1, 2, 3]);
    }

    #[test]
    fn shared_provider_coerces() {
        let concrete = Arc::new(Mutex::new(Clip(vec![7])));
        let handle: SharedProvider = concrete.clone();
        assert_eq!(handle.lock().wave_data(), &[7]);
        assert_eq!(Arc::strong_count(&concrete), 2);
        assert_eq!(shared(Clip(Vec::new())).lock().wave_data_size(), 0);
    }
}
