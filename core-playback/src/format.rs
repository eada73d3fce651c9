//! # Wave Format
//!
//! Describes raw PCM as produced by a [`WaveDataProvider`](crate::WaveDataProvider)
//! and maps it onto the layouts an [`AudioBackend`](bridge_traits::AudioBackend)
//! accepts.

use bridge_traits::audio::SampleLayout;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Channel count, sample width and rate of a block of PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaveFormat {
    pub channels: u16,
    pub bits_per_sample: u16,
    pub sample_rate: u32,
}

impl WaveFormat {
    pub fn new(channels: u16, bits_per_sample: u16, sample_rate: u32) -> Self {
        Self {
            channels,
            bits_per_sample,
            sample_rate,
        }
    }

    /// 16-bit stereo at 44.1 kHz.
    pub fn cd_quality() -> Self {
        Self::new(2, 16, 44_100)
    }

    /// Backend layout for this format. See [`sample_layout`].
    pub fn layout(&self) -> SampleLayout {
        sample_layout(self.bits_per_sample, self.channels)
    }

    /// Size of one frame in bytes, or 0 for a degenerate format.
    pub fn bytes_per_frame(&self) -> usize {
        self.channels as usize * (self.bits_per_sample as usize / 8)
    }

    pub fn bytes_per_second(&self) -> usize {
        self.bytes_per_frame() * self.sample_rate as usize
    }

    /// Play time of `bytes` of PCM in this format.
    pub fn duration_of(&self, bytes: usize) -> Duration {
        let rate = self.bytes_per_second();
        if rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(bytes as f64 / rate as f64)
    }

    /// Byte offset of the frame nearest to `seconds`, clamped at zero.
    pub fn byte_offset(&self, seconds: f32) -> usize {
        let frame = self.bytes_per_frame();
        if frame == 0 || !seconds.is_finite() || seconds <= 0.0 {
            return 0;
        }
        let frames = (seconds as f64 * self.sample_rate as f64).round() as usize;
        frames * frame
    }

    /// Round `bytes` down to a whole number of frames.
    pub fn align_down(&self, bytes: usize) -> usize {
        match self.bytes_per_frame() {
            0 => bytes,
            frame => bytes - bytes % frame,
        }
    }
}

/// Map a sample width and channel count to a backend layout.
///
/// Only 8- and 16-bit mono and stereo are playable; every other combination
/// falls back to [`SampleLayout::Mono8`].
pub fn sample_layout(bits_per_sample: u16, channels: u16) -> SampleLayout {
    match (bits_per_sample, channels) {
        (8, 1) => SampleLayout::Mono8,
        (8, 2) => SampleLayout::Stereo8,
        (16, 1) => SampleLayout::Mono16,
        (16, 2) => SampleLayout::Stereo16,
        _ => SampleLayout::Mono8,
    }
}
