//! # Source Configuration
//!
//! Per-source settings fixed at construction time.

use crate::error::{PlaybackError, Result};
use core_runtime::config::{AudioEngineConfig, DEFAULT_CHUNK_BYTES};
use serde::{Deserialize, Serialize};

/// Settings applied when a [`PlaybackSource`](crate::PlaybackSource) is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Bytes pulled from a streaming provider into each buffer fill.
    ///
    /// Default: [`BUFFER_SIZE`](crate::BUFFER_SIZE).
    #[serde(default = "default_chunk_bytes")]
    pub chunk_bytes: usize,

    /// Gain applied to the new source.
    ///
    /// Default: 1.0.
    #[serde(default = "default_initial_gain")]
    pub initial_gain: f32,

    /// Looping flag applied to the new source.
    #[serde(default)]
    pub looping: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            chunk_bytes: default_chunk_bytes(),
            initial_gain: default_initial_gain(),
            looping: false,
        }
    }
}

impl SourceConfig {
    pub fn with_chunk_bytes(mut self, chunk_bytes: usize) -> Self {
        self.chunk_bytes = chunk_bytes;
        self
    }

    pub fn with_initial_gain(mut self, gain: f32) -> Self {
        self.initial_gain = gain;
        self
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_bytes == 0 {
            return Err(PlaybackError::InvalidFormat(
                "chunk_bytes must be > 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.initial_gain) {
            return Err(PlaybackError::InvalidVolume(self.initial_gain));
        }

        Ok(())
    }
}

impl From<&AudioEngineConfig> for SourceConfig {
    fn from(config: &AudioEngineConfig) -> Self {
        Self {
            chunk_bytes: config.chunk_bytes,
            initial_gain: config.initial_gain,
            looping: config.looping,
        }
    }
}

fn default_chunk_bytes() -> usize {
    DEFAULT_CHUNK_BYTES
}

fn default_initial_gain() -> f32 {
    1.0
}
