//! # Engine Configuration
//!
//! Configuration for the audio engine: streaming chunk size, default source
//! attributes, session readiness and logging.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::AudioEngineConfig;
//! use std::time::Duration;
//!
//! let config = AudioEngineConfig::builder()
//!     .chunk_bytes(64 * 1024)
//!     .initial_gain(0.8)
//!     .ready_timeout(Duration::from_secs(2))
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.chunk_bytes, 64 * 1024);
//! ```
//!
//! ## Chunk size
//!
//! `chunk_bytes` is the number of decoded PCM bytes pulled into a streaming
//! buffer on every fill. It decides both the memory footprint (two buffers per
//! streaming source) and how long each buffer plays, which bounds how often
//! sources must be updated to avoid underruns. It is fixed when a source is
//! created.

use crate::error::{Error, Result};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default streaming chunk: 512 KiB of PCM, about 3 s of 16-bit stereo at 44.1 kHz.
pub const DEFAULT_CHUNK_BYTES: usize = 2 * 262_144;

/// Audio engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioEngineConfig {
    /// Bytes of PCM pulled into a streaming buffer per fill.
    #[serde(default = "default_chunk_bytes")]
    pub chunk_bytes: usize,

    /// Gain applied to every new source (0.0 = muted, 1.0 = unity).
    #[serde(default = "default_initial_gain")]
    pub initial_gain: f32,

    /// Looping flag applied to every new source.
    #[serde(default)]
    pub looping: bool,

    /// How long callers wait for the device session to report ready.
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout: Duration,

    /// Logging setup.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AudioEngineConfig {
    fn default() -> Self {
        Self {
            chunk_bytes: default_chunk_bytes(),
            initial_gain: default_initial_gain(),
            looping: false,
            ready_timeout: default_ready_timeout(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AudioEngineConfig {
    /// Creates a new builder seeded with defaults.
    pub fn builder() -> AudioEngineConfigBuilder {
        AudioEngineConfigBuilder::default()
    }

    /// Smaller chunks: lower latency at the cost of more frequent refills.
    ///
    /// 32 KiB is ~186 ms of 16-bit stereo at 44.1 kHz, so sources must be
    /// updated at least every ~150 ms.
    pub fn low_latency() -> Self {
        Self {
            chunk_bytes: 32 * 1024,
            ..Default::default()
        }
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_bytes == 0 {
            return Err(Error::Config("chunk_bytes must be > 0".to_string()));
        }

        if !(0.0..=1.0).contains(&self.initial_gain) {
            return Err(Error::Config(format!(
                "initial_gain must be between 0.0 and 1.0, got {}",
                self.initial_gain
            )));
        }

        if self.ready_timeout.is_zero() {
            return Err(Error::Config("ready_timeout must be non-zero".to_string()));
        }

        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid engine config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

fn default_chunk_bytes() -> usize {
    DEFAULT_CHUNK_BYTES
}

fn default_initial_gain() -> f32 {
    1.0
}

fn default_ready_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Builder for [`AudioEngineConfig`].
#[derive(Debug, Default)]
pub struct AudioEngineConfigBuilder {
    chunk_bytes: Option<usize>,
    initial_gain: Option<f32>,
    looping: Option<bool>,
    ready_timeout: Option<Duration>,
    logging: Option<LoggingConfig>,
}

impl AudioEngineConfigBuilder {
    /// Sets the streaming chunk size in bytes.
    pub fn chunk_bytes(mut self, bytes: usize) -> Self {
        self.chunk_bytes = Some(bytes);
        self
    }

    /// Sets the gain applied to new sources.
    pub fn initial_gain(mut self, gain: f32) -> Self {
        self.initial_gain = Some(gain);
        self
    }

    /// Sets the looping flag applied to new sources.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = Some(looping);
        self
    }

    /// Sets the device readiness timeout.
    pub fn ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = Some(timeout);
        self
    }

    /// Sets the logging configuration.
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` describing the first invalid field.
    pub fn build(self) -> Result<AudioEngineConfig> {
        let defaults = AudioEngineConfig::default();
        let config = AudioEngineConfig {
            chunk_bytes: self.chunk_bytes.unwrap_or(defaults.chunk_bytes),
            initial_gain: self.initial_gain.unwrap_or(defaults.initial_gain),
            looping: self.looping.unwrap_or(defaults.looping),
            ready_timeout: self.ready_timeout.unwrap_or(defaults.ready_timeout),
            logging: self.logging.unwrap_or(defaults.logging),
        };
        config.validate()?;
        Ok(config)
    }
}
