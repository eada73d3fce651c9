//! # Playback Error Types
//!
//! Error types for sources, providers and the device session.

use bridge_traits::error::BridgeError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// A command issued to the audio backend failed.
    #[error("Audio backend error: {0}")]
    Backend(#[from] BridgeError),

    // ========================================================================
    // Device Session Errors
    // ========================================================================
    /// The device session could not reach the ready state.
    #[error("Audio device session failed: {0}")]
    SessionFailed(String),

    /// The device session did not report ready in time.
    #[error("Audio device session not ready after {0:?}")]
    SessionTimeout(Duration),

    // ========================================================================
    // Source Errors
    // ========================================================================
    /// Failed to open or read a wave data source.
    #[error("Failed to open audio source: {0}")]
    SourceError(String),

    /// Invalid volume value.
    #[error("Invalid volume: {0} (must be between 0.0 and 1.0)")]
    InvalidVolume(f32),

    // ========================================================================
    // Format/Codec Errors
    // ========================================================================
    /// Audio format is not recognized or cannot be played.
    #[error("Unsupported or invalid audio format: {0}")]
    InvalidFormat(String),

    /// Codec is not supported by the decoder.
    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),

    /// Error occurred during audio decoding.
    #[error("Decoding error: {0}")]
    DecodingError(String),

    /// Seeking is not supported for this audio source.
    #[error("Seeking not supported")]
    SeekNotSupported,

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Engine configuration was rejected.
    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if this error is transient and the operation can be retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::Backend(BridgeError::NotAvailable(_)) | PlaybackError::SessionTimeout(_)
        )
    }

    /// Returns `true` if the audio backend rejected a command.
    pub fn is_backend_error(&self) -> bool {
        matches!(self, PlaybackError::Backend(_))
    }

    /// Returns `true` if this error is related to audio format/codec issues.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::InvalidFormat(_)
                | PlaybackError::UnsupportedCodec(_)
                | PlaybackError::DecodingError(_)
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
