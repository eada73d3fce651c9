//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the audio engine:
//! - Logging and tracing infrastructure
//! - Engine configuration (chunk size, source defaults, session readiness)
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the playback core depends
//! on. It establishes the logging conventions and the configuration surface
//! shared by hosts.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{AudioEngineConfig, DEFAULT_CHUNK_BYTES};
pub use error::{Error, Result};
