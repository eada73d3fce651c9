//! Stock [`WaveDataProvider`](crate::WaveDataProvider) implementations.
//!
//! - [`StaticWaveProvider`]: a whole clip held in memory
//! - [`MemoryStreamProvider`]: in-memory PCM handed out chunk by chunk
//! - `DecodedStreamProvider` (feature `decoder`): compressed audio decoded on
//!   demand

mod memory;

pub use memory::{MemoryStreamProvider, StaticWaveProvider};

#[cfg(feature = "decoder")]
pub use crate::decoder::DecodedStreamProvider;
