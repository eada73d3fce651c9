//! # Streaming Playback Example
//!
//! Streams two seconds of a generated tone through the virtual backend in
//! small chunks, driving `update` from a timer the way a game loop would.
//!
//! Run with: `cargo run --example stream_demo --package core-playback`

use bridge_desktop::VirtualBackend;
use core_playback::providers::MemoryStreamProvider;
use core_playback::{shared, DeviceSession, PlaybackSource, SourceConfig, WaveFormat};
use core_runtime::config::AudioEngineConfig;
use core_runtime::logging::{init_logging, LoggingConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Interleaved 16-bit stereo sine wave.
fn tone(format: WaveFormat, frequency: f64, seconds: f64) -> Vec<u8> {
    let frames = (format.sample_rate as f64 * seconds) as usize;
    let mut pcm = Vec::with_capacity(frames * format.bytes_per_frame());
    for i in 0..frames {
        let t = i as f64 / format.sample_rate as f64;
        let sample = ((2.0 * std::f64::consts::PI * frequency * t).sin() * 0.3 * i16::MAX as f64) as i16;
        for _ in 0..format.channels {
            pcm.extend_from_slice(&sample.to_le_bytes());
        }
    }
    pcm
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::default().with_level(bridge_traits::LogLevel::Debug))?;

    let engine = AudioEngineConfig::low_latency();
    let backend = VirtualBackend::new();
    let session = DeviceSession::start(Box::new(backend.device("demo")))?;
    session.wait_ready_timeout(engine.ready_timeout).await?;

    let format = WaveFormat::cd_quality();
    let mut source = PlaybackSource::new(Arc::new(backend.clone()), SourceConfig::from(&engine))?;
    source.bind_waveform(Some(shared(MemoryStreamProvider::new(
        tone(format, 440.0, 2.0),
        format,
    ))))?;
    source.play()?;

    let started = Instant::now();
    let mut last = started;
    let mut refills = 0;
    while source.is_playing()? {
        core_async::sleep(Duration::from_millis(50)).await;
        let now = Instant::now();
        refills += source.update((now - last).as_secs_f32())?;
        last = now;
    }

    println!(
        "Played {:?} of audio with {} refills",
        started.elapsed(),
        refills
    );

    drop(source);
    session.shutdown()?;
    Ok(())
}
