//! # Symphonia Streaming Provider

use crate::decoder::sample_converter::SampleConverter;
use crate::error::{PlaybackError, Result};
use crate::format::WaveFormat;
use crate::provider::WaveDataProvider;
use bytes::Bytes;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::Time;
use tracing::{debug, error, info, instrument, warn};

const MAX_CONSECUTIVE_ERRORS: usize = 10;

/// Streaming provider that decodes compressed audio on demand.
///
/// Every [`stream_wave_data`](WaveDataProvider::stream_wave_data) call decodes
/// just enough packets to fill the requested chunk; decoded PCM that does not
/// fit is carried over to the next call. Output is always 16-bit, mono or
/// stereo at the track's sample rate.
///
/// With looping enabled the provider seeks back to the start when the track
/// ends and keeps filling, so it never reports end of stream.
pub struct DecodedStreamProvider {
    format_reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    format: WaveFormat,
    duration: Option<Duration>,
    /// Decoded PCM not yet handed out.
    pending: Vec<u8>,
    chunk: Vec<u8>,
    looping: bool,
    eof: bool,
    source_info: String,
}

impl DecodedStreamProvider {
    /// Open an audio file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            error!("Failed to open file {:?}: {}", path, e);
            PlaybackError::SourceError(format!("Failed to open file: {}", e))
        })?;

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        Self::from_media_source(Box::new(file), hint, path.display().to_string())
    }

    /// Decode an in-memory encoded file. `extension` helps format probing.
    pub fn from_bytes(data: impl Into<Bytes>, extension: Option<&str>) -> Result<Self> {
        let mut hint = Hint::new();
        if let Some(extension) = extension {
            hint.with_extension(extension);
        }
        let cursor = Cursor::new(data.into());
        Self::from_media_source(Box::new(cursor), hint, "memory buffer".to_string())
    }

    fn from_media_source(
        media_source: Box<dyn MediaSource>,
        hint: Hint,
        source_info: String,
    ) -> Result<Self> {
        let stream = MediaSourceStream::new(media_source, Default::default());
        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions {
                    enable_gapless: true,
                    ..Default::default()
                },
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                error!("Format probe failed for {}: {}", source_info, e);
                PlaybackError::InvalidFormat(format!("Failed to probe format: {}", e))
            })?;
        let format_reader = probed.format;

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| PlaybackError::UnsupportedCodec("no decodable audio track".to_string()))?;
        let track_id = track.id;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| PlaybackError::InvalidFormat("Missing sample rate".to_string()))?;

        // Some codecs only reveal their channel layout on the first decode.
        let channels = track
            .codec_params
            .channels
            .map(|ch| ch.count() as u16)
            .unwrap_or(2);
        if channels > 2 {
            return Err(PlaybackError::InvalidFormat(format!(
                "{} channels; only mono and stereo are playable",
                channels
            )));
        }

        let duration = track
            .codec_params
            .n_frames
            .map(|frames| Duration::from_secs_f64(frames as f64 / sample_rate as f64));

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| PlaybackError::UnsupportedCodec(e.to_string()))?;

        info!(
            source = %source_info,
            sample_rate,
            channels,
            ?duration,
            "Opened decoded stream"
        );

        Ok(Self {
            format_reader,
            decoder,
            track_id,
            format: WaveFormat::new(channels, 16, sample_rate),
            duration,
            pending: Vec::new(),
            chunk: Vec::new(),
            looping: false,
            eof: false,
            source_info,
        })
    }

    /// Seek back to the start instead of ending.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Track length, when the container declares it.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Reposition the reader and drop any carried-over PCM.
    pub fn try_seek(&mut self, seconds: f64) -> Result<()> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(PlaybackError::DecodingError(format!(
                "invalid seek target {}",
                seconds
            )));
        }
        self.format_reader
            .seek(
                SeekMode::Accurate,
                SeekTo::Time {
                    time: Time::from(seconds),
                    track_id: Some(self.track_id),
                },
            )
            .map_err(|e| match e {
                SymphoniaError::Unsupported(_) => PlaybackError::SeekNotSupported,
                other => PlaybackError::DecodingError(format!("Seek failed: {}", other)),
            })?;
        self.decoder.reset();
        self.pending.clear();
        self.eof = false;
        debug!(source = %self.source_info, seconds, "Decoded stream repositioned");
        Ok(())
    }

    /// Decode the next packet of the selected track into `pending`.
    ///
    /// Returns `Ok(false)` at end of stream. Corrupt packets are skipped
    /// until too many fail in a row.
    fn decode_next_packet(&mut self) -> Result<bool> {
        let mut consecutive_errors = 0;

        loop {
            let packet = match self.format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Ok(false);
                }
                Err(SymphoniaError::ResetRequired) => {
                    return Err(PlaybackError::DecodingError(
                        "Track list changed, reset required".to_string(),
                    ));
                }
                Err(e) => {
                    return Err(PlaybackError::DecodingError(format!(
                        "Failed to read packet: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    let channels = decoded.spec().channels.count() as u16;
                    if channels > 2 {
                        return Err(PlaybackError::InvalidFormat(format!(
                            "{} channels; only mono and stereo are playable",
                            channels
                        )));
                    }
                    if channels != self.format.channels {
                        debug!(
                            from = self.format.channels,
                            to = channels,
                            "Channel count detected from decoded audio"
                        );
                        self.format.channels = channels;
                    }
                    SampleConverter::append_interleaved_i16(&decoded, &mut self.pending);
                    return Ok(true);
                }
                Err(e @ (SymphoniaError::IoError(_) | SymphoniaError::DecodeError(_))) => {
                    consecutive_errors += 1;
                    warn!(
                        "Skipping corrupt packet (attempt {}/{}): {}",
                        consecutive_errors, MAX_CONSECUTIVE_ERRORS, e
                    );
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        return Err(PlaybackError::DecodingError(format!(
                            "Decoder failure after {} failed packets",
                            MAX_CONSECUTIVE_ERRORS
                        )));
                    }
                }
                Err(e) => {
                    return Err(PlaybackError::DecodingError(format!(
                        "Failed to decode packet: {}",
                        e
                    )));
                }
            }
        }
    }
}

impl WaveDataProvider for DecodedStreamProvider {
    fn wave_data(&self) -> &[u8] {
        &self.chunk
    }

    fn format(&self) -> WaveFormat {
        self.format
    }

    fn is_eof(&self) -> bool {
        self.eof && !self.looping
    }

    fn seek(&mut self, seconds: f32) {
        if let Err(e) = self.try_seek(seconds as f64) {
            warn!(source = %self.source_info, error = %e, "Seek failed");
        }
    }

    fn is_streaming(&self) -> bool {
        true
    }

    fn stream_wave_data(&mut self, requested: usize) -> usize {
        self.chunk.clear();
        let requested = self.format.align_down(requested);
        let mut rewound_empty = false;

        while self.chunk.len() < requested {
            if self.pending.is_empty() {
                if self.eof && !self.looping {
                    break;
                }
                match self.decode_next_packet() {
                    Ok(true) => {
                        rewound_empty = false;
                        continue;
                    }
                    Ok(false) if self.looping && !rewound_empty => {
                        rewound_empty = true;
                        if let Err(e) = self.try_seek(0.0) {
                            warn!(source = %self.source_info, error = %e, "Rewind failed");
                            self.looping = false;
                            self.eof = true;
                            break;
                        }
                        continue;
                    }
                    Ok(false) => {
                        debug!(source = %self.source_info, "Reached end of stream");
                        self.eof = true;
                        break;
                    }
                    Err(e) => {
                        error!(source = %self.source_info, error = %e, "Decoding stopped");
                        self.looping = false;
                        self.eof = true;
                        break;
                    }
                }
            }

            let take = (requested - self.chunk.len()).min(self.pending.len());
            self.chunk.extend(self.pending.drain(..take));
        }

        self.chunk.len()
    }
}
