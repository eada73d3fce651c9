//! # Sample Format Converter
//!
//! Converts decoded audio to interleaved little-endian i16 bytes.

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::conv::IntoSample;
use symphonia::core::sample::Sample;

/// Normalizes symphonia output to the PCM layout backends accept.
///
/// Symphonia decodes to planar buffers of whatever sample type the codec
/// uses (u8 through f64). Backends want interleaved 16-bit frames
/// (LRLRLR... for stereo).
pub struct SampleConverter;

impl SampleConverter {
    /// Append `buffer` to `out` as interleaved little-endian i16 samples.
    pub fn append_interleaved_i16(buffer: &AudioBufferRef<'_>, out: &mut Vec<u8>) {
        match buffer {
            AudioBufferRef::U8(buf) => Self::interleave(buf, out),
            AudioBufferRef::U16(buf) => Self::interleave(buf, out),
            AudioBufferRef::U24(buf) => Self::interleave(buf, out),
            AudioBufferRef::U32(buf) => Self::interleave(buf, out),
            AudioBufferRef::S8(buf) => Self::interleave(buf, out),
            AudioBufferRef::S16(buf) => Self::interleave(buf, out),
            AudioBufferRef::S24(buf) => Self::interleave(buf, out),
            AudioBufferRef::S32(buf) => Self::interleave(buf, out),
            AudioBufferRef::F32(buf) => Self::interleave(buf, out),
            AudioBufferRef::F64(buf) => Self::interleave(buf, out),
        }
    }

    fn interleave<S>(buffer: &AudioBuffer<S>, out: &mut Vec<u8>)
    where
        S: Sample + IntoSample<i16>,
    {
        let channels = buffer.spec().channels.count();
        let frames = buffer.frames();
        out.reserve(frames * channels * 2);

        for frame in 0..frames {
            for channel in 0..channels {
                let sample: i16 = buffer.chan(channel)[frame].into_sample();
                out.extend_from_slice(&sample.to_le_bytes());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use symphonia::core::audio::{Channels, SignalSpec};

    #[test]
    fn interleaves_stereo_f32() {
        let spec = SignalSpec::new(44_100, Channels::FRONT_LEFT | Channels::FRONT_RIGHT);
        let mut buffer = AudioBuffer::<f32>::new(4, spec);
        buffer.render_reserved(Some(2));
        buffer.chan_mut(0).copy_from_slice(&[1.0, 0.0]);
        buffer.chan_mut(1).copy_from_slice(&[-1.0, 0.0]);

        let mut out = Vec::new();
        SampleConverter::append_interleaved_i16(&AudioBufferRef::F32(Cow::Borrowed(&buffer)), &mut out);

        assert_eq!(out.len(), 8);
        let left = i16::from_le_bytes([out[0], out[1]]);
        let right = i16::from_le_bytes([out[2], out[3]]);
        assert_eq!(left, i16::MAX);
        assert_eq!(right, i16::MIN);
        assert_eq!(&out[4..], &[0, 0, 0, 0]);
    }

    #[test]
    fn passes_s16_through() {
        let spec = SignalSpec::new(8_000, Channels::FRONT_CENTRE);
        let mut buffer = AudioBuffer::<i16>::new(3, spec);
        buffer.render_reserved(Some(3));
        buffer.chan_mut(0).copy_from_slice(&[1, -2, 300]);

        let mut out = Vec::new();
        SampleConverter::append_interleaved_i16(&AudioBufferRef::S16(Cow::Borrowed(&buffer)), &mut out);

        let samples: Vec<i16> = out
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(samples, vec![1, -2, 300]);
    }
}
