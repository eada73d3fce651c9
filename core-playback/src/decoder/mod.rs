//! # Decoding Provider
//!
//! [`DecodedStreamProvider`] streams compressed audio through symphonia and
//! hands it to a source as interleaved signed 16-bit PCM, the widest layout a
//! backend accepts.
//!
//! ```text
//! MediaSourceStream → FormatReader → Decoder → SampleConverter → chunk
//! ```
//!
//! Formats and codecs are whatever the enabled symphonia features cover.

mod sample_converter;
mod symphonia;

pub use self::symphonia::DecodedStreamProvider;
pub use sample_converter::SampleConverter;
