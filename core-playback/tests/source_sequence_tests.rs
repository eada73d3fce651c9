//! Exact backend command sequences issued by a playback source.

use bridge_traits::audio::{AudioBackend, BufferId, SampleLayout, SourceId, SourceState};
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use core_playback::providers::{MemoryStreamProvider, StaticWaveProvider};
use core_playback::{shared, PlaybackSource, SourceConfig, WaveFormat};
use mockall::{mock, Sequence};
use std::sync::Arc;

mock! {
    Backend {}

    impl AudioBackend for Backend {
        fn create_source(&self) -> BridgeResult<SourceId>;
        fn delete_source(&self, source: SourceId) -> BridgeResult<()>;
        fn create_buffers(&self, count: usize) -> BridgeResult<Vec<BufferId>>;
        fn delete_buffers(&self, buffers: &[BufferId]) -> BridgeResult<()>;
        fn buffer_data(&self, buffer: BufferId, layout: SampleLayout, data: &[u8], sample_rate: u32) -> BridgeResult<()>;
        fn attach_buffer(&self, source: SourceId, buffer: Option<BufferId>) -> BridgeResult<()>;
        fn queue_buffers(&self, source: SourceId, buffers: &[BufferId]) -> BridgeResult<()>;
        fn unqueue_buffers(&self, source: SourceId, count: usize) -> BridgeResult<Vec<BufferId>>;
        fn play(&self, source: SourceId) -> BridgeResult<()>;
        fn stop(&self, source: SourceId) -> BridgeResult<()>;
        fn pause(&self, source: SourceId) -> BridgeResult<()>;
        fn source_state(&self, source: SourceId) -> BridgeResult<SourceState>;
        fn buffers_queued(&self, source: SourceId) -> BridgeResult<usize>;
        fn buffers_processed(&self, source: SourceId) -> BridgeResult<usize>;
        fn set_gain(&self, source: SourceId, gain: f32) -> BridgeResult<()>;
        fn set_looping(&self, source: SourceId, looping: bool) -> BridgeResult<()>;
    }
}

const SOURCE: u32 = 1;
const FIRST: u32 = 10;
const SECOND: u32 = 11;
const CHUNK: usize = 4;

fn src() -> SourceId {
    SourceId::from_raw(SOURCE)
}

fn buf(raw: u32) -> BufferId {
    BufferId::from_raw(raw)
}

fn stereo16() -> WaveFormat {
    WaveFormat::new(2, 16, 22_050)
}

/// Backend with source creation and teardown accepted in any order.
fn backend() -> MockBackend {
    let mut backend = MockBackend::new();
    backend.expect_create_source().returning(|| Ok(src()));
    backend.expect_set_gain().returning(|_, _| Ok(()));
    backend.expect_set_looping().returning(|_, _| Ok(()));
    backend.expect_stop().returning(|_| Ok(()));
    backend.expect_attach_buffer().returning(|_, _| Ok(()));
    backend.expect_delete_source().returning(|_| Ok(()));
    backend.expect_delete_buffers().returning(|_| Ok(()));
    backend
}

fn source(backend: MockBackend) -> PlaybackSource {
    PlaybackSource::new(
        Arc::new(backend),
        SourceConfig::default().with_chunk_bytes(CHUNK),
    )
    .unwrap()
}

#[test]
fn creation_applies_gain_and_looping() {
    let mut backend = MockBackend::new();
    backend.expect_create_source().times(1).returning(|| Ok(src()));
    backend
        .expect_set_gain()
        .withf(|_, gain| *gain == 0.25)
        .times(1)
        .returning(|_, _| Ok(()));
    backend
        .expect_set_looping()
        .withf(|_, looping| *looping)
        .times(1)
        .returning(|_, _| Ok(()));
    backend.expect_stop().returning(|_| Ok(()));
    backend.expect_delete_source().times(1).returning(|_| Ok(()));

    let source = PlaybackSource::new(
        Arc::new(backend),
        SourceConfig::default()
            .with_initial_gain(0.25)
            .with_looping(true),
    )
    .unwrap();
    assert_eq!(source.id(), src());
}

#[test]
fn static_bind_uploads_a_single_buffer() {
    let mut backend = backend();
    let mut seq = Sequence::new();

    backend
        .expect_create_buffers()
        .withf(|count| *count == 1)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(vec![buf(FIRST)]));
    backend
        .expect_buffer_data()
        .withf(|buffer, layout, data, rate| {
            *buffer == buf(FIRST)
                && *layout == SampleLayout::Mono16
                && data.len() == 6
                && *rate == 8_000
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _, _| Ok(()));

    let mut source = source(backend);
    let clip = StaticWaveProvider::new(vec![0u8; 6], WaveFormat::new(1, 16, 8_000));
    source.bind_waveform(Some(shared(clip))).unwrap();
}

#[test]
fn play_fills_both_buffers_before_starting() {
    let mut backend = backend();
    let mut seq = Sequence::new();

    backend
        .expect_create_buffers()
        .withf(|count| *count == 2)
        .returning(|_| Ok(vec![buf(FIRST), buf(SECOND)]));
    backend
        .expect_source_state()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(SourceState::Initial));
    backend
        .expect_buffers_queued()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(0));
    backend
        .expect_buffer_data()
        .withf(|buffer, layout, data, _| {
            *buffer == buf(FIRST) && *layout == SampleLayout::Stereo16 && data[..] == [1, 2, 3, 4]
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _, _| Ok(()));
    backend
        .expect_buffer_data()
        .withf(|buffer, _, data, _| *buffer == buf(SECOND) && data[..] == [5, 6, 7, 8])
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _, _| Ok(()));
    backend
        .expect_queue_buffers()
        .withf(|_, buffers| buffers.len() == 2 && buffers[0] == buf(FIRST) && buffers[1] == buf(SECOND))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    backend
        .expect_play()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    let mut source = source(backend);
    let stream = MemoryStreamProvider::new((1..=16).collect::<Vec<u8>>(), stereo16());
    source.bind_waveform(Some(shared(stream))).unwrap();
    source.play().unwrap();
}

#[test]
fn update_recycles_every_processed_buffer() {
    let mut backend = backend();

    backend
        .expect_create_buffers()
        .returning(|_| Ok(vec![buf(FIRST), buf(SECOND)]));
    backend
        .expect_source_state()
        .times(1)
        .returning(|_| Ok(SourceState::Playing));
    backend
        .expect_buffers_processed()
        .times(1)
        .returning(|_| Ok(2));

    let mut drained = vec![buf(FIRST), buf(SECOND)].into_iter();
    backend
        .expect_unqueue_buffers()
        .withf(|_, count| *count == 1)
        .times(2)
        .returning(move |_, _| Ok(drained.next().into_iter().collect()));
    for id in [FIRST, SECOND] {
        backend
            .expect_buffer_data()
            .withf(move |buffer, _, data, _| *buffer == buf(id) && data.len() == CHUNK)
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        backend
            .expect_queue_buffers()
            .withf(move |_, buffers| buffers.len() == 1 && buffers[0] == buf(id))
            .times(1)
            .returning(|_, _| Ok(()));
    }

    let mut source = source(backend);
    let stream = MemoryStreamProvider::new(vec![0u8; 64], stereo16());
    source.bind_waveform(Some(shared(stream))).unwrap();
    assert_eq!(source.update(0.016).unwrap(), 2);
    assert_eq!(source.buffer_pool().unwrap().queued_count(), 2);
}

#[test]
fn update_does_nothing_while_stopped() {
    let mut backend = backend();
    backend
        .expect_create_buffers()
        .returning(|_| Ok(vec![buf(FIRST), buf(SECOND)]));
    backend
        .expect_source_state()
        .returning(|_| Ok(SourceState::Stopped));
    backend.expect_buffers_processed().never();
    backend.expect_unqueue_buffers().never();

    let mut source = source(backend);
    let stream = MemoryStreamProvider::new(vec![0u8; 64], stereo16());
    source.bind_waveform(Some(shared(stream))).unwrap();
    assert_eq!(source.update(0.016).unwrap(), 0);
}

#[test]
fn playing_source_is_not_reprimed() {
    let mut backend = backend();
    backend
        .expect_create_buffers()
        .returning(|_| Ok(vec![buf(FIRST), buf(SECOND)]));
    backend
        .expect_source_state()
        .returning(|_| Ok(SourceState::Playing));
    backend.expect_buffer_data().never();
    backend.expect_play().never();

    let mut source = source(backend);
    let stream = MemoryStreamProvider::new(vec![0u8; 64], stereo16());
    source.bind_waveform(Some(shared(stream))).unwrap();
    source.play().unwrap();
}

#[test]
fn pause_unqueues_everything_queued() {
    let mut backend = backend();
    let mut seq = Sequence::new();

    backend
        .expect_create_buffers()
        .returning(|_| Ok(vec![buf(FIRST), buf(SECOND)]));
    backend
        .expect_pause()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    backend
        .expect_buffers_queued()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(2));
    backend
        .expect_unqueue_buffers()
        .withf(|_, count| *count == 2)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(vec![buf(FIRST), buf(SECOND)]));

    let mut source = source(backend);
    let stream = MemoryStreamProvider::new(vec![0u8; 64], stereo16());
    source.bind_waveform(Some(shared(stream))).unwrap();
    source.pause().unwrap();
    assert_eq!(source.buffer_pool().unwrap().queued_count(), 0);
}

#[test]
fn failed_fill_is_reported() {
    let mut backend = backend();
    backend
        .expect_create_buffers()
        .returning(|_| Ok(vec![buf(FIRST), buf(SECOND)]));
    backend
        .expect_source_state()
        .returning(|_| Ok(SourceState::Stopped));
    backend.expect_buffers_queued().returning(|_| Ok(0));
    backend
        .expect_buffer_data()
        .returning(|_, _, _, _| Err(BridgeError::OperationFailed("out of memory".into())));
    backend.expect_play().never();

    let mut source = source(backend);
    let stream = MemoryStreamProvider::new(vec![0u8; 64], stereo16());
    source.bind_waveform(Some(shared(stream))).unwrap();
    let err = source.play().unwrap_err();
    assert!(err.is_backend_error());
}

#[test]
fn failed_release_keeps_the_binding() {
    let mut backend = MockBackend::new();
    backend.expect_create_source().returning(|| Ok(src()));
    backend.expect_set_gain().returning(|_, _| Ok(()));
    backend.expect_set_looping().returning(|_, _| Ok(()));
    backend
        .expect_create_buffers()
        .times(1)
        .returning(|_| Ok(vec![buf(FIRST), buf(SECOND)]));
    backend
        .expect_stop()
        .returning(|_| Err(BridgeError::NotAvailable("device lost".into())));
    backend.expect_attach_buffer().never();
    backend.expect_delete_source().returning(|_| Ok(()));
    backend.expect_delete_buffers().times(1).returning(|_| Ok(()));

    let mut source = source(backend);
    let stream = shared(MemoryStreamProvider::new(vec![0u8; 64], stereo16()));
    source.bind_waveform(Some(stream.clone())).unwrap();

    let err = source.bind_waveform(None).unwrap_err();
    assert!(err.is_transient());
    assert!(Arc::ptr_eq(source.provider().unwrap(), &stream));
    assert_eq!(source.buffer_pool().unwrap().len(), 2);
}

#[test]
fn rejected_static_clip_is_released() {
    let mut backend = MockBackend::new();
    backend.expect_create_source().returning(|| Ok(src()));
    backend.expect_set_gain().returning(|_, _| Ok(()));
    backend.expect_set_looping().returning(|_, _| Ok(()));
    backend.expect_stop().returning(|_| Ok(()));
    backend
        .expect_create_buffers()
        .returning(|_| Ok(vec![buf(FIRST)]));
    backend
        .expect_buffer_data()
        .returning(|_, _, _, _| Err(BridgeError::OperationFailed("format rejected".into())));
    backend.expect_attach_buffer().never();
    backend
        .expect_delete_buffers()
        .withf(|buffers| buffers.len() == 1 && buffers[0] == buf(FIRST))
        .times(1)
        .returning(|_| Ok(()));
    backend.expect_delete_source().returning(|_| Ok(()));

    let mut source = source(backend);
    let clip = StaticWaveProvider::new(vec![0u8; 6], WaveFormat::new(1, 16, 8_000));
    let err = source.bind_waveform(Some(shared(clip))).unwrap_err();

    assert!(err.is_backend_error());
    assert!(source.provider().is_none());
    assert!(source.buffer_pool().is_none());
}
