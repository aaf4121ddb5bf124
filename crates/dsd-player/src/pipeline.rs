//! Session wiring: scan → allocate → open sink → transfer.
//!
//! Buffers are allocated before the sink is opened so an allocation failure never leaves a
//! device claimed. The sink is opened (and negotiated) only after the source has been positioned
//! at its first sample.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::config::PlayerConfig;
use crate::error::Result;
use crate::negotiate::NegotiatedParams;
use crate::scan::{SoundData, is_container_path, skip_to_sound_data};
use crate::sink::{AlsaSink, PcmSink};
use crate::status::StreamStatus;
use crate::transfer::{Transfer, TransferBuffers};

/// Source framing, decided from the file name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    /// Raw interleaved samples from offset 0.
    Raw,
    /// DSDIFF container; samples start after the `"DSD "` chunk header.
    Container,
}

impl SourceFormat {
    pub fn for_path(path: &Path) -> Self {
        if is_container_path(path) {
            Self::Container
        } else {
            Self::Raw
        }
    }
}

/// Play `source` on a sink produced by `open_sink`.
///
/// `open_sink` must return a sink that is negotiated and ready for the first write.
/// `source_len`, when known, is only used to flag a container whose declared data length
/// disagrees with the file; playback is not affected.
pub fn play_source<R, S, F>(
    mut source: R,
    format: SourceFormat,
    source_len: Option<u64>,
    cfg: &PlayerConfig,
    open_sink: F,
) -> Result<StreamStatus>
where
    R: Read,
    S: PcmSink,
    F: FnOnce(&PlayerConfig) -> Result<(S, NegotiatedParams)>,
{
    let mut status = StreamStatus::default();

    if format == SourceFormat::Container {
        let SoundData {
            offset,
            declared_len,
        } = skip_to_sound_data(&mut source)?;
        status.data_offset = offset;
        if let Some(len) = source_len {
            if offset.checked_add(declared_len) != Some(len) {
                tracing::warn!(
                    offset,
                    declared_len,
                    file_len = len,
                    "declared sound data length disagrees with file length"
                );
            }
        }
    }

    let buffers = TransferBuffers::for_config(cfg)?;
    tracing::debug!(bytes = buffers.capacity_bytes(), "transfer buffers allocated");

    let (mut sink, params) = open_sink(cfg)?;
    status.bind(&cfg.device_id, &params);

    Transfer::new(source, &mut sink, buffers, cfg).run(&mut status)?;
    Ok(status)
}

/// Open `cfg.device_id` through ALSA, negotiate, and prepare it for streaming.
pub fn open_alsa(cfg: &PlayerConfig) -> Result<(AlsaSink, NegotiatedParams)> {
    let mut sink = AlsaSink::open(cfg)?;
    sink.prepare()?;
    let params = sink.params().clone();
    Ok((sink, params))
}

/// Play a file from disk on the configured ALSA device.
pub fn play_file(path: &Path, cfg: &PlayerConfig) -> Result<StreamStatus> {
    let file = File::open(path)?;
    let format = SourceFormat::for_path(path);
    let file_len = file.metadata().map(|m| m.len()).ok();
    tracing::info!(path = %path.display(), ?format, "source opened");

    play_source(BufReader::new(file), format, file_len, cfg, open_alsa)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SampleDepth;
    use crate::error::{PlayerError, SetupStage};
    use crate::negotiate::{negotiate, tests::ScriptedBackend};
    use crate::scan::SOUND_DATA_MARKER;
    use crate::sink::mock::MockSink;
    use crate::status::EndReason;
    use std::io::Cursor;

    fn open_mock(
        sink: MockSink,
    ) -> impl FnOnce(&PlayerConfig) -> Result<(MockSink, NegotiatedParams)> {
        move |cfg: &PlayerConfig| {
            let params = negotiate(&mut ScriptedBackend::default(), cfg)?;
            Ok((sink, params))
        }
    }

    #[test]
    fn one_raw_chunk_is_written_verbatim() {
        let cfg = PlayerConfig::default().with_max_chunk_frames(256);
        let data: Vec<u8> = (0..512u32).map(|i| (i * 7 % 251) as u8).collect();
        let mut written = Vec::new();

        let status = play_source(
            Cursor::new(data.clone()),
            SourceFormat::Raw,
            None,
            &cfg,
            |cfg| {
                let (sink, params) = open_mock(MockSink::always(1 << 20))(cfg)?;
                Ok((Recorder::new(sink, &mut written), params))
            },
        )
        .unwrap();

        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, data);
        assert_eq!(written[0].1, 256);
        assert_eq!(status.end_reason, Some(EndReason::SourceExhausted));
        assert_eq!(status.played_frames, 256);
        assert_eq!(status.sample_rate, Some(352_800));
    }

    #[test]
    fn container_header_is_skipped() {
        let cfg = PlayerConfig {
            depth: SampleDepth::Wide,
            ..PlayerConfig::default()
        }
        .with_max_chunk_frames(1);
        let mut bytes = b"FRM8\0\0\0\0\0\0\0\x10DSD".to_vec();
        bytes.extend_from_slice(&SOUND_DATA_MARKER);
        bytes.extend_from_slice(&4u64.to_be_bytes());
        bytes.extend_from_slice(&[1, 2, 3, 4]);
        let mut written = Vec::new();

        let status = play_source(
            Cursor::new(bytes),
            SourceFormat::Container,
            Some(31),
            &cfg,
            |cfg| {
                let (sink, params) = open_mock(MockSink::always(8))(cfg)?;
                Ok((Recorder::new(sink, &mut written), params))
            },
        )
        .unwrap();

        assert_eq!(status.data_offset, 15 + 12);
        assert_eq!(written, vec![(vec![3, 1, 4, 2], 1)]);
    }

    #[test]
    fn missing_marker_never_opens_sink() {
        let cfg = PlayerConfig::default();
        let mut opened = false;

        let result = play_source(
            Cursor::new(b"no sound data here".to_vec()),
            SourceFormat::Container,
            None,
            &cfg,
            |cfg| {
                opened = true;
                open_mock(MockSink::always(1))(cfg)
            },
        );

        assert!(matches!(result, Err(PlayerError::MarkerNotFound)));
        assert!(!opened);
    }

    #[test]
    fn zero_chunk_ceiling_never_opens_sink() {
        let cfg = PlayerConfig {
            max_chunk_frames: 0,
            ..PlayerConfig::default()
        };
        let mut opened = false;

        let result = play_source(
            Cursor::new(vec![0u8; 64]),
            SourceFormat::Raw,
            None,
            &cfg,
            |cfg| {
                opened = true;
                open_mock(MockSink::always(4))(cfg)
            },
        );

        assert!(matches!(result, Err(PlayerError::ChunkSize { frames: 0 })));
        assert!(!opened);
    }

    #[test]
    fn failed_negotiation_streams_nothing() {
        let cfg = PlayerConfig::default();
        let mut source = Cursor::new(vec![0u8; 64]);

        let result = play_source(&mut source, SourceFormat::Raw, None, &cfg, |cfg| {
            let mut backend = ScriptedBackend {
                fail_at: Some(SetupStage::Rate),
                ..ScriptedBackend::default()
            };
            let params = negotiate(&mut backend, cfg)?;
            Ok((MockSink::always(1), params))
        });

        match result {
            Err(PlayerError::Setup { stage, .. }) => assert_eq!(stage, SetupStage::Rate),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(source.position(), 0);
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(SourceFormat::for_path(Path::new("x.dff")), SourceFormat::Container);
        assert_eq!(SourceFormat::for_path(Path::new("x.bin")), SourceFormat::Raw);
    }

    #[test]
    fn missing_file_is_source_error() {
        let path = std::env::temp_dir().join("dsd-player-does-not-exist.dff");
        let result = play_file(&path, &PlayerConfig::default());
        assert!(matches!(result, Err(PlayerError::Source(_))));
    }

    /// Forwards to a mock sink and copies every write out to the test.
    struct Recorder<'a> {
        inner: MockSink,
        out: &'a mut Vec<(Vec<u8>, usize)>,
    }

    impl<'a> Recorder<'a> {
        fn new(inner: MockSink, out: &'a mut Vec<(Vec<u8>, usize)>) -> Self {
            Self { inner, out }
        }
    }

    impl PcmSink for Recorder<'_> {
        fn wait_ready(
            &mut self,
            timeout: std::time::Duration,
        ) -> std::result::Result<bool, crate::error::DeviceError> {
            self.inner.wait_ready(timeout)
        }

        fn avail_frames(&mut self) -> std::result::Result<i64, crate::error::DeviceError> {
            self.inner.avail_frames()
        }

        fn write_frames(
            &mut self,
            data: &[u8],
            frames: usize,
        ) -> std::result::Result<crate::sink::WriteStatus, crate::error::DeviceError> {
            self.out.push((data.to_vec(), frames));
            self.inner.write_frames(data, frames)
        }
    }
}
