use crate::config::SampleDepth;
use crate::negotiate::NegotiatedParams;

/// Why the transfer loop stopped without error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    /// The source returned fewer bytes than one chunk (including none).
    SourceExhausted,
    /// The sink reported zero free frames.
    SinkDrained,
}

/// Counters for one playback session, updated by the transfer loop.
#[derive(Clone, Debug, Default)]
pub struct StreamStatus {
    /// Device identifier the session is bound to.
    pub device: Option<String>,
    pub depth: Option<SampleDepth>,
    /// Effective device rate (frames per second).
    pub sample_rate: Option<u32>,
    pub channels: Option<u32>,
    /// Bytes skipped before the first sample (container header).
    pub data_offset: u64,
    /// Chunks submitted to the sink.
    pub chunks_written: u64,
    /// Frames the sink accepted.
    pub played_frames: u64,
    /// Writes that hit an underrun and were dropped after recovery.
    pub underrun_events: u64,
    /// Writes the sink accepted only partially.
    pub short_writes: u64,
    pub end_reason: Option<EndReason>,
}

impl StreamStatus {
    /// Fill device fields from negotiated parameters.
    pub fn bind(&mut self, device: &str, params: &NegotiatedParams) {
        self.device = Some(device.to_string());
        self.depth = Some(params.depth);
        self.sample_rate = Some(params.rate_hz);
        self.channels = Some(params.channels);
    }

    /// Playback time represented by accepted frames.
    pub fn elapsed_ms(&self) -> Option<u64> {
        match self.sample_rate {
            Some(sr) if sr > 0 => Some(self.played_frames.saturating_mul(1000) / sr as u64),
            _ => None,
        }
    }

    pub fn record_write(&mut self, requested: usize, accepted: usize) {
        self.chunks_written += 1;
        self.played_frames += accepted as u64;
        if accepted < requested {
            self.short_writes += 1;
        }
    }

    pub fn record_underrun(&mut self) {
        self.chunks_written += 1;
        self.underrun_events += 1;
    }

    /// Log a one-line session summary.
    pub fn log_summary(&self) {
        tracing::info!(
            device = self.device.as_deref().unwrap_or("-"),
            end_reason = ?self.end_reason,
            chunks = self.chunks_written,
            frames = self.played_frames,
            elapsed_ms = ?self.elapsed_ms(),
            underruns = self.underrun_events,
            short_writes = self.short_writes,
            "playback finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_uses_effective_rate() {
        let status = StreamStatus {
            sample_rate: Some(352_800),
            played_frames: 705_600,
            ..StreamStatus::default()
        };
        assert_eq!(status.elapsed_ms(), Some(2000));
    }

    #[test]
    fn elapsed_unknown_without_rate() {
        let status = StreamStatus {
            played_frames: 10,
            ..StreamStatus::default()
        };
        assert_eq!(status.elapsed_ms(), None);
    }

    #[test]
    fn write_counters() {
        let mut status = StreamStatus::default();
        status.record_write(100, 100);
        status.record_write(100, 60);
        status.record_underrun();

        assert_eq!(status.chunks_written, 3);
        assert_eq!(status.played_frames, 160);
        assert_eq!(status.short_writes, 1);
        assert_eq!(status.underrun_events, 1);
    }

    #[test]
    fn bind_copies_negotiated_fields() {
        let params = NegotiatedParams {
            depth: SampleDepth::Wide,
            requested_rate_hz: 176_400,
            rate_hz: 176_400,
            channels: 2,
            period_time_us: 1_000_000,
            avail_min_frames: 512,
            start_threshold_frames: 0,
        };
        let mut status = StreamStatus::default();
        status.bind("hw:MPD3", &params);

        assert_eq!(status.device.as_deref(), Some("hw:MPD3"));
        assert_eq!(status.depth, Some(SampleDepth::Wide));
        assert_eq!(status.sample_rate, Some(176_400));
        assert_eq!(status.channels, Some(2));
    }
}
