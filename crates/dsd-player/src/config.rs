use std::fmt;
use std::time::Duration;

/// Stereo is the only layout the player streams.
pub const CHANNELS: u32 = 2;

/// DSD64 rate expressed in 8-bit words per channel per second.
pub const DEFAULT_BASE_RATE_HZ: u32 = 352_800;

/// Upper bound on frames moved per transfer iteration.
pub const DEFAULT_MAX_CHUNK_FRAMES: usize = 128 * 1024;

pub const DEFAULT_PERIOD_TIME_US: u32 = 1_000_000;

pub const DEFAULT_DEVICE_ID: &str = "hw:MPD3";

pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Width of one channel-sample as delivered to the device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SampleDepth {
    /// One byte per channel-sample (`DSD_U8`).
    #[default]
    Narrow,
    /// Two bytes per channel-sample (`DSD_U16_LE`), half the word rate.
    Wide,
}

impl SampleDepth {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            Self::Narrow => 1,
            Self::Wide => 2,
        }
    }

    /// Bytes occupied by one stereo frame.
    pub fn frame_bytes(self) -> usize {
        self.bytes_per_sample() * CHANNELS as usize
    }

    /// Divisor applied to the base rate: wider words arrive less often.
    pub fn rate_divisor(self) -> u32 {
        match self {
            Self::Narrow => 1,
            Self::Wide => 2,
        }
    }

    pub fn alsa_format(self) -> alsa::pcm::Format {
        match self {
            Self::Narrow => alsa::pcm::Format::DSDU8,
            Self::Wide => alsa::pcm::Format::DSDU16LE,
        }
    }
}

impl fmt::Display for SampleDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Narrow => f.write_str("DSD_U8"),
            Self::Wide => f.write_str("DSD_U16_LE"),
        }
    }
}

/// Device and transfer parameters for one playback session.
#[derive(Clone, Debug)]
pub struct PlayerConfig {
    /// ALSA device identifier, e.g. `hw:MPD3`.
    pub device_id: String,
    pub depth: SampleDepth,
    /// Rate before the depth divisor is applied.
    pub base_rate_hz: u32,
    /// Frames moved per transfer iteration at most.
    pub max_chunk_frames: usize,
    /// Requested period length; the device may round it.
    pub period_time_us: u32,
    /// Free frames that must accumulate before a capacity wait returns.
    pub avail_min_frames: usize,
    /// Bound on a single capacity wait.
    pub wait_timeout: Duration,
}

impl PlayerConfig {
    /// Rate hint passed to the device.
    pub fn requested_rate_hz(&self) -> u32 {
        self.base_rate_hz / self.depth.rate_divisor()
    }

    /// Capacity of each transfer buffer in bytes, or `None` when the ceiling is zero or the
    /// size does not fit in `usize`.
    pub fn chunk_bytes(&self) -> Option<usize> {
        if self.max_chunk_frames == 0 {
            return None;
        }
        self.max_chunk_frames.checked_mul(self.depth.frame_bytes())
    }

    /// Replace the chunk ceiling and keep the wake-up threshold at half of it.
    pub fn with_max_chunk_frames(mut self, frames: usize) -> Self {
        self.max_chunk_frames = frames.max(1);
        self.avail_min_frames = (self.max_chunk_frames / 2).max(1);
        self
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            device_id: DEFAULT_DEVICE_ID.to_string(),
            depth: SampleDepth::Narrow,
            base_rate_hz: DEFAULT_BASE_RATE_HZ,
            max_chunk_frames: DEFAULT_MAX_CHUNK_FRAMES,
            period_time_us: DEFAULT_PERIOD_TIME_US,
            avail_min_frames: DEFAULT_MAX_CHUNK_FRAMES / 2,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_widths_follow_depth() {
        assert_eq!(SampleDepth::Narrow.frame_bytes(), 2);
        assert_eq!(SampleDepth::Wide.frame_bytes(), 4);
    }

    #[test]
    fn requested_rate_divides_by_depth() {
        let mut cfg = PlayerConfig::default();
        assert_eq!(cfg.requested_rate_hz(), 352_800);
        cfg.depth = SampleDepth::Wide;
        assert_eq!(cfg.requested_rate_hz(), 176_400);
    }

    #[test]
    fn chunk_bytes_cover_max_chunk() {
        let cfg = PlayerConfig {
            depth: SampleDepth::Wide,
            ..PlayerConfig::default()
        };
        assert_eq!(cfg.chunk_bytes(), Some(128 * 1024 * 4));
    }

    #[test]
    fn chunk_bytes_rejects_zero_and_overflow() {
        let cfg = PlayerConfig {
            max_chunk_frames: 0,
            ..PlayerConfig::default()
        };
        assert_eq!(cfg.chunk_bytes(), None);

        let cfg = PlayerConfig::default().with_max_chunk_frames(1 << (usize::BITS - 1));
        assert_eq!(cfg.chunk_bytes(), None);
    }

    #[test]
    fn with_max_chunk_frames_keeps_half_threshold() {
        let cfg = PlayerConfig::default().with_max_chunk_frames(1000);
        assert_eq!(cfg.max_chunk_frames, 1000);
        assert_eq!(cfg.avail_min_frames, 500);

        let cfg = PlayerConfig::default().with_max_chunk_frames(0);
        assert_eq!(cfg.max_chunk_frames, 1);
        assert_eq!(cfg.avail_min_frames, 1);
    }
}
