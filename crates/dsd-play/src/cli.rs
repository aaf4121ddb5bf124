use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use dsd_player::SampleDepth;
use dsd_player::config::{
    DEFAULT_BASE_RATE_HZ, DEFAULT_DEVICE_ID, DEFAULT_MAX_CHUNK_FRAMES, DEFAULT_PERIOD_TIME_US,
};

#[derive(Parser, Debug)]
#[command(name = "dsd-play", version)]
pub struct Args {
    /// Raw DSD stream, or a DSDIFF container ending in `.dff`
    #[arg(required_unless_present = "list_devices")]
    pub path: Option<PathBuf>,

    /// List output devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// ALSA device identifier
    #[arg(long, default_value = DEFAULT_DEVICE_ID)]
    pub device: String,

    /// Sample word width sent to the device
    #[arg(long, value_enum, default_value_t = Depth::Narrow)]
    pub depth: Depth,

    /// Max frames moved per transfer (higher => fewer wake-ups, more latency)
    #[arg(long, default_value_t = DEFAULT_MAX_CHUNK_FRAMES)]
    pub chunk_frames: usize,

    /// Rate in Hz before the depth divisor (352800 = DSD64)
    #[arg(long, default_value_t = DEFAULT_BASE_RATE_HZ)]
    pub base_rate: u32,

    /// Requested device period in microseconds
    #[arg(long, default_value_t = DEFAULT_PERIOD_TIME_US)]
    pub period_us: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Depth {
    /// 8-bit words (DSD_U8)
    Narrow,
    /// 16-bit words (DSD_U16_LE) at half the rate
    Wide,
}

impl From<Depth> for SampleDepth {
    fn from(depth: Depth) -> Self {
        match depth {
            Depth::Narrow => SampleDepth::Narrow,
            Depth::Wide => SampleDepth::Wide,
        }
    }
}
