//! Real-time DSD playback to an ALSA device.
//!
//! A session runs in one thread:
//! 1. **Scan** (`.dff` only): skip to the first byte of the `"DSD "` sound data chunk.
//! 2. **Negotiate**: open the device and fix access, format, rate, period, channel count and
//!    software thresholds.
//! 3. **Transfer**: wait for device capacity, read a clamped chunk, reorder it for the device
//!    encoding, write it; repeat until the source or the sink ends the stream.

pub mod config;
pub mod device;
pub mod error;
pub mod layout;
pub mod negotiate;
pub mod pipeline;
pub mod scan;
pub mod sink;
pub mod status;
pub mod transfer;

pub use config::{PlayerConfig, SampleDepth};
pub use error::{DeviceError, PlayerError, SetupStage};
pub use pipeline::{SourceFormat, play_file, play_source};
pub use status::{EndReason, StreamStatus};
