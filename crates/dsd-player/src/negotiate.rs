//! Device parameter negotiation.
//!
//! The steps mirror the ALSA configuration sequence: hardware parameters (access, format, rate,
//! period, channels) are committed as a block, then software parameters (wake-up threshold and
//! start threshold) are loaded from the device's current values, overridden, and committed.
//! The first rejected step ends negotiation and reports which stage failed; the caller must drop
//! the half-configured device.

use crate::config::{CHANNELS, PlayerConfig, SampleDepth};
use crate::error::{DeviceError, PlayerError, Result, SetupStage};

/// Stream starts on the first write instead of waiting for a fill level.
pub const START_THRESHOLD_FRAMES: usize = 0;

/// Step-by-step parameter interface of a playback device.
///
/// Each call corresponds to one [`SetupStage`]. Calls are made in stage order and stop at the
/// first error.
pub trait ParamBackend {
    fn set_access_interleaved(&mut self) -> std::result::Result<(), DeviceError>;
    fn set_format(&mut self, depth: SampleDepth) -> std::result::Result<(), DeviceError>;
    /// Returns the rate the device actually selected.
    fn set_rate_near(&mut self, rate_hz: u32) -> std::result::Result<u32, DeviceError>;
    /// Returns the period time the device actually selected.
    fn set_period_time_near(&mut self, period_us: u32) -> std::result::Result<u32, DeviceError>;
    fn set_channels(&mut self, channels: u32) -> std::result::Result<(), DeviceError>;
    fn commit_hw(&mut self) -> std::result::Result<(), DeviceError>;
    fn load_sw_current(&mut self) -> std::result::Result<(), DeviceError>;
    fn set_avail_min(&mut self, frames: usize) -> std::result::Result<(), DeviceError>;
    fn set_start_threshold(&mut self, frames: usize) -> std::result::Result<(), DeviceError>;
    fn commit_sw(&mut self) -> std::result::Result<(), DeviceError>;
}

/// Parameters in force once negotiation succeeds. Fixed for the rest of the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NegotiatedParams {
    pub depth: SampleDepth,
    pub requested_rate_hz: u32,
    /// Rate chosen by the device; all timing must use this one.
    pub rate_hz: u32,
    pub channels: u32,
    pub period_time_us: u32,
    pub avail_min_frames: usize,
    pub start_threshold_frames: usize,
}

/// Run the full configuration sequence against `backend`.
pub fn negotiate<B: ParamBackend>(
    backend: &mut B,
    cfg: &PlayerConfig,
) -> Result<NegotiatedParams> {
    let failed = |stage: SetupStage| {
        let device = cfg.device_id.clone();
        move |source: DeviceError| PlayerError::Setup {
            device,
            stage,
            source,
        }
    };

    backend
        .set_access_interleaved()
        .map_err(failed(SetupStage::Access))?;
    backend
        .set_format(cfg.depth)
        .map_err(failed(SetupStage::Format))?;

    let requested_rate_hz = cfg.requested_rate_hz();
    let rate_hz = backend
        .set_rate_near(requested_rate_hz)
        .map_err(failed(SetupStage::Rate))?;
    if rate_hz != requested_rate_hz {
        tracing::warn!(
            requested_hz = requested_rate_hz,
            effective_hz = rate_hz,
            "device substituted sample rate"
        );
    }

    let period_time_us = backend
        .set_period_time_near(cfg.period_time_us)
        .map_err(failed(SetupStage::PeriodTime))?;
    backend
        .set_channels(CHANNELS)
        .map_err(failed(SetupStage::Channels))?;
    backend.commit_hw().map_err(failed(SetupStage::HwCommit))?;

    backend
        .load_sw_current()
        .map_err(failed(SetupStage::SwInit))?;
    backend
        .set_avail_min(cfg.avail_min_frames)
        .map_err(failed(SetupStage::AvailMin))?;
    backend
        .set_start_threshold(START_THRESHOLD_FRAMES)
        .map_err(failed(SetupStage::StartThreshold))?;
    backend.commit_sw().map_err(failed(SetupStage::SwCommit))?;

    let params = NegotiatedParams {
        depth: cfg.depth,
        requested_rate_hz,
        rate_hz,
        channels: CHANNELS,
        period_time_us,
        avail_min_frames: cfg.avail_min_frames,
        start_threshold_frames: START_THRESHOLD_FRAMES,
    };
    tracing::info!(
        device = %cfg.device_id,
        format = %params.depth,
        rate_hz = params.rate_hz,
        period_us = params.period_time_us,
        avail_min = params.avail_min_frames,
        "device configured"
    );
    Ok(params)
}
