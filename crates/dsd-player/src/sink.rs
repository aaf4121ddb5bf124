//! Playback sink: the device end of the transfer loop.
//!
//! [`PcmSink`] is the narrow interface the transfer loop drives. [`AlsaSink`] implements it on
//! top of an ALSA PCM handle opened for blocking, interleaved playback. The handle is closed when
//! the sink is dropped, on every exit path.

use std::time::Duration;

use alsa::pcm::{Access, HwParams, PCM, SwParams};
use alsa::{Direction, ValueOr};

use crate::config::{PlayerConfig, SampleDepth};
use crate::error::{DeviceError, PlayerError, Result, SetupStage};
use crate::negotiate::{NegotiatedParams, ParamBackend, negotiate};

/// Outcome of a single write submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteStatus {
    /// The device accepted this many frames.
    Written(usize),
    /// The device had run dry; it was re-prepared and the chunk was dropped.
    Underrun,
}

/// Capacity-driven playback device.
pub trait PcmSink {
    /// Block until the device can take more frames. `Ok(false)` means the wait timed out.
    fn wait_ready(&mut self, timeout: Duration) -> std::result::Result<bool, DeviceError>;

    /// Free space in frames. Negative values signal a device fault.
    fn avail_frames(&mut self) -> std::result::Result<i64, DeviceError>;

    /// Submit `frames` interleaved frames held in `data`.
    fn write_frames(
        &mut self,
        data: &[u8],
        frames: usize,
    ) -> std::result::Result<WriteStatus, DeviceError>;
}

/// An ALSA playback handle with negotiated parameters.
pub struct AlsaSink {
    pcm: PCM,
    params: NegotiatedParams,
    prepared: bool,
}

impl AlsaSink {
    /// Open `cfg.device_id` for playback and negotiate hardware and software parameters.
    ///
    /// Any rejected step drops the handle and returns [`PlayerError::Setup`] naming the stage.
    pub fn open(cfg: &PlayerConfig) -> Result<Self> {
        let setup = |stage: SetupStage| {
            let device = cfg.device_id.clone();
            move |err: alsa::Error| PlayerError::Setup {
                device,
                stage,
                source: err.into(),
            }
        };

        let pcm = PCM::new(&cfg.device_id, Direction::Playback, false)
            .map_err(setup(SetupStage::Open))?;
        let params = {
            let hw = HwParams::any(&pcm).map_err(setup(SetupStage::HwInit))?;
            let mut backend = AlsaParams {
                pcm: &pcm,
                hw,
                sw: None,
            };
            negotiate(&mut backend, cfg)?
        };

        Ok(Self {
            pcm,
            params,
            prepared: false,
        })
    }

    pub fn params(&self) -> &NegotiatedParams {
        &self.params
    }

    /// Move the device to the prepared state so the first write starts playback.
    pub fn prepare(&mut self) -> Result<()> {
        self.pcm
            .prepare()
            .map_err(|e| PlayerError::SinkPrepare(e.into()))?;
        self.prepared = true;
        Ok(())
    }

    fn frame_bytes(&self) -> usize {
        self.params.depth.frame_bytes()
    }
}

impl PcmSink for AlsaSink {
    fn wait_ready(&mut self, timeout: Duration) -> std::result::Result<bool, DeviceError> {
        debug_assert!(self.prepared, "wait on an unprepared sink");
        let timeout_ms = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        Ok(self.pcm.wait(Some(timeout_ms))?)
    }

    fn avail_frames(&mut self) -> std::result::Result<i64, DeviceError> {
        Ok(self.pcm.avail_update()? as i64)
    }

    fn write_frames(
        &mut self,
        data: &[u8],
        frames: usize,
    ) -> std::result::Result<WriteStatus, DeviceError> {
        let bytes = frames * self.frame_bytes();
        let io = self.pcm.io_bytes();
        match io.writei(&data[..bytes]) {
            Ok(written) => Ok(WriteStatus::Written(written)),
            Err(err) => {
                self.pcm.try_recover(err, true)?;
                Ok(WriteStatus::Underrun)
            }
        }
    }
}

/// Parameter structures of a PCM handle that is being configured.
struct AlsaParams<'a> {
    pcm: &'a PCM,
    hw: HwParams<'a>,
    sw: Option<SwParams<'a>>,
}

impl AlsaParams<'_> {
    fn sw(&self) -> std::result::Result<&SwParams<'_>, DeviceError> {
        self.sw
            .as_ref()
            .ok_or_else(|| DeviceError::new("software parameters not loaded"))
    }
}

impl ParamBackend for AlsaParams<'_> {
    fn set_access_interleaved(&mut self) -> std::result::Result<(), DeviceError> {
        Ok(self.hw.set_access(Access::RWInterleaved)?)
    }

    fn set_format(&mut self, depth: SampleDepth) -> std::result::Result<(), DeviceError> {
        Ok(self.hw.set_format(depth.alsa_format())?)
    }

    fn set_rate_near(&mut self, rate_hz: u32) -> std::result::Result<u32, DeviceError> {
        Ok(self.hw.set_rate_near(rate_hz, ValueOr::Nearest)?)
    }

    fn set_period_time_near(&mut self, period_us: u32) -> std::result::Result<u32, DeviceError> {
        Ok(self.hw.set_period_time_near(period_us, ValueOr::Nearest)?)
    }

    fn set_channels(&mut self, channels: u32) -> std::result::Result<(), DeviceError> {
        Ok(self.hw.set_channels(channels)?)
    }

    fn commit_hw(&mut self) -> std::result::Result<(), DeviceError> {
        Ok(self.pcm.hw_params(&self.hw)?)
    }

    fn load_sw_current(&mut self) -> std::result::Result<(), DeviceError> {
        self.sw = Some(self.pcm.sw_params_current()?);
        Ok(())
    }

    fn set_avail_min(&mut self, frames: usize) -> std::result::Result<(), DeviceError> {
        Ok(self.sw()?.set_avail_min(frames as alsa::pcm::Frames)?)
    }

    fn set_start_threshold(&mut self, frames: usize) -> std::result::Result<(), DeviceError> {
        Ok(self.sw()?.set_start_threshold(frames as alsa::pcm::Frames)?)
    }

    fn commit_sw(&mut self) -> std::result::Result<(), DeviceError> {
        Ok(self.pcm.sw_params(self.sw()?)?)
    }
}
