//! Error types for device setup and streaming.

use std::fmt;

use thiserror::Error;

/// Diagnostic reported by the playback device (or a stand-in backend).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DeviceError {
    message: String,
}

impl DeviceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<alsa::Error> for DeviceError {
    fn from(err: alsa::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Sub-step of device negotiation, in the order it is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStage {
    Open,
    HwInit,
    Access,
    Format,
    Rate,
    PeriodTime,
    Channels,
    HwCommit,
    SwInit,
    AvailMin,
    StartThreshold,
    SwCommit,
}

impl SetupStage {
    /// Short description used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Open => "open audio device",
            Self::HwInit => "initialize hardware parameter structure",
            Self::Access => "set access type",
            Self::Format => "set sample format",
            Self::Rate => "set sample rate",
            Self::PeriodTime => "set period time",
            Self::Channels => "set channel count",
            Self::HwCommit => "set hardware parameters",
            Self::SwInit => "initialize software parameters structure",
            Self::AvailMin => "set minimum available count",
            Self::StartThreshold => "set start mode",
            Self::SwCommit => "set software parameters",
        }
    }
}

impl fmt::Display for SetupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Terminal failures of a playback session. None of these are retried.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Device open or parameter negotiation was rejected.
    #[error("{device}: cannot {stage} ({source})")]
    Setup {
        device: String,
        stage: SetupStage,
        #[source]
        source: DeviceError,
    },

    /// The sink could not be prepared for streaming.
    #[error("cannot prepare audio interface for use ({0})")]
    SinkPrepare(#[source] DeviceError),

    /// File open or read failure.
    #[error("source I/O failed: {0}")]
    Source(#[from] std::io::Error),

    /// The container never contained a sound data chunk.
    #[error("sound data chunk not found")]
    MarkerNotFound,

    /// The sink did not signal capacity within the wait bound.
    #[error("sink did not become ready within {timeout_ms} ms")]
    SinkTimeout { timeout_ms: u64 },

    /// The sink reported a negative number of free frames.
    #[error("sink reported invalid capacity of {frames} frames")]
    SinkCapacity { frames: i64 },

    /// The sink failed while waiting or while reporting available frames.
    #[error("sink capacity query failed ({0})")]
    SinkFault(#[source] DeviceError),

    /// A write failed and the sink could not recover.
    #[error("sink write failed ({0})")]
    SinkWrite(#[source] DeviceError),

    /// Transfer buffers could not be allocated.
    #[error("unable to allocate {bytes} bytes")]
    Allocation { bytes: usize },

    /// The chunk ceiling is zero or too large to size a buffer for.
    #[error("chunk of {frames} frames cannot be buffered")]
    ChunkSize { frames: usize },
}

impl PlayerError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Source(_) | Self::MarkerNotFound => 1,
            Self::Setup { .. } | Self::SinkPrepare(_) => 3,
            Self::SinkTimeout { .. } => 4,
            Self::SinkCapacity { .. } | Self::SinkFault(_) => 5,
            Self::SinkWrite(_) => 6,
            Self::Allocation { .. } | Self::ChunkSize { .. } => 7,
        }
    }

    /// `true` for failures that happened before any audio was streamed.
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            Self::Setup { .. }
                | Self::SinkPrepare(_)
                | Self::MarkerNotFound
                | Self::Allocation { .. }
                | Self::ChunkSize { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PlayerError>;
