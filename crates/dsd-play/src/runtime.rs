//! Session runtime helpers.
//!
//! Provides device enumeration, single-file playback, and exit-status mapping.

use anyhow::{Context, Result};
use dsd_player::{PlayerError, StreamStatus};

use crate::config::PlayConfig;

/// Exit status used when an error carries no playback classification.
const GENERIC_FAILURE: u8 = 1;

/// List output devices and print them to stdout.
pub fn list_devices() -> Result<()> {
    let host = cpal::default_host();
    dsd_player::device::list_devices(&host).context("list output devices")
}

/// Play one file to completion.
pub fn run_play(config: &PlayConfig) -> Result<StreamStatus> {
    tracing::info!(
        device = %config.player.device_id,
        format = %config.player.depth,
        requested_rate_hz = config.player.requested_rate_hz(),
        "starting playback"
    );
    let status = dsd_player::play_file(&config.path, &config.player)
        .with_context(|| format!("play {}", config.path.display()))?;
    status.log_summary();
    Ok(status)
}

/// Which part of the session an error chain came from: `"setup"` when nothing was streamed yet,
/// otherwise `"streaming"`. Errors without a playback classification count as setup.
pub fn failure_phase(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<PlayerError>() {
        Some(e) if !e.is_setup() => "streaming",
        _ => "setup",
    }
}

/// Map an error chain to a process exit status.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<PlayerError>()
        .map(PlayerError::exit_code)
        .unwrap_or(GENERIC_FAILURE)
}
