use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use dsd_player::PlayerConfig;
use dsd_player::device::normalize_device_id;

use crate::cli::Args;

/// Everything needed to play one file.
#[derive(Clone, Debug)]
pub struct PlayConfig {
    pub path: PathBuf,
    pub player: PlayerConfig,
}

impl PlayConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let path = args
            .path
            .clone()
            .ok_or_else(|| anyhow!("missing input file"))?;
        let defaults = PlayerConfig::default();
        let device_id =
            normalize_device_id(Some(args.device.clone())).unwrap_or(defaults.device_id.clone());
        let player = PlayerConfig {
            device_id,
            depth: args.depth.into(),
            base_rate_hz: args.base_rate,
            period_time_us: args.period_us,
            ..defaults
        }
        .with_max_chunk_frames(args.chunk_frames);
        if player.chunk_bytes().is_none() {
            bail!(
                "--chunk-frames {} is too large for {} frames",
                args.chunk_frames,
                player.depth
            );
        }
        Ok(Self { path, player })
    }
}
