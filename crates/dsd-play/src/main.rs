//! dsd-play: stream a raw DSD bitstream (or the sound data of a DSDIFF file) to an ALSA device
//! in real time.
//!
//! ## Pipeline
//! 1. **Scan**: `.dff` inputs are fast-forwarded to the `"DSD "` chunk; other files are raw.
//! 2. **Negotiate**: the device is opened with a DSD format, interleaved access and a
//!    stereo layout; the effective rate reported back is the one used.
//! 3. **Transfer**: chunks sized by the device's free space are read, reordered for the
//!    selected word width, and written until the file runs out.

use std::process::ExitCode;

use clap::Parser;
use dsd_play::{cli, config::PlayConfig, runtime};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = cli::Args::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,dsd_play=info,dsd_player=info")
        }))
        .init();

    let _ = ctrlc::set_handler(move || {
        tracing::warn!("interrupted");
        std::process::exit(130);
    });

    let result = if args.list_devices {
        runtime::list_devices()
    } else {
        PlayConfig::from_args(&args)
            .and_then(|config| runtime::run_play(&config))
            .map(|_| ())
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(phase = runtime::failure_phase(&err), "{err:#}");
            ExitCode::from(runtime::exit_code(&err))
        }
    }
}
