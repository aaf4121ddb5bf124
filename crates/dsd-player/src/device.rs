//! Output device discovery.
//!
//! Thin wrapper around CPAL for `--list-devices`. Playback itself goes straight to ALSA through
//! [`crate::sink::AlsaSink`] because CPAL has no DSD sample formats.

use cpal::traits::{DeviceTrait, HostTrait};

use crate::error::DeviceError;

/// Return available output device names for the default host.
pub fn list_device_names(host: &cpal::Host) -> Result<Vec<String>, DeviceError> {
    let devices = host
        .output_devices()
        .map_err(|e| DeviceError::new(format!("No output devices: {e}")))?;
    let mut out = Vec::new();
    for d in devices {
        let name = d
            .description()
            .map_err(|e| DeviceError::new(e.to_string()))?;
        out.push(name.to_string());
    }
    Ok(out)
}

/// Print available output devices to stdout.
///
/// This is intended for CLI UX (`--list-devices`) rather than structured output.
pub fn list_devices(host: &cpal::Host) -> Result<(), DeviceError> {
    let names = list_device_names(host)?;
    for line in format_device_list(&names) {
        println!("{line}");
    }
    Ok(())
}

fn format_device_list(names: &[String]) -> Vec<String> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("#{i}: {name}"))
        .collect()
}

/// Trim a user-supplied device identifier, treating blank input as absent.
pub fn normalize_device_id(device: Option<String>) -> Option<String> {
    device.and_then(|name| {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
