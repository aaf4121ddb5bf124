//! Container pre-scan.
//!
//! DSDIFF files keep their samples in a chunk tagged `"DSD "`. Rather than parse the container,
//! the scanner slides a 4-byte window over the stream until it sees that tag, then drops the
//! 8-byte chunk size that follows. The size is returned but never checked, so a stray `"DSD "`
//! inside an earlier chunk will be taken as the data start.

use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::error::{PlayerError, Result};

/// Chunk id of the DSDIFF sound data chunk.
pub const SOUND_DATA_MARKER: [u8; 4] = *b"DSD ";

/// Extension that enables the pre-scan.
pub const CONTAINER_EXTENSION: &str = ".dff";

/// Position of the first sample byte, relative to where the scan started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SoundData {
    /// Bytes consumed from the source, marker and size field included.
    pub offset: u64,
    /// Size field as stored in the container (big-endian). Not validated.
    pub declared_len: u64,
}

/// `true` when `path` names a chunked container rather than raw samples.
pub fn is_container_path(path: &Path) -> bool {
    let Some(name) = path.to_str() else {
        return false;
    };
    name.len() > CONTAINER_EXTENSION.len() && name.ends_with(CONTAINER_EXTENSION)
}

/// Advance `source` past the sound data chunk header.
///
/// Bytes are consumed one at a time. On success the source is positioned at the first sample
/// byte. Exhausting the source before the marker (or inside the size field) yields
/// [`PlayerError::MarkerNotFound`].
pub fn skip_to_sound_data<R: Read>(source: &mut R) -> Result<SoundData> {
    let mut window = 0u32;
    let marker = u32::from_be_bytes(SOUND_DATA_MARKER);
    let mut consumed = 0u64;
    let mut byte = [0u8; 1];

    loop {
        if read_retrying(source, &mut byte)? == 0 {
            return Err(PlayerError::MarkerNotFound);
        }
        consumed += 1;
        window = (window << 8) | u32::from(byte[0]);
        if consumed >= 4 && window == marker {
            break;
        }
    }

    let mut size = [0u8; 8];
    match source.read_exact(&mut size) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Err(PlayerError::MarkerNotFound),
        Err(e) => return Err(e.into()),
    }
    consumed += size.len() as u64;

    let found = SoundData {
        offset: consumed,
        declared_len: u64::from_be_bytes(size),
    };
    tracing::debug!(
        offset = found.offset,
        declared_len = found.declared_len,
        "sound data chunk located"
    );
    Ok(found)
}

fn read_retrying<R: Read>(source: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    loop {
        match source.read(buf) {
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}
