//! Steady-state transfer loop.
//!
//! Each iteration waits for the sink to signal room, clamps the reported capacity to the chunk
//! ceiling, reads exactly that many frames from the source, reorders them for the device and
//! writes them. Read, transform and write of one chunk complete before the next wait, so at most
//! one chunk is ever in flight and writes stay in source order.
//!
//! Terminal exits:
//! - zero free frames, or a short read: clean end ([`EndReason`])
//! - wait timeout: [`PlayerError::SinkTimeout`]
//! - negative capacity: [`PlayerError::SinkCapacity`]
//! - a failed wait or capacity query: [`PlayerError::SinkFault`]
//! - unrecoverable write: [`PlayerError::SinkWrite`]

use std::io::{ErrorKind, Read};
use std::time::Duration;

use crate::config::{PlayerConfig, SampleDepth};
use crate::error::{PlayerError, Result};
use crate::layout::transform_into;
use crate::sink::{PcmSink, WriteStatus};
use crate::status::{EndReason, StreamStatus};

/// Read and play buffers, each sized for the largest chunk. Allocated once, never grown.
pub struct TransferBuffers {
    read: Vec<u8>,
    play: Vec<u8>,
}

impl TransferBuffers {
    /// Allocate both buffers, reporting failure instead of aborting.
    pub fn allocate(chunk_bytes: usize) -> Result<Self> {
        Ok(Self {
            read: zeroed(chunk_bytes)?,
            play: zeroed(chunk_bytes)?,
        })
    }

    /// Allocate buffers for `cfg.max_chunk_frames` frames of `cfg.depth`.
    pub fn for_config(cfg: &PlayerConfig) -> Result<Self> {
        let bytes = cfg.chunk_bytes().ok_or(PlayerError::ChunkSize {
            frames: cfg.max_chunk_frames,
        })?;
        Self::allocate(bytes)
    }

    pub fn capacity_bytes(&self) -> usize {
        self.read.len()
    }
}

fn zeroed(bytes: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(bytes)
        .map_err(|_| PlayerError::Allocation { bytes })?;
    buf.resize(bytes, 0);
    Ok(buf)
}

/// Owns the source, sink and buffers for the lifetime of one playback session.
pub struct Transfer<'a, R, S> {
    source: R,
    sink: &'a mut S,
    buffers: TransferBuffers,
    depth: SampleDepth,
    max_chunk_frames: usize,
    wait_timeout: Duration,
}

impl<'a, R: Read, S: PcmSink> Transfer<'a, R, S> {
    pub fn new(source: R, sink: &'a mut S, buffers: TransferBuffers, cfg: &PlayerConfig) -> Self {
        let frame_bytes = cfg.depth.frame_bytes();
        let buffer_frames = buffers.capacity_bytes() / frame_bytes;
        Self {
            source,
            sink,
            buffers,
            depth: cfg.depth,
            max_chunk_frames: cfg.max_chunk_frames.min(buffer_frames),
            wait_timeout: cfg.wait_timeout,
        }
    }

    /// Frames to move this iteration for a reported capacity.
    pub fn clamp_frames(&self, capacity: usize) -> usize {
        capacity.min(self.max_chunk_frames)
    }

    /// Stream until a terminal state, updating `status` as chunks are written.
    ///
    /// A zero chunk ceiling (empty buffers) is rejected before the first wait.
    pub fn run(&mut self, status: &mut StreamStatus) -> Result<EndReason> {
        let frame_bytes = self.depth.frame_bytes();
        if self.max_chunk_frames == 0 {
            return Err(PlayerError::ChunkSize { frames: 0 });
        }

        let reason = loop {
            if !self
                .sink
                .wait_ready(self.wait_timeout)
                .map_err(PlayerError::SinkFault)?
            {
                return Err(PlayerError::SinkTimeout {
                    timeout_ms: self.wait_timeout.as_millis() as u64,
                });
            }

            let avail = self.sink.avail_frames().map_err(PlayerError::SinkFault)?;
            if avail == 0 {
                break EndReason::SinkDrained;
            }
            if avail < 0 {
                return Err(PlayerError::SinkCapacity { frames: avail });
            }

            let frames = self.clamp_frames(avail as usize);
            let bytes = frames * frame_bytes;
            let got = read_full(&mut self.source, &mut self.buffers.read[..bytes])?;
            if got < bytes {
                tracing::debug!(requested = bytes, got, "short read; end of input");
                break EndReason::SourceExhausted;
            }

            transform_into(
                self.depth,
                &self.buffers.read[..bytes],
                &mut self.buffers.play[..bytes],
            );

            match self
                .sink
                .write_frames(&self.buffers.play[..bytes], frames)
                .map_err(PlayerError::SinkWrite)?
            {
                WriteStatus::Written(accepted) => {
                    if accepted < frames {
                        tracing::warn!(requested = frames, accepted, "short write");
                    }
                    tracing::trace!(avail, frames, accepted, "chunk written");
                    status.record_write(frames, accepted);
                }
                WriteStatus::Underrun => {
                    tracing::warn!(frames, "underrun; chunk dropped after recovery");
                    status.record_underrun();
                }
            }
        };

        status.end_reason = Some(reason);
        Ok(reason)
    }
}

/// Fill `buf` from `source`, returning fewer bytes only at end of input.
fn read_full<R: Read>(source: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
