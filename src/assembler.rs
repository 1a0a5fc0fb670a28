//! Byte-stream framing.
//!
//! The monitor terminates every record with CR LF, but cheap USB-serial
//! bridges and terminal emulators are inconsistent about which of the two
//! arrive, so CR and LF are each treated as an independent terminator. The
//! doubled terminator then yields an empty frame, which is dropped.
//!
//! Bytes after the last terminator stay buffered across [`FrameAssembler::feed`]
//! calls. If that undelimited tail grows past [`MAX_PENDING_BYTES`] the whole
//! buffer is emitted as one frame marked [`Frame::forced`] and cleared, so a
//! stream of noise cannot grow the buffer without bound.

use tracing::debug;

/// Undelimited bytes tolerated before a forced flush.
pub const MAX_PENDING_BYTES: usize = 256;

const CR: u8 = 0x0D;
const LF: u8 = 0x0A;

/// A candidate record cut from the byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame bytes without the terminator.
    pub bytes: Vec<u8>,
    /// True when the frame came from an overflow flush rather than a terminator.
    pub forced: bool,
}

/// Stateful splitter that turns raw reads into frames.
#[derive(Debug)]
pub struct FrameAssembler {
    buffer: Vec<u8>,
    max_pending: usize,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::with_limit(MAX_PENDING_BYTES)
    }

    /// Create an assembler with a custom overflow threshold.
    pub fn with_limit(max_pending: usize) -> Self {
        Self { buffer: Vec::with_capacity(max_pending + 1), max_pending }
    }

    /// Feed raw bytes and collect every frame they complete.
    pub fn feed(&mut self, data: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        let mut start = 0;
        for (index, &byte) in self.buffer.iter().enumerate() {
            if byte == CR || byte == LF {
                let line = &self.buffer[start..index];
                if !is_blank(line) {
                    frames.push(Frame { bytes: line.to_vec(), forced: false });
                }
                start = index + 1;
            }
        }
        self.buffer.drain(..start);

        if self.buffer.len() > self.max_pending {
            debug!(
                bytes = self.buffer.len(),
                "No terminator within limit, flushing buffer as one frame"
            );
            frames.push(Frame { bytes: std::mem::take(&mut self.buffer), forced: true });
        }

        frames
    }

    /// Bytes waiting for a terminator.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Discard any buffered bytes.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C))
}
