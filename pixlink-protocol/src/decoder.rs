//! Frame boundary detection
//!
//! The decoder only ever looks at one byte at a time while it searches for
//! the marker. Once both marker bytes have been seen back to back it emits
//! [`Effect::ReadPayload`] and the caller takes over with a single bounded
//! bulk read; the decoder itself never sees payload bytes. After that read,
//! successful or not, the decoder is already back in
//! [`DecoderState::SeekingMarker1`].

use crate::frame::{Marker, MARKER};

/// Decoder states
///
/// The payload read is not a state of its own: it happens synchronously
/// between emitting [`Effect::ReadPayload`] and the next call to `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecoderState {
    /// Waiting for the first marker byte
    #[default]
    SeekingMarker1,
    /// First marker byte seen, waiting for the second
    SeekingMarker2,
}

/// Action requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// A full marker was seen: read exactly one payload now
    ReadPayload,
}

impl DecoderState {
    /// Process one byte and return the next state
    ///
    /// This is the core transition logic and performs no I/O.
    pub fn step(self, byte: u8, marker: Marker) -> (Self, Option<Effect>) {
        use DecoderState::*;

        match self {
            SeekingMarker1 => {
                if byte == marker.first() {
                    (SeekingMarker2, None)
                } else {
                    (SeekingMarker1, None)
                }
            }
            SeekingMarker2 => {
                if byte == marker.second() {
                    (SeekingMarker1, Some(Effect::ReadPayload))
                } else if byte == marker.first() {
                    // Fresh candidate start
                    (SeekingMarker2, None)
                } else {
                    (SeekingMarker1, None)
                }
            }
        }
    }
}

/// Stateful wrapper around [`DecoderState::step`]
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: DecoderState,
    marker: Marker,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(MARKER)
    }
}

impl FrameDecoder {
    /// Create a new decoder looking for `marker`
    pub fn new(marker: Marker) -> Self {
        Self {
            state: DecoderState::SeekingMarker1,
            marker,
        }
    }

    /// Current state
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Marker this decoder is looking for
    pub fn marker(&self) -> Marker {
        self.marker
    }

    /// Drop any partial marker and start seeking again
    pub fn reset(&mut self) {
        self.state = DecoderState::SeekingMarker1;
    }

    /// Feed a single byte to the decoder
    ///
    /// Returns `Some(Effect::ReadPayload)` when the byte completed a
    /// marker; the next `payload_len` bytes on the link are the payload.
    pub fn feed(&mut self, byte: u8) -> Option<Effect> {
        let (next, effect) = self.state.step(byte, self.marker);
        self.state = next;
        effect
    }

    /// Feed bytes until a marker completes
    ///
    /// Returns the number of bytes consumed (the payload starts right
    /// after them), or `None` if `bytes` ran out first. Bytes after a
    /// complete marker are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Option<usize> {
        for (i, &byte) in bytes.iter().enumerate() {
            if self.feed(byte).is_some() {
                return Some(i + 1);
            }
        }
        None
    }
}
