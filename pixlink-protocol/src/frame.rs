//! Frame layout and host-side encoding.
//!
//! Frame format:
//! - MARKER (2 bytes): 0xA5 0x5A synchronization sequence
//! - PAYLOAD (width * height * 3 bytes): row-major R, G, B triples
//!
//! Any byte value is valid pixel data, so the marker may legitimately show
//! up inside a payload. The receiver never looks for markers while it is
//! reading a payload; the ambiguity only matters while it is resyncing.

/// Number of marker bytes in front of every payload
pub const MARKER_LEN: usize = 2;

/// Bytes per pixel on the wire (R, G, B)
pub const BYTES_PER_PIXEL: usize = 3;

/// Frame start marker shared by host and receiver
pub const MARKER: Marker = Marker {
    first: 0xA5,
    second: 0x5A,
};

/// Errors building a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MarkerError {
    /// Both marker bytes are equal, so a repeated first byte could never
    /// be told apart from the second one
    IdenticalBytes,
}

/// Errors that can occur during frame encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload length does not match `width * height * 3`
    PayloadLength,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Two-byte frame start sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Marker {
    first: u8,
    second: u8,
}

impl Marker {
    /// Create a marker from two distinct bytes
    pub const fn try_new(first: u8, second: u8) -> Result<Self, MarkerError> {
        if first == second {
            return Err(MarkerError::IdenticalBytes);
        }
        Ok(Self { first, second })
    }

    /// First marker byte
    pub const fn first(&self) -> u8 {
        self.first
    }

    /// Second marker byte
    pub const fn second(&self) -> u8 {
        self.second
    }

    /// Both bytes in wire order
    pub const fn bytes(&self) -> [u8; MARKER_LEN] {
        [self.first, self.second]
    }
}

impl Default for Marker {
    fn default() -> Self {
        MARKER
    }
}

/// Payload length in bytes for a `width` x `height` matrix
pub const fn payload_len(width: u16, height: u16) -> usize {
    width as usize * height as usize * BYTES_PER_PIXEL
}

/// Complete frame length (marker + payload) in bytes
pub const fn frame_len(width: u16, height: u16) -> usize {
    MARKER_LEN + payload_len(width, height)
}

/// Encode one frame into `buffer`
///
/// `payload` must be exactly `width * height * 3` bytes in row-major
/// order. Returns the number of bytes written.
pub fn encode_frame(
    marker: Marker,
    width: u16,
    height: u16,
    payload: &[u8],
    buffer: &mut [u8],
) -> Result<usize, FrameError> {
    if payload.len() != payload_len(width, height) {
        return Err(FrameError::PayloadLength);
    }

    let len = MARKER_LEN + payload.len();
    if buffer.len() < len {
        return Err(FrameError::BufferTooSmall);
    }

    buffer[..MARKER_LEN].copy_from_slice(&marker.bytes());
    buffer[MARKER_LEN..len].copy_from_slice(payload);

    Ok(len)
}
