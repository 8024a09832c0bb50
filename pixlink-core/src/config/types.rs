//! Configuration type definitions
//!
//! The matrix geometry, the defect correction and the link timing are all
//! fixed for a given unit. They are collected into one immutable
//! [`DeviceConfig`] handed to the receiver at construction, so several
//! independent receivers can coexist (in tests, for instance).

use pixlink_hal::ChannelOrder;
use pixlink_protocol::{payload_len, BYTES_PER_PIXEL};

use crate::matrix::Addressing;

/// Maximum number of LEDs on one matrix (e.g. 32x32)
pub const MAX_PIXELS: usize = 1024;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = MAX_PIXELS * BYTES_PER_PIXEL;

/// UART bits per byte on the wire (start + 8 data + stop)
const BITS_PER_BYTE: u64 = 10;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Width or height is zero
    InvalidDimensions,
    /// width * height exceeds [`MAX_PIXELS`]
    TooManyPixels,
    /// Correction region is wider than the matrix
    CorrectionOutOfBounds,
    /// Baud rate is zero
    InvalidBaudrate,
    /// Payload timeout is shorter than one payload takes on the wire
    TimeoutTooShort,
}

/// Pixels with swapped red and green channels
///
/// Some units have the first LEDs of the last row wired with R and G
/// crossed. The region always starts at column 0 of the last row;
/// `columns == 0` disables the correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CorrectionRegion {
    columns: u16,
}

impl CorrectionRegion {
    /// No correction
    pub const NONE: Self = Self { columns: 0 };

    /// First `columns` pixels of the last row
    pub const fn last_row(columns: u16) -> Self {
        Self { columns }
    }

    /// Number of corrected pixels
    pub const fn columns(&self) -> u16 {
        self.columns
    }

    /// Check if the region is empty
    pub const fn is_empty(&self) -> bool {
        self.columns == 0
    }

    /// Check if logical (x, y) is inside the region of a `height` row matrix
    pub const fn contains(&self, x: u16, y: u16, height: u16) -> bool {
        height > 0 && y == height - 1 && x < self.columns
    }
}

/// Matrix geometry and wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MatrixConfig {
    width: u16,
    height: u16,
    addressing: Addressing,
    correction: CorrectionRegion,
}

impl Default for MatrixConfig {
    /// 32x18 serpentine matrix, the geometry the host tooling targets
    fn default() -> Self {
        Self {
            width: 32,
            height: 18,
            addressing: Addressing::SerpentineRows,
            correction: CorrectionRegion::NONE,
        }
    }
}

impl MatrixConfig {
    /// Create a validated matrix configuration
    pub fn new(
        width: u16,
        height: u16,
        addressing: Addressing,
        correction: CorrectionRegion,
    ) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if width as usize * height as usize > MAX_PIXELS {
            return Err(ConfigError::TooManyPixels);
        }
        if correction.columns() > width {
            return Err(ConfigError::CorrectionOutOfBounds);
        }

        Ok(Self {
            width,
            height,
            addressing,
            correction,
        })
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn addressing(&self) -> Addressing {
        self.addressing
    }

    pub const fn correction(&self) -> CorrectionRegion {
        self.correction
    }

    /// Number of LEDs
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Payload length of one frame in bytes
    pub const fn payload_len(&self) -> usize {
        payload_len(self.width, self.height)
    }

    /// Physical LED index of logical (x, y)
    pub fn index(&self, x: u16, y: u16) -> usize {
        self.addressing.index(x, y, self.width, self.height)
    }
}

/// LED output configuration (applied once at start-up)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputConfig {
    /// Channel order expected by the LEDs
    pub channel_order: ChannelOrder,
    /// GPIO driving the LED data line
    pub data_pin: u8,
    /// Global brightness (255 = unscaled)
    pub brightness: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            channel_order: ChannelOrder::Grb,
            data_pin: 16,
            brightness: 255,
        }
    }
}

/// Serial link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Deadline for the payload bulk read, in milliseconds
    pub payload_timeout_ms: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baudrate: 115_200,
            payload_timeout_ms: 1000,
        }
    }
}

impl LinkConfig {
    /// Time `bytes` take on the wire at the configured baud rate, rounded up
    pub fn transfer_time_ms(&self, bytes: usize) -> u32 {
        if self.baudrate == 0 {
            return u32::MAX;
        }
        let bits = bytes as u64 * BITS_PER_BYTE * 1000;
        let ms = bits.div_ceil(self.baudrate as u64);
        ms.min(u32::MAX as u64) as u32
    }
}

/// Complete device configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    pub matrix: MatrixConfig,
    pub output: OutputConfig,
    pub link: LinkConfig,
}

impl DeviceConfig {
    /// Check the parts against each other
    ///
    /// `MatrixConfig` is validated on construction; this adds the checks
    /// that need the link and the geometry together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.link.baudrate == 0 {
            return Err(ConfigError::InvalidBaudrate);
        }
        let needed = self.link.transfer_time_ms(self.matrix.payload_len());
        if self.link.payload_timeout_ms < needed {
            return Err(ConfigError::TimeoutTooShort);
        }
        Ok(())
    }
}
