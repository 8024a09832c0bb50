//! UART serial receive abstractions
//!
//! The receiver consumes bytes one at a time while it hunts for a frame
//! marker, then switches to a single bulk read bounded by a timeout. Both
//! access patterns are part of the trait so chip HALs can back them with
//! whatever buffering the peripheral offers.

/// Result of a bounded bulk read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadOutcome {
    /// The whole buffer was filled before the deadline
    Complete,
    /// The deadline passed first; only `received` bytes are valid
    TimedOut { received: usize },
}

impl ReadOutcome {
    /// Check if the read filled the buffer
    pub fn is_complete(&self) -> bool {
        matches!(self, ReadOutcome::Complete)
    }
}

/// UART receiver
///
/// Blocking trait for receiving data from a UART interface. The receive
/// loop is single threaded; [`UartRx::read_with_timeout`] is its only
/// suspension point.
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Take one byte if one is already buffered
    ///
    /// Returns `Ok(None)` immediately when no byte is pending.
    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Fill `buf` completely or give up after `timeout_ms`
    ///
    /// On timeout the first `received` bytes of `buf` hold whatever
    /// arrived; the rest is unspecified.
    fn read_with_timeout(&mut self, buf: &mut [u8], timeout_ms: u32)
        -> Result<ReadOutcome, Self::Error>;

    /// Discard everything currently buffered
    ///
    /// Returns the number of bytes thrown away.
    fn drain(&mut self) -> Result<usize, Self::Error> {
        let mut drained = 0;
        while self.try_read_byte()?.is_some() {
            drained += 1;
        }
        Ok(drained)
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115_200,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
