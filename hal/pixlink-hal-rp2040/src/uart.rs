//! Buffered UART receive
//!
//! The UART interrupt fills a ring buffer in the background. Marker hunting
//! pulls single bytes out of it without blocking; the payload read spins
//! on the buffer until it has enough bytes or the deadline passes.

use embassy_rp::uart::{self, BufferedUartRx};
use embassy_time::{Duration, Instant};
use embedded_io::{Read, ReadReady};

use pixlink_hal::uart::{Parity, StopBits};
use pixlink_hal::{ReadOutcome, UartConfig, UartRx};

/// Error from UART operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartBusError {
    /// Framing error
    Framing,
    /// Break condition
    Break,
    /// Overrun error (ring buffer full)
    Overrun,
    /// Parity error
    Parity,
    /// Other error
    Other,
}

impl From<uart::Error> for UartBusError {
    fn from(e: uart::Error) -> Self {
        match e {
            uart::Error::Framing => UartBusError::Framing,
            uart::Error::Break => UartBusError::Break,
            uart::Error::Overrun => UartBusError::Overrun,
            uart::Error::Parity => UartBusError::Parity,
            #[allow(unreachable_patterns)]
            _ => UartBusError::Other,
        }
    }
}

/// Build the embassy UART configuration for the link
pub fn to_embassy_config(config: &UartConfig) -> uart::Config {
    let mut out = uart::Config::default();
    out.baudrate = config.baudrate;
    out.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    out.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    out
}

/// Serial link receiver over an interrupt-driven UART
pub struct TimedUartRx {
    rx: BufferedUartRx,
}

impl TimedUartRx {
    /// Wrap the receive half of a buffered UART
    pub fn new(rx: BufferedUartRx) -> Self {
        Self { rx }
    }
}

impl UartRx for TimedUartRx {
    type Error = UartBusError;

    fn try_read_byte(&mut self) -> Result<Option<u8>, UartBusError> {
        if !self.rx.read_ready()? {
            return Ok(None);
        }

        let mut byte = [0u8; 1];
        let n = self.rx.read(&mut byte)?;
        Ok((n == 1).then_some(byte[0]))
    }

    fn read_with_timeout(
        &mut self,
        buf: &mut [u8],
        timeout_ms: u32,
    ) -> Result<ReadOutcome, UartBusError> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms as u64);
        let mut filled = 0;

        while filled < buf.len() {
            if self.rx.read_ready()? {
                // Only returns what is already buffered, never blocks here
                filled += self.rx.read(&mut buf[filled..])?;
            } else if Instant::now() >= deadline {
                return Ok(ReadOutcome::TimedOut { received: filled });
            }
        }

        Ok(ReadOutcome::Complete)
    }
}
