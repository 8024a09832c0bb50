//! WS2812 output over PIO
//!
//! Wraps embassy's PIO WS2812 program. The program always shifts a pixel
//! out as G, R, B, so pixels are pre-permuted to get the configured
//! channel order onto the wire. Global brightness is applied on the way
//! out; the matrix buffer itself is never scaled.

use embassy_rp::pio::Instance;
use embassy_rp::pio_programs::ws2812::PioWs2812;
use smart_leds::brightness;

use pixlink_hal::{ChannelOrder, LedConfig, LedDriver, RGB8};

/// Error from the LED output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// More pixels than the output frame holds
    TooManyPixels,
    /// Configured data pin differs from the pin the PIO was built on
    PinMismatch,
}

/// Chained WS2812 output for up to `N` pixels on PIO state machine `S`
pub struct Ws2812Output<'d, P: Instance, const S: usize, const N: usize> {
    ws: PioWs2812<'d, P, S, N>,
    data_pin: u8,
    channel_order: ChannelOrder,
    brightness: u8,
    pixel_count: usize,
    frame: [RGB8; N],
}

impl<'d, P: Instance, const S: usize, const N: usize> Ws2812Output<'d, P, S, N> {
    /// Wrap a PIO WS2812 program already bound to `data_pin`
    pub fn new(ws: PioWs2812<'d, P, S, N>, data_pin: u8, brightness: u8) -> Self {
        Self {
            ws,
            data_pin,
            channel_order: ChannelOrder::default(),
            brightness,
            pixel_count: N,
            frame: [RGB8::default(); N],
        }
    }
}

/// Reorder a pixel so the GRB program emits `order` on the wire
fn wire_pixel(order: ChannelOrder, pixel: RGB8) -> RGB8 {
    let [first, second, third] = order.encode(pixel);
    RGB8 {
        g: first,
        r: second,
        b: third,
    }
}

impl<'d, P: Instance, const S: usize, const N: usize> LedDriver for Ws2812Output<'d, P, S, N> {
    type Error = OutputError;

    fn configure(&mut self, config: LedConfig) -> Result<(), OutputError> {
        if config.pixel_count > N {
            return Err(OutputError::TooManyPixels);
        }
        if config.data_pin != self.data_pin {
            return Err(OutputError::PinMismatch);
        }

        self.channel_order = config.channel_order;
        self.pixel_count = config.pixel_count;
        self.frame = [RGB8::default(); N];
        Ok(())
    }

    fn present(&mut self, pixels: &[RGB8]) -> Result<(), OutputError> {
        if pixels.len() > self.pixel_count {
            return Err(OutputError::TooManyPixels);
        }

        let order = self.channel_order;
        let scaled = brightness(pixels.iter().copied(), self.brightness);
        for (slot, px) in self.frame.iter_mut().zip(scaled) {
            *slot = wire_pixel(order, px);
        }
        // Unused tail stays dark
        self.frame[pixels.len()..].fill(RGB8::default());

        embassy_futures::block_on(self.ws.write(&self.frame));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grb_is_identity() {
        let px = RGB8::new(1, 2, 3);
        assert_eq!(wire_pixel(ChannelOrder::Grb, px), px);
    }

    #[test]
    fn test_rgb_emits_red_first() {
        // Program shifts g, r, b: the wire sees 1, 2, 3
        let wire = wire_pixel(ChannelOrder::Rgb, RGB8::new(1, 2, 3));
        assert_eq!((wire.g, wire.r, wire.b), (1, 2, 3));
    }

    #[test]
    fn test_bgr_emits_blue_first() {
        let wire = wire_pixel(ChannelOrder::Bgr, RGB8::new(1, 2, 3));
        assert_eq!((wire.g, wire.r, wire.b), (3, 2, 1));
    }
}
