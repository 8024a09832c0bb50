//! Addressable LED output abstractions
//!
//! The display driver is an external collaborator: it is configured once at
//! start-up and then asked to show a complete, already mapped buffer once
//! per frame.

use smart_leds::RGB8;

/// Order in which a device expects the three color channels on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelOrder {
    Rgb,
    Rbg,
    /// WS2812B and most clones
    #[default]
    Grb,
    Gbr,
    Brg,
    Bgr,
}

impl ChannelOrder {
    /// Encode a pixel in device-native channel order
    pub fn encode(self, pixel: RGB8) -> [u8; 3] {
        let RGB8 { r, g, b } = pixel;
        match self {
            ChannelOrder::Rgb => [r, g, b],
            ChannelOrder::Rbg => [r, b, g],
            ChannelOrder::Grb => [g, r, b],
            ChannelOrder::Gbr => [g, b, r],
            ChannelOrder::Brg => [b, r, g],
            ChannelOrder::Bgr => [b, g, r],
        }
    }

    /// Parse a channel order name such as `"GRB"` (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let order = match name.as_bytes() {
            [a, b, c] => [
                a.to_ascii_uppercase(),
                b.to_ascii_uppercase(),
                c.to_ascii_uppercase(),
            ],
            _ => return None,
        };
        match &order {
            b"RGB" => Some(ChannelOrder::Rgb),
            b"RBG" => Some(ChannelOrder::Rbg),
            b"GRB" => Some(ChannelOrder::Grb),
            b"GBR" => Some(ChannelOrder::Gbr),
            b"BRG" => Some(ChannelOrder::Brg),
            b"BGR" => Some(ChannelOrder::Bgr),
            _ => None,
        }
    }
}

/// One-time output configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedConfig {
    /// Channel order expected by the LEDs
    pub channel_order: ChannelOrder,
    /// GPIO (or bus) the data line is attached to
    pub data_pin: u8,
    /// Number of LEDs on the chain
    pub pixel_count: usize,
}

/// Addressable LED strip driver
///
/// `present` is synchronous: it returns once the buffer has been shifted
/// out, so the caller can safely start mapping the next frame.
pub trait LedDriver {
    /// Error type for output operations
    type Error;

    /// Configure the output before the first frame
    fn configure(&mut self, config: LedConfig) -> Result<(), Self::Error>;

    /// Emit `pixels` in physical LED order
    fn present(&mut self, pixels: &[RGB8]) -> Result<(), Self::Error>;
}
