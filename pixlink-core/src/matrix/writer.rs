//! Matrix writer
//!
//! Owns the pixel buffer for the lifetime of the receiver. Pixels are
//! stored at their physical chain index, so the buffer handed to the LED
//! driver needs no further reordering; logical (x, y) access goes through
//! the configured [`Addressing`](super::Addressing).

use heapless::Vec;
use pixlink_hal::{LedDriver, RGB8};
use pixlink_protocol::BYTES_PER_PIXEL;

use crate::config::{MatrixConfig, MAX_PIXELS};

/// Errors from applying a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MatrixError {
    /// Payload is not exactly `width * height * 3` bytes
    PayloadLength,
}

/// Maps payloads onto the LED matrix and hands them to the driver
#[derive(Debug, Clone)]
pub struct MatrixWriter {
    config: MatrixConfig,
    pixels: Vec<RGB8, MAX_PIXELS>,
}

impl MatrixWriter {
    /// Create a writer with every pixel off
    pub fn new(config: MatrixConfig) -> Self {
        let mut pixels = Vec::new();
        // pixel_count() <= MAX_PIXELS is checked by MatrixConfig::new
        let _ = pixels.resize(config.pixel_count(), RGB8::default());
        Self { config, pixels }
    }

    pub fn config(&self) -> &MatrixConfig {
        &self.config
    }

    /// Write a full frame
    ///
    /// The payload is consumed row by row, three bytes (R, G, B) per
    /// pixel, independent of the wiring. A payload of the wrong length is
    /// rejected and the buffer keeps its previous contents.
    pub fn apply(&mut self, payload: &[u8]) -> Result<(), MatrixError> {
        if payload.len() != self.config.payload_len() {
            return Err(MatrixError::PayloadLength);
        }

        let width = self.config.width() as usize;
        for (i, rgb) in payload.chunks_exact(BYTES_PER_PIXEL).enumerate() {
            let x = (i % width) as u16;
            let y = (i / width) as u16;
            let index = self.config.index(x, y);
            self.pixels[index] = RGB8::new(rgb[0], rgb[1], rgb[2]);
        }

        Ok(())
    }

    /// Swap red and green on every pixel of the correction region
    pub fn apply_correction(&mut self) {
        let correction = self.config.correction();
        let last_row = self.config.height() - 1;

        for x in 0..correction.columns() {
            let index = self.config.index(x, last_row);
            let px = &mut self.pixels[index];
            core::mem::swap(&mut px.r, &mut px.g);
        }
    }

    /// Hand the buffer to the display driver
    ///
    /// Blocks for as long as the driver takes to shift the frame out.
    pub fn present<D: LedDriver>(&self, driver: &mut D) -> Result<(), D::Error> {
        driver.present(&self.pixels)
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        self.pixels.fill(RGB8::default());
    }

    /// Pixel at logical (x, y)
    pub fn pixel(&self, x: u16, y: u16) -> Option<RGB8> {
        if x >= self.config.width() || y >= self.config.height() {
            return None;
        }
        self.pixels.get(self.config.index(x, y)).copied()
    }

    /// Pixels in physical chain order
    pub fn physical(&self) -> &[RGB8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CorrectionRegion;
    use crate::matrix::Addressing;

    const RED: RGB8 = RGB8::new(0xFF, 0, 0);
    const GREEN: RGB8 = RGB8::new(0, 0xFF, 0);
    const BLUE: RGB8 = RGB8::new(0, 0, 0xFF);
    const WHITE: RGB8 = RGB8::new(0xFF, 0xFF, 0xFF);

    const QUAD: [u8; 12] = [
        0xFF, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
    ];

    fn config(w: u16, h: u16, addressing: Addressing, columns: u16) -> MatrixConfig {
        MatrixConfig::new(w, h, addressing, CorrectionRegion::last_row(columns)).unwrap()
    }

    /// Driver that records the last presented frame
    #[derive(Default)]
    struct RecordingDriver {
        frame: Vec<RGB8, 16>,
        presents: usize,
    }

    impl LedDriver for RecordingDriver {
        type Error = ();

        fn configure(&mut self, _config: pixlink_hal::LedConfig) -> Result<(), ()> {
            Ok(())
        }

        fn present(&mut self, pixels: &[RGB8]) -> Result<(), ()> {
            self.frame.clear();
            self.frame.extend_from_slice(pixels).map_err(|_| ())?;
            self.presents += 1;
            Ok(())
        }
    }

    #[test]
    fn test_new_is_dark() {
        let writer = MatrixWriter::new(config(3, 2, Addressing::RowMajor, 0));
        assert_eq!(writer.physical().len(), 6);
        assert!(writer.physical().iter().all(|&px| px == RGB8::default()));
    }

    #[test]
    fn test_apply_row_major_2x2() {
        let mut writer = MatrixWriter::new(config(2, 2, Addressing::RowMajor, 0));
        writer.apply(&QUAD).unwrap();
        writer.apply_correction();

        assert_eq!(writer.pixel(0, 0), Some(RED));
        assert_eq!(writer.pixel(1, 0), Some(GREEN));
        assert_eq!(writer.pixel(0, 1), Some(BLUE));
        assert_eq!(writer.pixel(1, 1), Some(WHITE));
        assert_eq!(writer.physical(), &[RED, GREEN, BLUE, WHITE]);
    }

    #[test]
    fn test_apply_serpentine_2x2() {
        let mut writer = MatrixWriter::new(config(2, 2, Addressing::SerpentineRows, 0));
        writer.apply(&QUAD).unwrap();

        // Logical view is unchanged
        assert_eq!(writer.pixel(0, 1), Some(BLUE));
        assert_eq!(writer.pixel(1, 1), Some(WHITE));
        // Second row is reversed on the chain
        assert_eq!(writer.physical(), &[RED, GREEN, WHITE, BLUE]);
    }

    #[test]
    fn test_wrong_length_leaves_buffer() {
        let mut writer = MatrixWriter::new(config(2, 2, Addressing::RowMajor, 0));
        writer.apply(&QUAD).unwrap();

        assert_eq!(writer.apply(&QUAD[..9]), Err(MatrixError::PayloadLength));
        assert_eq!(writer.apply(&[0u8; 15]), Err(MatrixError::PayloadLength));
        assert_eq!(writer.physical(), &[RED, GREEN, BLUE, WHITE]);
    }

    #[test]
    fn test_correction_swaps_red_green() {
        let mut writer = MatrixWriter::new(config(4, 3, Addressing::SerpentineRows, 2));
        let mut payload = [0u8; 36];
        for px in payload.chunks_exact_mut(3) {
            px.copy_from_slice(&[10, 20, 30]);
        }
        writer.apply(&payload).unwrap();
        writer.apply_correction();

        for y in 0..3 {
            for x in 0..4 {
                let expected = if y == 2 && x < 2 {
                    RGB8::new(20, 10, 30)
                } else {
                    RGB8::new(10, 20, 30)
                };
                assert_eq!(writer.pixel(x, y), Some(expected), "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut writer = MatrixWriter::new(config(2, 2, Addressing::SerpentineColumns, 1));
        writer.apply(&QUAD).unwrap();
        writer.apply_correction();
        let first: Vec<RGB8, 4> = Vec::from_slice(writer.physical()).unwrap();

        writer.apply(&QUAD).unwrap();
        writer.apply_correction();
        assert_eq!(writer.physical(), first.as_slice());
    }

    #[test]
    fn test_present_hands_physical_order() {
        let mut writer = MatrixWriter::new(config(2, 2, Addressing::SerpentineRows, 0));
        let mut driver = RecordingDriver::default();

        writer.apply(&QUAD).unwrap();
        writer.present(&mut driver).unwrap();

        assert_eq!(driver.presents, 1);
        assert_eq!(driver.frame.as_slice(), &[RED, GREEN, WHITE, BLUE]);
    }

    #[test]
    fn test_clear_and_bounds() {
        let mut writer = MatrixWriter::new(config(2, 2, Addressing::RowMajor, 0));
        writer.apply(&QUAD).unwrap();
        writer.clear();

        assert_eq!(writer.pixel(1, 1), Some(RGB8::default()));
        assert_eq!(writer.pixel(2, 0), None);
        assert_eq!(writer.pixel(0, 2), None);
    }
}
