//! Receive loop harness
//!
//! Ties the frame decoder, the serial link, the matrix writer and the LED
//! driver into the single-threaded loop the firmware runs:
//!
//! ```text
//! byte ──► FrameDecoder ──(marker)──► bulk read ──► MatrixWriter ──► LedDriver
//!              ▲                          │ timeout
//!              └──────── drain ◄──────────┘
//! ```
//!
//! Every call to [`Receiver::poll`] consumes at most one marker candidate
//! byte, plus one payload when that byte completes a marker. Nothing in
//! here is fatal: every path ends back in
//! [`DecoderState::SeekingMarker1`](pixlink_protocol::DecoderState).

use heapless::Vec;
use pixlink_hal::{LedConfig, LedDriver, ReadOutcome, UartRx};
use pixlink_protocol::{FrameDecoder, MARKER};

use crate::config::{DeviceConfig, OutputConfig, MAX_PAYLOAD_SIZE};
use crate::matrix::MatrixWriter;

/// Result of one [`Receiver::poll`] step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollOutcome {
    /// No byte was waiting on the link
    Idle,
    /// A byte was consumed without completing a frame
    Pending,
    /// A full frame was mapped and shown
    Frame,
    /// The payload read timed out; the matrix keeps the previous frame
    Truncated {
        /// Payload bytes that did arrive
        received: usize,
        /// Bytes flushed from the link afterwards
        drained: usize,
    },
}

/// Errors surfaced by the collaborators
///
/// Both are recoverable: the decoder is already back to seeking when one
/// of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiverError<U, D> {
    /// Serial link error
    Uart(U),
    /// LED driver error
    Display(D),
}

/// Link counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceiverStats {
    /// Frames mapped and presented
    pub frames: u32,
    /// Payload reads that timed out
    pub truncated: u32,
    /// Bytes flushed after truncated payloads
    pub drained_bytes: u32,
}

/// Single-threaded frame receiver
pub struct Receiver<R, D> {
    rx: R,
    driver: D,
    decoder: FrameDecoder,
    writer: MatrixWriter,
    output: OutputConfig,
    payload_timeout_ms: u32,
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
    stats: ReceiverStats,
}

impl<R: UartRx, D: LedDriver> Receiver<R, D> {
    /// Create a receiver for `config`
    ///
    /// Nothing is sent to the driver until [`Receiver::start`].
    pub fn new(config: &DeviceConfig, rx: R, driver: D) -> Self {
        let mut payload = Vec::new();
        // payload_len() <= MAX_PAYLOAD_SIZE is checked by MatrixConfig::new
        let _ = payload.resize(config.matrix.payload_len(), 0);

        Self {
            rx,
            driver,
            decoder: FrameDecoder::new(MARKER),
            writer: MatrixWriter::new(config.matrix),
            output: config.output,
            payload_timeout_ms: config.link.payload_timeout_ms,
            payload,
            stats: ReceiverStats::default(),
        }
    }

    /// Configure the LED driver and blank the matrix
    pub fn start(&mut self) -> Result<(), ReceiverError<R::Error, D::Error>> {
        self.driver
            .configure(LedConfig {
                channel_order: self.output.channel_order,
                data_pin: self.output.data_pin,
                pixel_count: self.writer.config().pixel_count(),
            })
            .map_err(ReceiverError::Display)?;

        self.writer.clear();
        self.writer
            .present(&mut self.driver)
            .map_err(ReceiverError::Display)
    }

    /// Run one step of the receive loop
    pub fn poll(&mut self) -> Result<PollOutcome, ReceiverError<R::Error, D::Error>> {
        let Some(byte) = self.rx.try_read_byte().map_err(ReceiverError::Uart)? else {
            return Ok(PollOutcome::Idle);
        };

        if self.decoder.feed(byte).is_none() {
            return Ok(PollOutcome::Pending);
        }

        self.read_frame()
    }

    /// Bulk-read one payload and show it
    fn read_frame(&mut self) -> Result<PollOutcome, ReceiverError<R::Error, D::Error>> {
        let outcome = match self
            .rx
            .read_with_timeout(&mut self.payload, self.payload_timeout_ms)
        {
            Ok(outcome) => outcome,
            Err(e) => {
                // The rest of the payload must not be hunted for markers
                let drained = self.rx.drain().unwrap_or(0);
                self.count_truncated(drained);
                return Err(ReceiverError::Uart(e));
            }
        };

        match outcome {
            ReadOutcome::Complete => {
                let applied = self.writer.apply(&self.payload);
                // Buffer and writer are sized from the same config
                debug_assert!(applied.is_ok());
                self.writer.apply_correction();
                self.writer
                    .present(&mut self.driver)
                    .map_err(ReceiverError::Display)?;

                self.stats.frames = self.stats.frames.wrapping_add(1);
                Ok(PollOutcome::Frame)
            }
            ReadOutcome::TimedOut { received } => {
                let drained = self.rx.drain().map_err(ReceiverError::Uart)?;
                self.count_truncated(drained);

                Ok(PollOutcome::Truncated { received, drained })
            }
        }
    }

    fn count_truncated(&mut self, drained: usize) {
        self.stats.truncated = self.stats.truncated.wrapping_add(1);
        self.stats.drained_bytes = self.stats.drained_bytes.wrapping_add(drained as u32);
    }

    /// Link counters since start-up
    pub fn stats(&self) -> ReceiverStats {
        self.stats
    }

    /// Matrix state as last presented
    pub fn writer(&self) -> &MatrixWriter {
        &self.writer
    }

    /// Payload length this receiver expects
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    pub fn link_mut(&mut self) -> &mut R {
        &mut self.rx
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CorrectionRegion, MatrixConfig};
    use crate::matrix::Addressing;
    use heapless::Deque;
    use pixlink_hal::RGB8;
    use pixlink_protocol::{encode_frame, frame_len};

    const M1: u8 = 0xA5;
    const M2: u8 = 0x5A;

    /// Serial link fed from a queue; an empty queue means silence
    #[derive(Default)]
    struct FakeLink {
        pending: Deque<u8, 256>,
        /// Bytes that show up only after a read has timed out
        late: Vec<u8, 64>,
        timeouts: Vec<u32, 8>,
        /// Fail the next payload read after this many bytes
        fail_after: Option<usize>,
    }

    impl FakeLink {
        fn push(&mut self, bytes: &[u8]) {
            for &b in bytes {
                self.pending.push_back(b).unwrap();
            }
        }
    }

    impl UartRx for FakeLink {
        type Error = ();

        fn try_read_byte(&mut self) -> Result<Option<u8>, ()> {
            Ok(self.pending.pop_front())
        }

        fn read_with_timeout(
            &mut self,
            buf: &mut [u8],
            timeout_ms: u32,
        ) -> Result<ReadOutcome, ()> {
            self.timeouts.push(timeout_ms).map_err(|_| ())?;
            let fail_after = self.fail_after.take();
            for (i, slot) in buf.iter_mut().enumerate() {
                if fail_after == Some(i) {
                    return Err(());
                }
                match self.pending.pop_front() {
                    Some(b) => *slot = b,
                    None => {
                        let late = core::mem::take(&mut self.late);
                        self.push(&late);
                        return Ok(ReadOutcome::TimedOut { received: i });
                    }
                }
            }
            Ok(ReadOutcome::Complete)
        }
    }

    #[derive(Default)]
    struct FakeDriver {
        config: Option<LedConfig>,
        presented: Vec<Vec<RGB8, 16>, 8>,
    }

    impl LedDriver for FakeDriver {
        type Error = ();

        fn configure(&mut self, config: LedConfig) -> Result<(), ()> {
            self.config = Some(config);
            Ok(())
        }

        fn present(&mut self, pixels: &[RGB8]) -> Result<(), ()> {
            let frame = Vec::from_slice(pixels)?;
            self.presented.push(frame).map_err(|_| ())
        }
    }

    fn device(width: u16, height: u16, addressing: Addressing, columns: u16) -> DeviceConfig {
        DeviceConfig {
            matrix: MatrixConfig::new(
                width,
                height,
                addressing,
                CorrectionRegion::last_row(columns),
            )
            .unwrap(),
            ..Default::default()
        }
    }

    fn receiver(config: &DeviceConfig) -> Receiver<FakeLink, FakeDriver> {
        Receiver::new(config, FakeLink::default(), FakeDriver::default())
    }

    /// Poll until the link has nothing left
    fn run(rx: &mut Receiver<FakeLink, FakeDriver>) -> Vec<PollOutcome, 64> {
        let mut outcomes = Vec::new();
        loop {
            match rx.poll().unwrap() {
                PollOutcome::Idle => return outcomes,
                PollOutcome::Pending => {}
                other => outcomes.push(other).unwrap(),
            }
        }
    }

    const QUAD: [u8; 12] = [
        0xFF, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
    ];

    #[test]
    fn test_start_configures_and_blanks() {
        let config = device(2, 2, Addressing::RowMajor, 0);
        let mut rx = receiver(&config);
        rx.start().unwrap();

        let led = rx.driver().config.unwrap();
        assert_eq!(led.pixel_count, 4);
        assert_eq!(led.channel_order, config.output.channel_order);
        assert_eq!(led.data_pin, config.output.data_pin);
        assert_eq!(rx.driver().presented.len(), 1);
        assert!(rx.driver().presented[0].iter().all(|&px| px == RGB8::default()));
    }

    #[test]
    fn test_idle_without_input() {
        let mut rx = receiver(&device(2, 2, Addressing::RowMajor, 0));
        assert_eq!(rx.poll(), Ok(PollOutcome::Idle));
        assert_eq!(rx.stats(), ReceiverStats::default());
    }

    #[test]
    fn test_end_to_end_2x2() {
        let config = device(2, 2, Addressing::RowMajor, 0);
        let mut rx = receiver(&config);

        let mut frame = [0u8; 14];
        let len = encode_frame(MARKER, 2, 2, &QUAD, &mut frame).unwrap();
        assert_eq!(len, frame_len(2, 2));
        rx.link_mut().push(&frame);

        assert_eq!(run(&mut rx).as_slice(), &[PollOutcome::Frame]);
        let w = rx.writer();
        assert_eq!(w.pixel(0, 0), Some(RGB8::new(0xFF, 0, 0)));
        assert_eq!(w.pixel(1, 0), Some(RGB8::new(0, 0xFF, 0)));
        assert_eq!(w.pixel(0, 1), Some(RGB8::new(0, 0, 0xFF)));
        assert_eq!(w.pixel(1, 1), Some(RGB8::new(0xFF, 0xFF, 0xFF)));
        assert_eq!(rx.driver().presented.len(), 1);
        assert_eq!(rx.link_mut().timeouts.as_slice(), &[config.link.payload_timeout_ms]);
    }

    #[test]
    fn test_repeated_first_marker_byte() {
        let mut rx = receiver(&device(2, 2, Addressing::RowMajor, 0));
        rx.link_mut().push(&[M1, M1, M2]);
        rx.link_mut().push(&QUAD);

        assert_eq!(run(&mut rx).as_slice(), &[PollOutcome::Frame]);
        assert_eq!(rx.stats().frames, 1);
    }

    #[test]
    fn test_garbage_before_marker_is_skipped() {
        let mut rx = receiver(&device(2, 2, Addressing::RowMajor, 0));
        rx.link_mut().push(&[0x00, M1, 0x13, M2, 0x77]);
        rx.link_mut().push(&[M1, M2]);
        rx.link_mut().push(&QUAD);

        assert_eq!(run(&mut rx).as_slice(), &[PollOutcome::Frame]);
        assert_eq!(rx.writer().pixel(1, 1), Some(RGB8::new(0xFF, 0xFF, 0xFF)));
    }

    #[test]
    fn test_marker_inside_payload_is_data() {
        let mut rx = receiver(&device(2, 2, Addressing::RowMajor, 0));
        let payload = [M1, M2, 0x01, M1, M2, 0x02, 0x03, 0x04, 0x05, M1, M2, 0x06];
        rx.link_mut().push(&[M1, M2]);
        rx.link_mut().push(&payload);

        assert_eq!(run(&mut rx).as_slice(), &[PollOutcome::Frame]);
        assert_eq!(rx.writer().pixel(0, 0), Some(RGB8::new(M1, M2, 0x01)));
        assert_eq!(rx.writer().pixel(1, 1), Some(RGB8::new(M1, M2, 0x06)));
    }

    #[test]
    fn test_truncated_payload_leaves_matrix() {
        let mut rx = receiver(&device(2, 2, Addressing::SerpentineRows, 0));
        rx.link_mut().push(&[M1, M2]);
        rx.link_mut().push(&QUAD);
        assert_eq!(run(&mut rx).as_slice(), &[PollOutcome::Frame]);
        let before: Vec<RGB8, 4> = Vec::from_slice(rx.writer().physical()).unwrap();

        // Half a frame, then the rest of the line noise arrives too late
        rx.link_mut().push(&[M1, M2, 1, 2, 3, 4, 5, 6]);
        rx.link_mut().late.extend_from_slice(&[7, 8, 9]).unwrap();

        assert_eq!(
            run(&mut rx).as_slice(),
            &[PollOutcome::Truncated {
                received: 6,
                drained: 3
            }]
        );
        assert_eq!(rx.writer().physical(), before.as_slice());
        assert_eq!(rx.driver().presented.len(), 1);

        let stats = rx.stats();
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.truncated, 1);
        assert_eq!(stats.drained_bytes, 3);
    }

    #[test]
    fn test_link_error_mid_payload_drains() {
        let mut rx = receiver(&device(2, 2, Addressing::RowMajor, 0));
        // Rest of the interrupted payload carries a marker-shaped pair
        rx.link_mut().push(&[M1, M2, 9, 9, 9, 9, M1, M2, 9, 9, 9, 9, 9, 9]);
        rx.link_mut().fail_after = Some(2);

        assert_eq!(rx.poll(), Ok(PollOutcome::Pending));
        assert_eq!(rx.poll(), Err(ReceiverError::Uart(())));
        assert_eq!(rx.poll(), Ok(PollOutcome::Idle));

        let stats = rx.stats();
        assert_eq!(stats.truncated, 1);
        assert_eq!(stats.drained_bytes, 10);
        assert!(rx.driver().presented.is_empty());

        rx.link_mut().push(&[M1, M2]);
        rx.link_mut().push(&[7; 12]);
        assert_eq!(run(&mut rx).as_slice(), &[PollOutcome::Frame]);
        assert_eq!(rx.writer().pixel(0, 0), Some(RGB8::new(7, 7, 7)));
    }

    #[test]
    fn test_recovers_after_truncation() {
        let mut rx = receiver(&device(2, 2, Addressing::RowMajor, 0));
        rx.link_mut().push(&[M1, M2, 0xAA, 0xBB]);
        assert!(matches!(
            run(&mut rx).as_slice(),
            [PollOutcome::Truncated { received: 2, .. }]
        ));

        rx.link_mut().push(&[M1, M2]);
        rx.link_mut().push(&QUAD);
        assert_eq!(run(&mut rx).as_slice(), &[PollOutcome::Frame]);
        assert_eq!(rx.writer().pixel(0, 0), Some(RGB8::new(0xFF, 0, 0)));
    }

    #[test]
    fn test_correction_applied_before_present() {
        let mut rx = receiver(&device(2, 2, Addressing::RowMajor, 1));
        rx.link_mut().push(&[M1, M2]);
        rx.link_mut().push(&[10, 20, 30, 10, 20, 30, 10, 20, 30, 10, 20, 30]);

        assert_eq!(run(&mut rx).as_slice(), &[PollOutcome::Frame]);
        let shown = &rx.driver().presented[0];
        assert_eq!(shown[0], RGB8::new(10, 20, 30));
        assert_eq!(shown[1], RGB8::new(10, 20, 30));
        assert_eq!(shown[2], RGB8::new(20, 10, 30));
        assert_eq!(shown[3], RGB8::new(10, 20, 30));
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut rx = receiver(&device(2, 2, Addressing::RowMajor, 0));
        for _ in 0..3 {
            rx.link_mut().push(&[M1, M2]);
            rx.link_mut().push(&QUAD);
        }

        assert_eq!(run(&mut rx).len(), 3);
        assert_eq!(rx.stats().frames, 3);
        assert_eq!(rx.payload_len(), 12);
    }
}
