//! Pixlink - serial LED matrix receiver firmware
//!
//! Receives framed pixel payloads from a host over UART0 and shows them on
//! a chained WS2812 matrix driven by PIO0.
//!
//! Wiring on the reference board:
//! - UART0 RX: GPIO1 (TX on GPIO0 is unused)
//! - WS2812 data: GPIO16

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{PIO0, UART0};
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUartRx};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pixlink_core::config::{parse_config, DeviceConfig, MAX_PIXELS};
use pixlink_core::{PollOutcome, Receiver, ReceiverError};
use pixlink_hal::UartConfig;
use pixlink_hal_rp2040::uart::{to_embassy_config, TimedUartRx};
use pixlink_hal_rp2040::ws2812::Ws2812Output;

/// Embedded configuration (compiled into firmware)
/// Edit matrix.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../matrix.toml");

/// GPIO the PIO WS2812 program drives
const DATA_PIN: u8 = 16;

/// Frames between statistics log lines
const STATS_INTERVAL: u32 = 50;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});

// Ring buffer filled by the UART interrupt (must live forever)
static RX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Pixlink firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();
    info!(
        "Matrix {}x{} {}, {} baud, payload {} bytes",
        config.matrix.width(),
        config.matrix.height(),
        config.matrix.addressing(),
        config.link.baudrate,
        config.matrix.payload_len()
    );

    // Receive-only UART for the host link
    let uart_config = to_embassy_config(&UartConfig {
        baudrate: config.link.baudrate,
        ..Default::default()
    });
    let rx_buf = RX_BUF.init([0u8; 1024]);
    let rx = BufferedUartRx::new(p.UART0, Irqs, p.PIN_1, rx_buf, uart_config);
    info!("UART initialized for host link");

    // PIO0 state machine 0 drives the LED chain
    let Pio {
        mut common, sm0, ..
    } = Pio::new(p.PIO0, Irqs);
    let program = PioWs2812Program::new(&mut common);
    let ws: PioWs2812<'_, PIO0, 0, MAX_PIXELS> =
        PioWs2812::new(&mut common, sm0, p.DMA_CH0, p.PIN_16, &program);
    let output = Ws2812Output::new(ws, DATA_PIN, config.output.brightness);
    info!("PIO WS2812 output initialized");

    let mut receiver = Receiver::new(&config, TimedUartRx::new(rx), output);

    if let Err(e) = receiver.start() {
        error!("Failed to start receiver: {:?}", e);
    }
    info!("Waiting for frames");

    let mut last_logged = 0u32;
    loop {
        match receiver.poll() {
            Ok(PollOutcome::Idle) => embassy_futures::yield_now().await,
            Ok(PollOutcome::Pending) => {}
            Ok(PollOutcome::Frame) => {
                let stats = receiver.stats();
                if stats.frames.wrapping_sub(last_logged) >= STATS_INTERVAL {
                    last_logged = stats.frames;
                    info!(
                        "{} frames, {} truncated, {} bytes drained",
                        stats.frames, stats.truncated, stats.drained_bytes
                    );
                }
            }
            Ok(PollOutcome::Truncated { received, drained }) => {
                warn!(
                    "Truncated frame: {}/{} bytes, drained {}",
                    received,
                    receiver.payload_len(),
                    drained
                );
            }
            Err(ReceiverError::Uart(e)) => warn!("UART error: {:?}", e),
            Err(ReceiverError::Display(e)) => warn!("Display error: {:?}", e),
        }
    }
}

/// Parse the configuration embedded at compile time
///
/// build.rs already rejects an invalid matrix.toml, so the fallback only
/// triggers if the two validators disagree.
fn load_config() -> DeviceConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using default configuration");
            DeviceConfig::default()
        }
    }
}
