//! RP2040-specific HAL for the LED matrix receiver
//!
//! This crate provides RP2040 implementations of the shared
//! `pixlink-hal` traits:
//!
//! - Buffered UART receive with a deadline-bounded bulk read
//! - WS2812 output through a PIO state machine

#![no_std]

pub mod uart;
pub mod ws2812;

// Re-export shared traits from pixlink-hal for convenience
pub use pixlink_hal::{LedDriver, UartRx};
