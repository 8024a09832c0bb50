//! pixlink Hardware Abstraction Layer
//!
//! This crate defines the two hardware seams of the receiver: the serial
//! link the frames arrive on, and the LED strip they are shown on. Chip
//! specific HALs implement them; the core logic only sees the traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pixlink-core (receiver, matrix writer) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pixlink-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ pixlink-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartRx`] - Serial receive with a bounded bulk read
//! - [`led::LedDriver`] - Addressable LED output

#![no_std]
#![deny(unsafe_code)]

pub mod led;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use led::{ChannelOrder, LedConfig, LedDriver};
pub use smart_leds::RGB8;
pub use uart::{ReadOutcome, UartConfig, UartRx};
