//! Board-agnostic core logic for the LED matrix receiver
//!
//! This crate contains all receiver logic that does not depend on
//! specific hardware implementations:
//!
//! - Device configuration types and the embedded config parser
//! - Logical-to-physical matrix addressing
//! - Matrix writer (payload mapping, color correction, present)
//! - Receive loop harness tying the frame decoder to the writer

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod matrix;
pub mod receiver;

pub use config::{DeviceConfig, MatrixConfig};
pub use matrix::{Addressing, MatrixWriter};
pub use receiver::{PollOutcome, Receiver, ReceiverError, ReceiverStats};
