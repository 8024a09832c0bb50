//! pixlink Frame Protocol
//!
//! This crate defines the one-way serial protocol between the host
//! (video/screen sampler) and the LED matrix receiver. The protocol has no
//! acknowledgement, sequence numbers or checksum: every frame is a fixed
//! marker followed by a full matrix worth of RGB bytes.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌──────┬──────┬─────────────────────────────┐
//! │ 0xA5 │ 0x5A │ PAYLOAD                     │
//! │ 1B   │ 1B   │ width * height * 3 B        │
//! └──────┴──────┴─────────────────────────────┘
//! ```
//!
//! The payload is row-major, one R, G, B triple per logical pixel. Its
//! length is fixed by the matrix geometry agreed on both sides, so it is
//! not transmitted.

#![no_std]
#![deny(unsafe_code)]

pub mod decoder;
pub mod frame;

pub use decoder::{DecoderState, Effect, FrameDecoder};
pub use frame::{
    encode_frame, frame_len, payload_len, FrameError, Marker, MarkerError, BYTES_PER_PIXEL,
    MARKER, MARKER_LEN,
};
