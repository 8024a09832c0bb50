//! Matrix mapping
//!
//! Turns a flat row-major RGB payload into LED chain order.

pub mod addressing;
pub mod writer;

pub use addressing::Addressing;
pub use writer::{MatrixError, MatrixWriter};
