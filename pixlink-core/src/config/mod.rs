//! Configuration types
//!
//! Board-agnostic configuration structures, built once at start-up from the
//! embedded `matrix.toml` and immutable afterwards.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
