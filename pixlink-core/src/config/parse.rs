//! Simple TOML parser for device configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `matrix.toml`. It does NOT support the full TOML language.
//!
//! Supported features:
//! - Key = value pairs (string, integer)
//! - `[matrix]`, `[output]` and `[link]` section headers
//! - Comments (# ...), including after a value
//!
//! ```toml
//! [matrix]
//! width = 32
//! height = 18
//! addressing = "serpentine_rows"
//! correction_columns = 0
//!
//! [output]
//! channel_order = "GRB"
//! data_pin = "gpio16"
//! brightness = 64
//!
//! [link]
//! baudrate = 115200
//! payload_timeout_ms = 1000
//! ```
//!
//! Keys that are left out keep their [`DeviceConfig::default`] value.

use pixlink_hal::ChannelOrder;

use super::types::{ConfigError, CorrectionRegion, DeviceConfig, MatrixConfig};
use crate::matrix::Addressing;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid section header
    InvalidSection,
    /// Key not known in the current section
    UnknownKey,
    /// Invalid value type
    InvalidValue,
    /// Invalid pin string
    InvalidPin,
    /// Values parse but do not form a valid configuration
    Config(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Config(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Matrix,
    Output,
    Link,
}

/// Matrix fields collected before validation
struct MatrixFields {
    width: u16,
    height: u16,
    addressing: Addressing,
    correction_columns: u16,
}

/// Parse TOML configuration into a validated [`DeviceConfig`]
pub fn parse_config(input: &str) -> Result<DeviceConfig, ParseError> {
    let mut config = DeviceConfig::default();
    let defaults = config.matrix;
    let mut matrix = MatrixFields {
        width: defaults.width(),
        height: defaults.height(),
        addressing: defaults.addressing(),
        correction_columns: defaults.correction().columns(),
    };
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Check for section header
        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        match section {
            Section::Matrix => apply_matrix_value(&mut matrix, key, value)?,
            Section::Output => match key {
                "channel_order" => {
                    config.output.channel_order = ChannelOrder::from_name(parse_string(value))
                        .ok_or(ParseError::InvalidValue)?;
                }
                "data_pin" => config.output.data_pin = parse_pin(value)?,
                "brightness" => config.output.brightness = parse_int(value)?,
                _ => return Err(ParseError::UnknownKey),
            },
            Section::Link => match key {
                "baudrate" => config.link.baudrate = parse_int(value)?,
                "payload_timeout_ms" => config.link.payload_timeout_ms = parse_int(value)?,
                _ => return Err(ParseError::UnknownKey),
            },
            Section::Root => return Err(ParseError::UnknownKey),
        }
    }

    config.matrix = MatrixConfig::new(
        matrix.width,
        matrix.height,
        matrix.addressing,
        CorrectionRegion::last_row(matrix.correction_columns),
    )?;
    config.validate()?;

    Ok(config)
}

fn apply_matrix_value(matrix: &mut MatrixFields, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "width" => matrix.width = parse_int(value)?,
        "height" => matrix.height = parse_int(value)?,
        "addressing" => {
            matrix.addressing =
                Addressing::from_name(parse_string(value)).ok_or(ParseError::InvalidValue)?;
        }
        "correction_columns" => matrix.correction_columns = parse_int(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

/// Parse section header like "matrix"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "matrix" => Ok(Section::Matrix),
        "output" => Ok(Section::Output),
        "link" => Ok(Section::Link),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Split `key = value`, dropping a trailing `# comment` outside quotes
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, rest) = line.split_once('=')?;

    let mut in_string = false;
    let comment = rest.char_indices().find(|&(_, c)| {
        if c == '"' {
            in_string = !in_string;
        }
        c == '#' && !in_string
    });
    let value = match comment {
        Some((at, _)) => &rest[..at],
        None => rest,
    };

    let (key, value) = (key.trim(), value.trim());
    (!key.is_empty() && !value.is_empty()).then_some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

/// Parse an integer value, allowing `_` digit separators
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits = heapless::String::<16>::new();
    for ch in value.chars().filter(|&c| c != '_') {
        digits.push(ch).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a pin string like "gpio16" or a bare number
fn parse_pin(value: &str) -> Result<u8, ParseError> {
    let value = parse_string(value);
    let number = value.strip_prefix("gpio").unwrap_or(value);
    let pin: u8 = number.parse().map_err(|_| ParseError::InvalidPin)?;

    // RP2040 exposes GPIO0-29
    if pin > 29 {
        return Err(ParseError::InvalidPin);
    }
    Ok(pin)
}
