//! Build script for pixlink-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates matrix.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Largest matrix the firmware buffers
const MAX_PIXELS: i64 = 1024;

const ADDRESSING: &[&str] = &[
    "row_major",
    "linear",
    "serpentine_rows",
    "serpentine",
    "zigzag",
    "column_major",
    "serpentine_columns",
];

const CHANNEL_ORDERS: &[&str] = &["RGB", "RBG", "GRB", "GBR", "BRG", "BGR"];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}

/// Validate matrix.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=matrix.toml");

    let config_path = Path::new("matrix.toml");

    if !config_path.exists() {
        fail(
            "matrix.toml not found",
            &["The firmware embeds matrix.toml from the pixlink-firmware directory.".into()],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read matrix.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in matrix.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    let (width, height) = validate_matrix(&config, &mut errors);
    validate_output(&config, &mut errors);
    validate_link(&config, width * height * 3, &mut errors);

    if !errors.is_empty() {
        fail("Invalid configuration in matrix.toml", &errors);
    }

    println!("cargo:warning=matrix.toml validated successfully");
}

/// Only the known sections may appear, and nothing at root level
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };

    for (name, value) in root {
        match (name.as_str(), value) {
            ("matrix" | "output" | "link", toml::Value::Table(_)) => {}
            ("matrix" | "output" | "link", _) => {
                errors.push(format!("[{}] must be a table", name));
            }
            _ => errors.push(format!("unknown key or section '{}'", name)),
        }
    }
}

fn section<'a>(config: &'a toml::Value, name: &str) -> Option<&'a toml::Table> {
    config.get(name).and_then(|s| s.as_table())
}

fn check_keys(name: &str, table: &toml::Table, known: &[&str], errors: &mut Vec<String>) {
    for key in table.keys() {
        if !known.contains(&key.as_str()) {
            errors.push(format!("[{}] unknown key '{}'", name, key));
        }
    }
}

fn int_in_range(
    table: &toml::Table,
    name: &str,
    key: &str,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) -> Option<i64> {
    match table.get(key) {
        None => None,
        Some(toml::Value::Integer(v)) if range.contains(v) => Some(*v),
        Some(toml::Value::Integer(_)) => {
            errors.push(format!(
                "[{}] {} must be {}-{}",
                name,
                key,
                range.start(),
                range.end()
            ));
            None
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", name, key));
            None
        }
    }
}

fn string_in(
    table: &toml::Table,
    name: &str,
    key: &str,
    allowed: &[&str],
    errors: &mut Vec<String>,
) {
    match table.get(key) {
        None => {}
        Some(toml::Value::String(s)) => {
            if !allowed.iter().any(|a| a.eq_ignore_ascii_case(s)) {
                errors.push(format!("[{}] unknown {} '{}'", name, key, s));
            }
        }
        Some(_) => errors.push(format!("[{}] {} must be a string", name, key)),
    }
}

/// Returns the effective (width, height)
fn validate_matrix(config: &toml::Value, errors: &mut Vec<String>) -> (i64, i64) {
    let Some(matrix) = section(config, "matrix") else {
        return (32, 18);
    };

    check_keys(
        "matrix",
        matrix,
        &["width", "height", "addressing", "correction_columns"],
        errors,
    );

    let width = int_in_range(matrix, "matrix", "width", 1..=MAX_PIXELS, errors).unwrap_or(32);
    let height = int_in_range(matrix, "matrix", "height", 1..=MAX_PIXELS, errors).unwrap_or(18);
    if width * height > MAX_PIXELS {
        errors.push(format!(
            "[matrix] {}x{} exceeds {} pixels",
            width, height, MAX_PIXELS
        ));
    }

    string_in(matrix, "matrix", "addressing", ADDRESSING, errors);
    int_in_range(matrix, "matrix", "correction_columns", 0..=width, errors);

    (width, height)
}

fn validate_output(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(output) = section(config, "output") else {
        return;
    };

    check_keys(
        "output",
        output,
        &["channel_order", "data_pin", "brightness"],
        errors,
    );
    string_in(output, "output", "channel_order", CHANNEL_ORDERS, errors);
    int_in_range(output, "output", "brightness", 0..=255, errors);

    // The PIO output is wired to GPIO16 on the reference board
    match output.get("data_pin") {
        None => {}
        Some(toml::Value::String(pin)) if pin == "gpio16" => {}
        Some(toml::Value::Integer(16)) => {}
        Some(other) => errors.push(format!(
            "[output] data_pin {} is not supported, the PIO output uses gpio16",
            other
        )),
    }
}

fn validate_link(config: &toml::Value, payload_len: i64, errors: &mut Vec<String>) {
    let Some(link) = section(config, "link") else {
        return;
    };

    check_keys("link", link, &["baudrate", "payload_timeout_ms"], errors);

    let baudrate =
        int_in_range(link, "link", "baudrate", 1_200..=4_000_000, errors).unwrap_or(115_200);
    let timeout =
        int_in_range(link, "link", "payload_timeout_ms", 1..=60_000, errors).unwrap_or(1000);

    // 10 bits on the wire per byte (start, 8 data, stop)
    let transfer_ms = (payload_len * 10 * 1000 + baudrate - 1) / baudrate;
    if timeout < transfer_ms {
        errors.push(format!(
            "[link] payload_timeout_ms {} is shorter than one payload ({} ms)",
            timeout, transfer_ms
        ));
    }
}

fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|line| {
                let truncated = if line.len() > 62 {
                    format!("{}...", &line[..59])
                } else {
                    line.clone()
                };
                format!("║  • {:<62} ║", truncated)
            })
            .collect::<Vec<_>>()
            .join("\n")
    );
}
