//! Terminal logging for the command-line tool.

use crate::error::{AnalysisError, Result};
use chrono::Local;
use env_logger::Builder;
use log::{Level, LevelFilter, Record};
use std::io::Write;
use yansi::Paint;

/// Crates whose chatter is capped at `warn` unless `RUST_LOG` says otherwise
const NOISY_DEPENDENCIES: &[&str] = &["hyper", "reqwest", "rustls", "h2", "mio"];

/// Initializes the CLI logger at `log_level`
///
/// Accepts error, warn, info, debug or trace. A `RUST_LOG` value replaces
/// the level filter entirely.
pub fn init(log_level: &str) -> Result<()> {
    let level = parse_log_level(log_level)
        .ok_or_else(|| AnalysisError::Configuration(format!("Unknown log level '{}'", log_level)))?;

    let mut builder = Builder::new();
    builder.filter_level(level);
    for dependency in NOISY_DEPENDENCIES {
        builder.filter_module(dependency, LevelFilter::Warn.min(level));
    }
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    builder
        .format(|buf, record| writeln!(buf, "{}", format_log(record)))
        .try_init()
        .map_err(|e| AnalysisError::Configuration(format!("Logger already initialized: {}", e)))
}

/// Formats a record as `[HH:MM:SS.mmm] LEVEL module: message`
///
/// The crate prefix is dropped from targets, so `gitagent::walker` prints as
/// `walker`.
pub fn format_log(record: &Record) -> String {
    let level = match record.level() {
        Level::Error => Paint::red("ERROR").bold(),
        Level::Warn => Paint::yellow("WARN ").bold(),
        Level::Info => Paint::green("INFO ").bold(),
        Level::Debug => Paint::blue("DEBUG"),
        Level::Trace => Paint::new("TRACE").dimmed(),
    };

    let target = record.target();
    let module = target.strip_prefix("gitagent::").unwrap_or(target);

    format!(
        "[{}] {} {}: {}",
        Local::now().format("%H:%M:%S%.3f"),
        level,
        module,
        record.args()
    )
}

/// Parses a level name, case-insensitively
pub fn parse_log_level(level: &str) -> Option<LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}
