//! Bundled sink implementations.

pub mod file;
pub mod stdout;

pub use file::FileSink;
pub use stdout::StdoutSink;

use chrono::Utc;

use crate::level::LogLevel;

/// Shared line format for the local sinks:
/// `timestamp - LEVEL - name - message`.
pub(crate) fn format_line(name: &str, level: LogLevel, message: &str) -> String {
    format!(
        "{} - {} - {} - {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S"),
        level,
        name,
        message
    )
}
