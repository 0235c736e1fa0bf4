//! Sink that appends formatted lines to a log file.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;

use crate::level::LogLevel;
use crate::sink::{LogSink, SinkError};
use crate::sinks::format_line;

/// Appending file sink.
///
/// [`FileSink::create`] derives a dated file name under a log directory
/// (`<dir>/<YYYY-MM-DD>_<name>.log`), creating the directory if needed, so
/// repeated runs of the same application on the same day share one file.
/// [`FileSink::at_path`] appends to an explicit path instead.
pub struct FileSink {
    name: String,
    level: LogLevel,
    path: PathBuf,
    file: File,
}

impl FileSink {
    /// Opens `<dir>/<date>_<name>.log` for appending, creating `dir` when
    /// it does not exist.
    pub fn create(
        name: impl Into<String>,
        level: LogLevel,
        dir: impl AsRef<Path>,
    ) -> Result<Self, SinkError> {
        let name = name.into();
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}_{}.log", Utc::now().format("%Y-%m-%d"), name));
        Self::open(name, level, path)
    }

    /// Opens an explicit file path for appending.
    pub fn at_path(
        name: impl Into<String>,
        level: LogLevel,
        path: impl Into<PathBuf>,
    ) -> Result<Self, SinkError> {
        Self::open(name.into(), level, path.into())
    }

    fn open(name: String, level: LogLevel, path: PathBuf) -> Result<Self, SinkError> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(FileSink {
            name,
            level,
            path,
            file,
        })
    }

    /// The file this sink appends to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&mut self, level: LogLevel, message: &str) -> Result<(), SinkError> {
        if !self.level.allows(level) {
            return Ok(());
        }
        writeln!(self.file, "{}", format_line(&self.name, level, message))?;
        Ok(())
    }
}

#[async_trait]
impl LogSink for FileSink {
    async fn debug(&mut self, message: &str) -> Result<(), SinkError> {
        self.write(LogLevel::Debug, message)
    }

    async fn info(&mut self, message: &str) -> Result<(), SinkError> {
        self.write(LogLevel::Info, message)
    }

    async fn warning(&mut self, message: &str) -> Result<(), SinkError> {
        self.write(LogLevel::Warning, message)
    }

    async fn error(&mut self, message: &str) -> Result<(), SinkError> {
        self.write(LogLevel::Error, message)
    }

    async fn critical(&mut self, message: &str) -> Result<(), SinkError> {
        self.write(LogLevel::Critical, message)
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.file.flush()?;
        Ok(())
    }
}
