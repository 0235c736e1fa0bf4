//! Sink that writes formatted lines to stdout or an injected stream.

use std::io::{self, Write};

use async_trait::async_trait;

use crate::level::LogLevel;
use crate::sink::{LogSink, SinkError};
use crate::sinks::format_line;

/// Unbuffered sink writing one formatted line per message.
///
/// The output stream is injectable so tests (or callers that capture logs)
/// can substitute an in-memory writer for stdout.
pub struct StdoutSink {
    name: String,
    level: LogLevel,
    out: Box<dyn Write + Send>,
}

impl StdoutSink {
    /// Sink writing to the process's stdout.
    pub fn new(name: impl Into<String>, level: LogLevel) -> Self {
        Self::with_stream(name, level, Box::new(io::stdout()))
    }

    /// Sink writing to an arbitrary stream.
    pub fn with_stream(
        name: impl Into<String>,
        level: LogLevel,
        out: Box<dyn Write + Send>,
    ) -> Self {
        StdoutSink {
            name: name.into(),
            level,
            out,
        }
    }

    fn write(&mut self, level: LogLevel, message: &str) -> Result<(), SinkError> {
        if !self.level.allows(level) {
            return Ok(());
        }
        writeln!(self.out, "{}", format_line(&self.name, level, message))?;
        Ok(())
    }
}

#[async_trait]
impl LogSink for StdoutSink {
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Writer handing every byte to a shared buffer the test can inspect.
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[tokio::test]
    async fn test_writes_formatted_line() {
        let buffer = SharedBuffer::default();
        let mut sink =
            StdoutSink::with_stream("app", LogLevel::Info, Box::new(buffer.clone()));

        sink.warning("disk almost full").await.unwrap();

        let out = buffer.contents();
        assert!(out.contains("WARNING - app - disk almost full"));
        assert!(out.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_below_threshold_writes_nothing() {
        let buffer = SharedBuffer::default();
        let mut sink =
            StdoutSink::with_stream("app", LogLevel::Warning, Box::new(buffer.clone()));

        sink.debug("noise").await.unwrap();
        sink.info("still noise").await.unwrap();

        assert!(buffer.contents().is_empty());
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive() {
        let buffer = SharedBuffer::default();
        let mut sink =
            StdoutSink::with_stream("app", LogLevel::Error, Box::new(buffer.clone()));

        sink.error("failed").await.unwrap();
        sink.critical("really failed").await.unwrap();

        let out = buffer.contents();
        assert_eq!(out.lines().count(), 2);
        assert!(out.contains("ERROR"));
        assert!(out.contains("CRITICAL"));
    }
}
