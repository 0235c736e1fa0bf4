//! Fan-out logger facade.

use std::path::PathBuf;

use crate::level::LogLevel;
use crate::sink::{LogSink, SinkError};
use crate::sinks::{FileSink, StdoutSink};

/// Facade that forwards every leveled call to each attached sink.
///
/// Sinks are attached at build time. When none are supplied explicitly the
/// builder attaches a stdout sink by default (and optionally a dated file
/// sink), so a bare `Logger::builder().build()` is immediately usable.
pub struct Logger {
    sinks: Vec<Box<dyn LogSink>>,
}

impl Logger {
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    /// Attaches an additional sink after construction.
    pub fn attach(&mut self, sink: Box<dyn LogSink>) {
        self.sinks.push(sink);
    }

    #[must_use]
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub async fn debug(&mut self, message: &str) -> Result<(), SinkError> {
        for sink in &mut self.sinks {
            sink.debug(message).await?;
        }
        Ok(())
    }

    pub async fn info(&mut self, message: &str) -> Result<(), SinkError> {
        for sink in &mut self.sinks {
            sink.info(message).await?;
        }
        Ok(())
    }

    pub async fn warning(&mut self, message: &str) -> Result<(), SinkError> {
        for sink in &mut self.sinks {
            sink.warning(message).await?;
        }
        Ok(())
    }

    pub async fn error(&mut self, message: &str) -> Result<(), SinkError> {
        for sink in &mut self.sinks {
            sink.error(message).await?;
        }
        Ok(())
    }

    pub async fn critical(&mut self, message: &str) -> Result<(), SinkError> {
        for sink in &mut self.sinks {
            sink.critical(message).await?;
        }
        Ok(())
    }

    /// Flushes every sink. Call at shutdown so buffered sinks do not lose
    /// their backlog.
    pub async fn flush(&mut self) -> Result<(), SinkError> {
        for sink in &mut self.sinks {
            sink.flush().await?;
        }
        Ok(())
    }
}

/// Builder for [`Logger`].
pub struct LoggerBuilder {
    name: String,
    level: LogLevel,
    sinks: Vec<Box<dyn LogSink>>,
    default_stdout: bool,
    default_file_dir: Option<PathBuf>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        LoggerBuilder {
            name: "app".to_string(),
            level: LogLevel::default(),
            sinks: Vec::new(),
            default_stdout: true,
            default_file_dir: None,
        }
    }
}

impl LoggerBuilder {
    /// Logger name used by the default sinks in their line format and file
    /// name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Level threshold for the default sinks.
    #[must_use]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Attaches an explicit sink. Supplying any explicit sink disables the
    /// default stdout sink.
    #[must_use]
    pub fn sink(mut self, sink: Box<dyn LogSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Enables or disables the default stdout sink (enabled by default).
    #[must_use]
    pub fn stdout(mut self, enabled: bool) -> Self {
        self.default_stdout = enabled;
        self
    }

    /// Also attach a default dated file sink under `dir`.
    #[must_use]
    pub fn file_in(mut self, dir: impl Into<PathBuf>) -> Self {
        self.default_file_dir = Some(dir.into());
        self
    }

    /// Builds the logger, constructing default sinks as configured.
    pub fn build(self) -> Result<Logger, SinkError> {
        let mut sinks = self.sinks;

        if sinks.is_empty() {
            if self.default_stdout {
                sinks.push(Box::new(StdoutSink::new(self.name.clone(), self.level)));
            }
            if let Some(dir) = self.default_file_dir {
                sinks.push(Box::new(FileSink::create(self.name, self.level, dir)?));
            }
        }

        Ok(Logger { sinks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Sink recording every call so tests can assert on fan-out.
    #[derive(Default)]
    struct RecordingSink {
        calls: Arc<Mutex<Vec<(LogLevel, String)>>>,
        flushes: Arc<Mutex<usize>>,
    }

    impl RecordingSink {
        fn record(&self, level: LogLevel, message: &str) -> Result<(), SinkError> {
            self.calls.lock().unwrap().push((level, message.to_string()));
            Ok(())
        }
    }

    #[async_trait]
    impl LogSink for RecordingSink {
        async fn debug(&mut self, message: &str) -> Result<(), SinkError> {
            self.record(LogLevel::Debug, message)
        }

        async fn info(&mut self, message: &str) -> Result<(), SinkError> {
            self.record(LogLevel::Info, message)
        }

        async fn warning(&mut self, message: &str) -> Result<(), SinkError> {
            self.record(LogLevel::Warning, message)
        }

        async fn error(&mut self, message: &str) -> Result<(), SinkError> {
            self.record(LogLevel::Error, message)
        }

        async fn critical(&mut self, message: &str) -> Result<(), SinkError> {
            self.record(LogLevel::Critical, message)
        }

        async fn flush(&mut self) -> Result<(), SinkError> {
            *self.flushes.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_fans_out_to_every_sink() {
        let first = RecordingSink::default();
        let second = RecordingSink::default();
        let first_calls = Arc::clone(&first.calls);
        let second_calls = Arc::clone(&second.calls);

        let mut logger = Logger::builder()
            .sink(Box::new(first))
            .sink(Box::new(second))
            .build()
            .unwrap();

        logger.info("hello").await.unwrap();
        logger.error("world").await.unwrap();

        for calls in [first_calls, second_calls] {
            let calls = calls.lock().unwrap();
            assert_eq!(
                *calls,
                vec![
                    (LogLevel::Info, "hello".to_string()),
                    (LogLevel::Error, "world".to_string()),
                ]
            );
        }
    }

    #[tokio::test]
    async fn test_flush_reaches_every_sink() {
        let sink = RecordingSink::default();
        let flushes = Arc::clone(&sink.flushes);

        let mut logger = Logger::builder().sink(Box::new(sink)).build().unwrap();
        logger.flush().await.unwrap();

        assert_eq!(*flushes.lock().unwrap(), 1);
    }

    #[test]
    fn test_default_build_attaches_stdout() {
        let logger = Logger::builder().build().unwrap();
        assert_eq!(logger.sink_count(), 1);
    }

    #[test]
    fn test_stdout_can_be_disabled() {
        let logger = Logger::builder().stdout(false).build().unwrap();
        assert_eq!(logger.sink_count(), 0);
    }

    #[test]
    fn test_explicit_sinks_replace_defaults() {
        let logger = Logger::builder()
            .sink(Box::new(RecordingSink::default()))
            .build()
            .unwrap();
        assert_eq!(logger.sink_count(), 1);
    }

    #[test]
    fn test_default_file_sink_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::builder()
            .name("svc")
            .file_in(dir.path())
            .build()
            .unwrap();
        // stdout + file
        assert_eq!(logger.sink_count(), 2);
    }
}
