//! The sink capability trait every log destination implements.

use std::error::Error;

use async_trait::async_trait;

/// Error surfaced by a sink while recording or flushing.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("log delivery failed: {source}")]
    Delivery {
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl SinkError {
    /// Wraps a delivery failure from a remote or buffered sink.
    pub fn delivery(source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        SinkError::Delivery {
            source: source.into(),
        }
    }
}

/// A log destination: stdout, a file, a remote log stream.
///
/// Each sink owns its level threshold and decides per message whether to
/// record it. Construction is where configuration is validated; a sink that
/// cannot be built returns an error from its constructor rather than
/// failing per call.
///
/// Sinks that buffer messages deliver the backlog on [`flush`]; the default
/// implementation is a no-op for unbuffered sinks.
///
/// [`flush`]: LogSink::flush
#[async_trait]
pub trait LogSink: Send {
    async fn debug(&mut self, message: &str) -> Result<(), SinkError>;
    async fn info(&mut self, message: &str) -> Result<(), SinkError>;
    async fn warning(&mut self, message: &str) -> Result<(), SinkError>;
    async fn error(&mut self, message: &str) -> Result<(), SinkError>;
    async fn critical(&mut self, message: &str) -> Result<(), SinkError>;

    /// Delivers any buffered messages. No-op for unbuffered sinks.
    async fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}
