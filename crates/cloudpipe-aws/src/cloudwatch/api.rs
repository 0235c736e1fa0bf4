//! Abstract surface of the remote log-append API.
//!
//! The shipping engine only depends on this trait; the production
//! implementation ([`crate::cloudwatch::SdkLogsApi`]) adapts the AWS SDK
//! client, and tests substitute an in-memory recorder.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;

/// One application log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    pub message: String,
}

impl LogEvent {
    /// Event stamped with the current wall clock.
    pub fn now(message: impl Into<String>) -> Self {
        LogEvent {
            timestamp_ms: Utc::now().timestamp_millis(),
            message: message.into(),
        }
    }
}

/// The unit of submission: ordered events for one (group, stream) pair.
///
/// Event order is emission order and must be preserved; the remote API
/// rejects or misorders batches whose timestamps go backwards. A batch is
/// appended as a whole or not at all.
#[derive(Debug, Clone)]
pub struct LogBatch {
    pub group: String,
    pub stream: String,
    pub events: Vec<LogEvent>,
}

/// Acknowledgement of a `put_log_events` call.
#[derive(Debug, Clone)]
pub struct PutLogEventsAck {
    pub http_status: u16,
    /// Token to present on the next append to the same stream.
    pub next_token: Option<String>,
}

impl PutLogEventsAck {
    /// A response counts as valid only with a success status and a
    /// next-token to adopt.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (200..300).contains(&self.http_status) && self.next_token.is_some()
    }
}

/// Error from the remote API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The log group or stream being created already exists.
    #[error("cloudwatch log {resource} already exists")]
    AlreadyExists { resource: &'static str },

    /// Any other service failure, including sequence-token conflicts from
    /// concurrent writers.
    #[error("cloudwatch logs request failed: {message}")]
    Service { message: String },
}

impl ApiError {
    pub fn service(message: impl Into<String>) -> Self {
        ApiError::Service {
            message: message.into(),
        }
    }
}

/// The subset of the CloudWatch Logs API the shipping engine depends on.
#[async_trait]
pub trait LogsApi: Send + Sync {
    async fn create_log_group(&self, group: &str) -> Result<(), ApiError>;

    async fn create_log_stream(&self, group: &str, stream: &str) -> Result<(), ApiError>;

    async fn put_retention_policy(&self, group: &str, days: i32) -> Result<(), ApiError>;

    async fn tag_log_group(
        &self,
        group: &str,
        tags: &HashMap<String, String>,
    ) -> Result<(), ApiError>;

    /// Appends a batch, presenting the writer's held sequence token. The
    /// first-ever append to a stream presents no token.
    async fn put_log_events(
        &self,
        batch: &LogBatch,
        token: Option<&str>,
    ) -> Result<PutLogEventsAck, ApiError>;

    /// Current append token of the first stream matching `stream` as a
    /// prefix. `None` when the stream has never received a successful
    /// append (or does not appear at all).
    async fn describe_stream_token(
        &self,
        group: &str,
        stream: &str,
    ) -> Result<Option<String>, ApiError>;
}
