//! Batched CloudWatch Logs sink.

use std::collections::HashMap;
use std::net::UdpSocket;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use cloudpipe_core::{LogLevel, LogSink, SinkError};
use tracing::error;

use crate::cloudwatch::aggregator::Aggregator;
use crate::cloudwatch::api::{ApiError, LogEvent, LogsApi};
use crate::cloudwatch::client::SdkLogsApi;
use crate::cloudwatch::constants::{
    ALLOWED_RETENTION_DAYS, DEFAULT_BACKOFF_MULTIPLIER_SECS, DEFAULT_BATCH_SIZE,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RETENTION_DAYS,
};
use crate::cloudwatch::shipper::{ShipError, Shipper};

/// Errors of the CloudWatch component.
#[derive(Debug, thiserror::Error)]
pub enum CloudwatchError {
    /// Misconfiguration caught before any network call. Never retried.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The log group or stream already exists and the caller asked for
    /// that to be an error.
    #[error("cloudwatch log {resource} already exists")]
    AlreadyExists { resource: &'static str },

    /// A batch could not be delivered within the retry budget; its events
    /// are dropped.
    #[error(transparent)]
    Delivery(#[from] ShipError),

    /// A management call (creation, retention, tagging) failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Constructor-time configuration, fixed for the lifetime of an instance.
#[derive(Debug, Clone)]
pub struct CloudwatchConfig {
    pub region: String,
    pub log_group_name: String,
    pub log_stream_name: String,
    /// Threshold below which messages are discarded without buffering.
    pub log_level: LogLevel,
    /// When false every message is submitted immediately as a
    /// single-event batch.
    pub use_batches: bool,
    pub batch_size: usize,
    pub max_attempts: u32,
    /// Multiplied by the attempt number to get the wait between retries.
    pub backoff_multiplier: Duration,
}

impl CloudwatchConfig {
    /// Configuration with the default batching and retry knobs.
    pub fn new(
        region: impl Into<String>,
        log_group_name: impl Into<String>,
        log_stream_name: impl Into<String>,
    ) -> Self {
        CloudwatchConfig {
            region: region.into(),
            log_group_name: log_group_name.into(),
            log_stream_name: log_stream_name.into(),
            log_level: LogLevel::default(),
            use_batches: false,
            batch_size: DEFAULT_BATCH_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_multiplier: Duration::from_secs(DEFAULT_BACKOFF_MULTIPLIER_SECS),
        }
    }

    pub fn validate(&self) -> Result<(), CloudwatchError> {
        if self.region.trim().is_empty() {
            return Err(CloudwatchError::InvalidConfig(
                "region cannot be empty".to_string(),
            ));
        }
        if self.log_group_name.trim().is_empty() || self.log_stream_name.trim().is_empty() {
            return Err(CloudwatchError::InvalidConfig(
                "log group and stream names cannot be empty".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(CloudwatchError::InvalidConfig(
                "batch size must be at least 1".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(CloudwatchError::InvalidConfig(
                "max attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Leveled log sink appending to one CloudWatch log stream.
///
/// Built for distributed use: several processes may share the stream, each
/// with its own instance. Messages are decorated with the emitting host's
/// IPv4 address and process id so interleaved writers can be told apart,
/// and submissions go through the sequence-token retry engine.
///
/// One instance belongs to one logical writer; there is no internal
/// locking.
pub struct CloudwatchLogs {
    config: CloudwatchConfig,
    api: Arc<dyn LogsApi>,
    aggregator: Aggregator,
    shipper: Shipper,
    /// `"<ipv4> - PID:<pid>"`, resolved once at construction.
    source: String,
}

impl CloudwatchLogs {
    /// Connects through the ambient AWS credential chain.
    pub async fn connect(config: CloudwatchConfig) -> Result<Self, CloudwatchError> {
        config.validate()?;
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        let client = aws_sdk_cloudwatchlogs::Client::new(&sdk_config);
        Self::with_api(config, Arc::new(SdkLogsApi::new(client)))
    }

    /// Uses an explicit API implementation (tests, custom endpoints).
    pub fn with_api(
        config: CloudwatchConfig,
        api: Arc<dyn LogsApi>,
    ) -> Result<Self, CloudwatchError> {
        config.validate()?;
        let shipper = Shipper::new(
            Arc::clone(&api),
            config.log_group_name.clone(),
            config.log_stream_name.clone(),
            config.max_attempts,
            config.backoff_multiplier,
        );
        Ok(CloudwatchLogs {
            aggregator: Aggregator::new(config.batch_size),
            shipper,
            source: source_tag(),
            api,
            config,
        })
    }

    /// Creates the log group, applying a retention policy and optional
    /// tags. `retention_days` defaults to [`DEFAULT_RETENTION_DAYS`].
    ///
    /// Retention is validated against [`ALLOWED_RETENTION_DAYS`] before
    /// any request is made. When the group already exists the call either
    /// fails (`raise_if_exists`) or silently leaves the existing group,
    /// including its retention and tags, untouched.
    pub async fn create_log_group(
        &self,
        retention_days: Option<i32>,
        tags: Option<&HashMap<String, String>>,
        raise_if_exists: bool,
    ) -> Result<(), CloudwatchError> {
        let retention_days = retention_days.unwrap_or(DEFAULT_RETENTION_DAYS);
        if !ALLOWED_RETENTION_DAYS.contains(&retention_days) {
            return Err(CloudwatchError::InvalidConfig(format!(
                "retention days must be one of {ALLOWED_RETENTION_DAYS:?}, got {retention_days}"
            )));
        }

        let group = &self.config.log_group_name;
        match self.api.create_log_group(group).await {
            Ok(()) => {}
            Err(ApiError::AlreadyExists { resource }) => {
                return if raise_if_exists {
                    Err(CloudwatchError::AlreadyExists { resource })
                } else {
                    Ok(())
                };
            }
            Err(err) => {
                error!(group = %group, error = %err, "failed to create log group");
                return Err(err.into());
            }
        }

        self.api.put_retention_policy(group, retention_days).await?;
        if let Some(tags) = tags {
            if !tags.is_empty() {
                self.api.tag_log_group(group, tags).await?;
            }
        }
        Ok(())
    }

    /// Creates the log stream inside the configured group.
    pub async fn create_log_stream(&self, raise_if_exists: bool) -> Result<(), CloudwatchError> {
        match self
            .api
            .create_log_stream(&self.config.log_group_name, &self.config.log_stream_name)
            .await
        {
            Ok(()) => Ok(()),
            Err(ApiError::AlreadyExists { resource }) => {
                if raise_if_exists {
                    Err(CloudwatchError::AlreadyExists { resource })
                } else {
                    Ok(())
                }
            }
            Err(err) => {
                error!(
                    group = %self.config.log_group_name,
                    stream = %self.config.log_stream_name,
                    error = %err,
                    "failed to create log stream"
                );
                Err(err.into())
            }
        }
    }

    /// Records a message at `level`.
    ///
    /// Messages below the configured threshold are discarded without
    /// buffering. With batching enabled the message is buffered and a
    /// submission happens only when the batch fills; otherwise it is
    /// submitted immediately as a single-event batch.
    pub async fn record(&mut self, level: LogLevel, message: &str) -> Result<(), CloudwatchError> {
        if !self.config.log_level.allows(level) {
            return Ok(());
        }

        let event = LogEvent::now(format!("{} - {} - {}", self.source, level, message));

        if self.config.use_batches {
            if let Some(batch) = self.aggregator.push(event) {
                self.shipper.submit(batch).await?;
            }
        } else {
            self.shipper.submit(vec![event]).await?;
        }
        Ok(())
    }

    /// Submits any partial batch. No-op when nothing is buffered. Call at
    /// shutdown so buffered events are not lost.
    pub async fn flush(&mut self) -> Result<(), CloudwatchError> {
        if self.aggregator.is_empty() {
            return Ok(());
        }
        let batch = self.aggregator.take();
        self.shipper.submit(batch).await?;
        Ok(())
    }

    /// Number of events currently buffered.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.aggregator.len()
    }

    /// The sequence token this writer would attach to its next append.
    #[must_use]
    pub fn held_token(&self) -> Option<&str> {
        self.shipper.held_token()
    }
}

#[async_trait]
impl LogSink for CloudwatchLogs {
    async fn debug(&mut self, message: &str) -> Result<(), SinkError> {
        self.record(LogLevel::Debug, message)
            .await
            .map_err(SinkError::delivery)
    }

    async fn info(&mut self, message: &str) -> Result<(), SinkError> {
        self.record(LogLevel::Info, message)
            .await
            .map_err(SinkError::delivery)
    }

    async fn warning(&mut self, message: &str) -> Result<(), SinkError> {
        self.record(LogLevel::Warning, message)
            .await
            .map_err(SinkError::delivery)
    }

    async fn error(&mut self, message: &str) -> Result<(), SinkError> {
        self.record(LogLevel::Error, message)
            .await
            .map_err(SinkError::delivery)
    }

    async fn critical(&mut self, message: &str) -> Result<(), SinkError> {
        self.record(LogLevel::Critical, message)
            .await
            .map_err(SinkError::delivery)
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        CloudwatchLogs::flush(self).await.map_err(SinkError::delivery)
    }
}

/// `"<ipv4> - PID:<pid>"` prefix identifying this writer in shared
/// streams.
fn source_tag() -> String {
    let ip = local_ipv4().unwrap_or_else(|| "127.0.0.1".to_string());
    format!("{ip} - PID:{}", std::process::id())
}

/// Routable IPv4 of this host, discovered by addressing a UDP socket at a
/// public resolver. No packet is sent.
fn local_ipv4() -> Option<String> {
    let socket = UdpSocket::bind(("0.0.0.0", 0)).ok()?;
    socket.connect(("8.8.8.8", 80)).ok()?;
    Some(socket.local_addr().ok()?.ip().to_string())
}
