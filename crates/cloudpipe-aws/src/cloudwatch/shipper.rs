//! Sequence-token retry engine.
//!
//! CloudWatch orders appends within a stream through a single mutable
//! token. Independent writers sharing a stream race for it: the winner's
//! append advances the token and every loser's in-flight request is
//! rejected as stale. There is no lock to take; the token is optimistic
//! concurrency state, and the resolution is to wait, adopt the stream's
//! current token, and try again.
//!
//! The wait grows linearly with the attempt number (`attempt *
//! multiplier`). Linear rather than exponential backoff is a deliberate
//! simplicity tradeoff for low writer counts; deployments with many
//! concurrent writers should shorten the multiplier and consider jitter.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cloudwatch::api::{ApiError, LogBatch, LogEvent, LogsApi, PutLogEventsAck};

/// Cause of a single failed submission attempt.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The service answered with a success status but no next-token to
    /// adopt, so the append position is unknown.
    #[error("response missing next sequence token (status {http_status})")]
    MalformedResponse { http_status: u16 },
}

/// Terminal submission failure: the attempt budget is spent and the
/// batch's events are dropped.
#[derive(Debug, thiserror::Error)]
pub enum ShipError {
    #[error("max attempts reached after {attempts} attempts: {source}")]
    ExhaustedRetries {
        attempts: u32,
        #[source]
        source: AttemptError,
    },
}

/// Reliable batch submission for one (group, stream) pair.
///
/// Holds this writer's best-known append token. One instance belongs to
/// one logical writer; callers sharing an instance across threads must
/// serialize access themselves.
pub struct Shipper {
    api: Arc<dyn LogsApi>,
    group: String,
    stream: String,
    max_attempts: u32,
    backoff_multiplier: Duration,
    sequence_token: Option<String>,
}

impl Shipper {
    pub fn new(
        api: Arc<dyn LogsApi>,
        group: impl Into<String>,
        stream: impl Into<String>,
        max_attempts: u32,
        backoff_multiplier: Duration,
    ) -> Self {
        Shipper {
            api,
            group: group.into(),
            stream: stream.into(),
            max_attempts,
            backoff_multiplier,
            // A stream's first-ever append requires no token; absence is a
            // valid initial state.
            sequence_token: None,
        }
    }

    /// The token this writer would attach to its next append, if any.
    #[must_use]
    pub fn held_token(&self) -> Option<&str> {
        self.sequence_token.as_deref()
    }

    /// Submits a batch, resolving sequence-token races.
    ///
    /// Performs at most `max_attempts` appends. After each failed attempt
    /// (rejection, or a response with no token to adopt) the engine sleeps
    /// `attempt * backoff_multiplier`, refreshes its token from the
    /// stream, and retries. A validated response updates the held token
    /// and ends the loop; spending the budget ends it with
    /// [`ShipError::ExhaustedRetries`] wrapping the last cause.
    pub async fn submit(&mut self, events: Vec<LogEvent>) -> Result<PutLogEventsAck, ShipError> {
        let batch = LogBatch {
            group: self.group.clone(),
            stream: self.stream.clone(),
            events,
        };

        let mut attempt = 0u32;
        loop {
            attempt += 1;

            let failure = match self
                .api
                .put_log_events(&batch, self.sequence_token.as_deref())
                .await
            {
                Ok(ack) if ack.is_valid() => {
                    self.sequence_token = ack.next_token.clone();
                    debug!(
                        group = %self.group,
                        stream = %self.stream,
                        events = batch.events.len(),
                        attempt,
                        "log batch accepted"
                    );
                    return Ok(ack);
                }
                Ok(ack) => AttemptError::MalformedResponse {
                    http_status: ack.http_status,
                },
                Err(err) => AttemptError::Api(err),
            };

            warn!(
                group = %self.group,
                stream = %self.stream,
                attempt,
                max_attempts = self.max_attempts,
                error = %failure,
                "log batch submission failed"
            );

            if attempt >= self.max_attempts {
                return Err(ShipError::ExhaustedRetries {
                    attempts: attempt,
                    source: failure,
                });
            }

            tokio::time::sleep(self.backoff_multiplier * attempt).await;
            self.refresh_token().await;
        }
    }

    /// Best-effort adoption of the stream's current append position. The
    /// token may already be stale again by the time it is used; the retry
    /// loop absorbs that.
    async fn refresh_token(&mut self) {
        match self
            .api
            .describe_stream_token(&self.group, &self.stream)
            .await
        {
            Ok(Some(token)) => self.sequence_token = Some(token),
            // A stream with no prior successful append has no token to
            // adopt; the held state stays as it is.
            Ok(None) => {}
            Err(err) => {
                warn!(
                    group = %self.group,
                    stream = %self.stream,
                    error = %err,
                    "failed to refresh sequence token"
                );
            }
        }
    }
}
