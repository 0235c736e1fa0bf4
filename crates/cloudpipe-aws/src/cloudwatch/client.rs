//! AWS SDK adapter for the [`LogsApi`] trait.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_cloudwatchlogs::error::DisplayErrorContext;
use aws_sdk_cloudwatchlogs::types::InputLogEvent;
use aws_sdk_cloudwatchlogs::Client;

use crate::cloudwatch::api::{ApiError, LogBatch, LogsApi, PutLogEventsAck};

/// Production [`LogsApi`] backed by `aws_sdk_cloudwatchlogs`.
pub struct SdkLogsApi {
    client: Client,
}

impl SdkLogsApi {
    #[must_use]
    pub fn new(client: Client) -> Self {
        SdkLogsApi { client }
    }
}

fn service_error<E: std::error::Error>(err: E) -> ApiError {
    ApiError::service(format!("{}", DisplayErrorContext(&err)))
}

#[async_trait]
impl LogsApi for SdkLogsApi {
    async fn create_log_group(&self, group: &str) -> Result<(), ApiError> {
        self.client
            .create_log_group()
            .log_group_name(group)
            .send()
            .await
            .map(|_| ())
            .map_err(|err| {
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_already_exists_exception())
                {
                    ApiError::AlreadyExists { resource: "group" }
                } else {
                    service_error(err)
                }
            })
    }

    async fn create_log_stream(&self, group: &str, stream: &str) -> Result<(), ApiError> {
        self.client
            .create_log_stream()
            .log_group_name(group)
            .log_stream_name(stream)
            .send()
            .await
            .map(|_| ())
            .map_err(|err| {
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_already_exists_exception())
                {
                    ApiError::AlreadyExists { resource: "stream" }
                } else {
                    service_error(err)
                }
            })
    }

    async fn put_retention_policy(&self, group: &str, days: i32) -> Result<(), ApiError> {
        self.client
            .put_retention_policy()
            .log_group_name(group)
            .retention_in_days(days)
            .send()
            .await
            .map(|_| ())
            .map_err(service_error)
    }

    // The non-deprecated tag_resource call requires the group ARN, which
    // callers of this surface do not have.
    #[allow(deprecated)]
    async fn tag_log_group(
        &self,
        group: &str,
        tags: &HashMap<String, String>,
    ) -> Result<(), ApiError> {
        self.client
            .tag_log_group()
            .log_group_name(group)
            .set_tags(Some(tags.clone()))
            .send()
            .await
            .map(|_| ())
            .map_err(service_error)
    }

    async fn put_log_events(
        &self,
        batch: &LogBatch,
        token: Option<&str>,
    ) -> Result<PutLogEventsAck, ApiError> {
        let events = batch
            .events
            .iter()
            .map(|event| {
                InputLogEvent::builder()
                    .timestamp(event.timestamp_ms)
                    .message(event.message.as_str())
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| ApiError::service(err.to_string()))?;

        let mut request = self
            .client
            .put_log_events()
            .log_group_name(&batch.group)
            .log_stream_name(&batch.stream)
            .set_log_events(Some(events));
        if let Some(token) = token {
            request = request.sequence_token(token);
        }

        let response = request.send().await.map_err(service_error)?;

        // The SDK only yields Ok on a success status.
        Ok(PutLogEventsAck {
            http_status: 200,
            next_token: response.next_sequence_token().map(str::to_string),
        })
    }

    async fn describe_stream_token(
        &self,
        group: &str,
        stream: &str,
    ) -> Result<Option<String>, ApiError> {
        let response = self
            .client
            .describe_log_streams()
            .log_group_name(group)
            .log_stream_name_prefix(stream)
            .send()
            .await
            .map_err(service_error)?;

        Ok(response
            .log_streams()
            .first()
            .and_then(|s| s.upload_sequence_token())
            .map(str::to_string))
    }
}
