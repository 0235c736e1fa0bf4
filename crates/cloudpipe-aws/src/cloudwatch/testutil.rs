//! In-memory `LogsApi` recorder used by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::cloudwatch::api::{ApiError, LogBatch, LogsApi, PutLogEventsAck};

/// One recorded `put_log_events` call.
#[derive(Debug)]
pub struct RecordedPut {
    pub messages: Vec<String>,
    pub token: Option<String>,
}

/// Scriptable in-memory stand-in for the remote API.
///
/// `put_log_events` pops queued responses in order and falls back to a
/// fresh valid acknowledgement when the queue is empty. Every call is
/// recorded so tests can assert on call counts, payloads and tokens.
#[derive(Default)]
pub struct MockLogsApi {
    pub groups: Mutex<Vec<String>>,
    pub streams: Mutex<Vec<(String, String)>>,
    pub retention: Mutex<Vec<(String, i32)>>,
    pub tags: Mutex<Vec<(String, HashMap<String, String>)>>,
    pub group_exists: bool,
    pub stream_exists: bool,

    pub put_calls: Mutex<Vec<RecordedPut>>,
    put_responses: Mutex<VecDeque<Result<PutLogEventsAck, ApiError>>>,

    pub describe_calls: Mutex<u32>,
    stream_token: Mutex<Option<String>>,
    describe_failure: Mutex<Option<ApiError>>,
}

/// Valid acknowledgement carrying `token`.
pub fn ack(token: &str) -> PutLogEventsAck {
    PutLogEventsAck {
        http_status: 200,
        next_token: Some(token.to_string()),
    }
}

impl MockLogsApi {
    pub fn with_existing_group() -> Self {
        MockLogsApi {
            group_exists: true,
            ..Default::default()
        }
    }

    pub fn with_existing_stream() -> Self {
        MockLogsApi {
            stream_exists: true,
            ..Default::default()
        }
    }

    pub fn queue_put(&self, response: Result<PutLogEventsAck, ApiError>) {
        self.put_responses.lock().unwrap().push_back(response);
    }

    pub fn set_stream_token(&self, token: Option<&str>) {
        *self.stream_token.lock().unwrap() = token.map(str::to_string);
    }

    pub fn fail_describe(&self, err: ApiError) {
        *self.describe_failure.lock().unwrap() = Some(err);
    }

    pub fn put_count(&self) -> usize {
        self.put_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LogsApi for MockLogsApi {
    async fn create_log_group(&self, group: &str) -> Result<(), ApiError> {
        if self.group_exists {
            return Err(ApiError::AlreadyExists { resource: "group" });
        }
        self.groups.lock().unwrap().push(group.to_string());
        Ok(())
    }

    async fn create_log_stream(&self, group: &str, stream: &str) -> Result<(), ApiError> {
        if self.stream_exists {
            return Err(ApiError::AlreadyExists { resource: "stream" });
        }
        self.streams
            .lock()
            .unwrap()
            .push((group.to_string(), stream.to_string()));
        Ok(())
    }

    async fn put_retention_policy(&self, group: &str, days: i32) -> Result<(), ApiError> {
        self.retention
            .lock()
            .unwrap()
            .push((group.to_string(), days));
        Ok(())
    }

    async fn tag_log_group(
        &self,
        group: &str,
        tags: &HashMap<String, String>,
    ) -> Result<(), ApiError> {
        self.tags
            .lock()
            .unwrap()
            .push((group.to_string(), tags.clone()));
        Ok(())
    }

    async fn put_log_events(
        &self,
        batch: &LogBatch,
        token: Option<&str>,
    ) -> Result<PutLogEventsAck, ApiError> {
        let call_number = {
            let mut calls = self.put_calls.lock().unwrap();
            calls.push(RecordedPut {
                messages: batch.events.iter().map(|e| e.message.clone()).collect(),
                token: token.map(str::to_string),
            });
            calls.len()
        };

        match self.put_responses.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(ack(&format!("token-{call_number}"))),
        }
    }

    async fn describe_stream_token(
        &self,
        _group: &str,
        _stream: &str,
    ) -> Result<Option<String>, ApiError> {
        *self.describe_calls.lock().unwrap() += 1;
        if let Some(err) = self.describe_failure.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self.stream_token.lock().unwrap().clone())
    }
}
