//! Batched CloudWatch Logs shipping.
//!
//! CloudWatch enforces a global append order per log stream through a
//! single mutable sequence token: every `PutLogEvents` call after the first
//! must present the token returned by the previous successful call. When
//! several processes write to one stream they race for that token; the
//! losers are rejected and must refresh and retry.
//!
//! This module splits the problem in two:
//!
//! - [`aggregator::Aggregator`] buffers events locally so one
//!   token-dependent call covers a whole batch instead of one per line.
//! - [`shipper::Shipper`] owns the token handshake: attach the held token,
//!   submit, and on rejection sleep (linearly increasing backoff), refresh
//!   the token from the stream, and retry up to a bounded attempt count.
//!
//! [`logger::CloudwatchLogs`] wires both behind a leveled logging surface
//! and the `cloudpipe_core::LogSink` trait, and also carries the log
//! group/stream management calls (creation, retention, tags).

pub mod aggregator;
pub mod api;
pub mod client;
pub mod constants;
pub mod logger;
pub mod shipper;

#[cfg(test)]
pub(crate) mod testutil;

pub use api::{ApiError, LogBatch, LogEvent, LogsApi, PutLogEventsAck};
pub use client::SdkLogsApi;
pub use logger::{CloudwatchConfig, CloudwatchError, CloudwatchLogs};
pub use shipper::{AttemptError, ShipError, Shipper};
