//! Shared AWS conveniences.
//!
//! Two independent pieces:
//!
//! - [`cloudwatch`] — a batched CloudWatch Logs sink built for distributed
//!   writers. Log lines are buffered into batches and appended through the
//!   per-stream sequence-token handshake, with a retry/backoff loop that
//!   absorbs the token races concurrent writers inevitably hit.
//! - [`s3`] — thin wrappers over the S3 object API (get/put/delete/copy,
//!   transfers, sizes, key matching).
//!
//! The CloudWatch sink implements `cloudpipe_core::LogSink`, so it can be
//! attached to the fan-out logger facade next to the stdout and file sinks.

pub mod cloudwatch;
pub mod s3;
