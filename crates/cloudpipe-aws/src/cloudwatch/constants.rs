//! Defaults and fixed limits of the CloudWatch component.

/// Retention periods CloudWatch accepts, in days. Anything else is rejected
/// locally before a request is made.
pub const ALLOWED_RETENTION_DAYS: [i32; 16] = [
    1, 3, 5, 7, 14, 30, 90, 120, 150, 180, 365, 400, 545, 731, 1827, 3653,
];

/// Events buffered per batch before a submission is triggered.
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// Submission attempts before a batch is given up on.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Seconds multiplied by the attempt number to get the wait between
/// attempts.
pub const DEFAULT_BACKOFF_MULTIPLIER_SECS: u64 = 10;

/// Retention applied to newly created log groups.
pub const DEFAULT_RETENTION_DAYS: i32 = 14;
