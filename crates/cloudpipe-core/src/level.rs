//! Log severity scale shared by every sink.
//!
//! Five levels, ordered from least to most severe:
//! DEBUG (10) < INFO (20) < WARNING (30) < ERROR (40) < CRITICAL (50).
//!
//! A sink configured at a given level records a message iff the message's
//! rank is greater than or equal to the configured rank. Level names parse
//! case-insensitively; anything outside the recognized set is a
//! configuration error raised at construction time, never per call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// Severity of a log message, or the threshold a sink is configured with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    /// Diagnostic detail useful while debugging.
    Debug,
    /// Normal operational information. The default threshold.
    #[default]
    Info,
    /// Hazardous situations that may lead to errors.
    Warning,
    /// Errors that interrupted an operation.
    Error,
    /// Very serious errors that prevent normal operation.
    Critical,
}

impl LogLevel {
    /// All levels, in ascending rank order.
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    /// Numeric rank used for threshold comparison.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            LogLevel::Debug => 10,
            LogLevel::Info => 20,
            LogLevel::Warning => 30,
            LogLevel::Error => 40,
            LogLevel::Critical => 50,
        }
    }

    /// Returns true when a message at `message` level passes a threshold of
    /// `self`.
    #[must_use]
    pub fn allows(self, message: LogLevel) -> bool {
        message.rank() >= self.rank()
    }
}

impl AsRef<str> for LogLevel {
    fn as_ref(&self) -> &str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Error returned when a level name is not one of the recognized set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid log level '{input}'. Valid levels are: debug, info, warning, error, critical")]
pub struct ParseLevelError {
    input: String,
}

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            // "warn" survives as an alias for compatibility with callers
            // that configured the short form.
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            "critical" => Ok(LogLevel::Critical),
            _ => Err(ParseLevelError {
                input: s.to_string(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    /// Strict deserialization: an unrecognized level name fails
    /// deserialization instead of falling back to a default, so a typo in a
    /// config file surfaces immediately.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("CrItIcAl".parse::<LogLevel>().unwrap(), LogLevel::Critical);
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warning);
    }

    #[test]
    fn test_parse_rejects_unknown_name() {
        let err = "verbose".parse::<LogLevel>().unwrap_err();
        assert!(err.to_string().contains("verbose"));
        assert!(err.to_string().contains("critical"));
    }

    #[test]
    fn test_ranks_are_ordered() {
        let ranks: Vec<u8> = LogLevel::ALL.iter().map(|l| l.rank()).collect();
        assert_eq!(ranks, vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn test_allows_matrix() {
        // Full 5x5 matrix: a threshold allows a message iff the message
        // rank is at least the threshold rank.
        for threshold in LogLevel::ALL {
            for message in LogLevel::ALL {
                assert_eq!(
                    threshold.allows(message),
                    message.rank() >= threshold.rank(),
                    "threshold {threshold} message {message}"
                );
            }
        }
    }

    #[test]
    fn test_display_matches_as_ref() {
        for level in LogLevel::ALL {
            assert_eq!(level.to_string(), level.as_ref());
        }
    }

    #[test]
    fn test_deserialize_valid() {
        let level: LogLevel = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(level, LogLevel::Warning);
    }

    #[test]
    fn test_deserialize_invalid_is_an_error() {
        let result: Result<LogLevel, _> = serde_json::from_str("\"loud\"");
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn prop_parse_roundtrip_any_casing(level in prop::sample::select(LogLevel::ALL.to_vec()), upper in any::<[bool; 8]>()) {
            // Re-case the canonical name arbitrarily; parsing must still
            // recover the same level.
            let name: String = level
                .as_ref()
                .chars()
                .enumerate()
                .map(|(i, c)| {
                    if upper[i % upper.len()] {
                        c.to_ascii_uppercase()
                    } else {
                        c.to_ascii_lowercase()
                    }
                })
                .collect();
            prop_assert_eq!(name.parse::<LogLevel>().unwrap(), level);
        }

        #[test]
        fn prop_allows_is_rank_comparison(
            threshold in prop::sample::select(LogLevel::ALL.to_vec()),
            message in prop::sample::select(LogLevel::ALL.to_vec()),
        ) {
            prop_assert_eq!(threshold.allows(message), message.rank() >= threshold.rank());
        }
    }
}
