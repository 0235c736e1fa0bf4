//! Leveled logging facade with pluggable sinks.
//!
//! The facade is a thin fan-out: a [`Logger`] holds any number of boxed
//! [`LogSink`] implementations and forwards every leveled call to each of
//! them. Sinks decide independently whether a message passes their level
//! threshold and where it goes (stdout, a dated file, a remote log stream).
//!
//! Sinks that buffer (such as a batched remote sink) deliver their backlog
//! on [`Logger::flush`]; the unbuffered sinks treat flush as a no-op.

pub mod level;
pub mod logger;
pub mod sink;
pub mod sinks;

pub use level::{LogLevel, ParseLevelError};
pub use logger::{Logger, LoggerBuilder};
pub use sink::{LogSink, SinkError};
