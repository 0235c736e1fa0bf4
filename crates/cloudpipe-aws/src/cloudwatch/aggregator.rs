//! In-memory accumulation of log events into submission batches.

use crate::cloudwatch::api::LogEvent;

/// Buffers events in emission order until the batch threshold is reached.
///
/// The aggregator never talks to the network; it only decides when a batch
/// is full. Order is preserved end to end: events leave in exactly the
/// order they were pushed. Nothing is persisted; a crash loses whatever is
/// buffered, which is an accepted tradeoff of the design.
#[derive(Debug)]
pub struct Aggregator {
    events: Vec<LogEvent>,
    batch_size: usize,
}

impl Aggregator {
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Aggregator {
            events: Vec::with_capacity(batch_size),
            batch_size,
        }
    }

    /// Appends an event. Returns the accumulated batch once the threshold
    /// is reached, leaving the buffer empty.
    pub fn push(&mut self, event: LogEvent) -> Option<Vec<LogEvent>> {
        self.events.push(event);
        if self.events.len() >= self.batch_size {
            Some(self.take())
        } else {
            None
        }
    }

    /// Hands back everything buffered regardless of size, leaving the
    /// buffer empty.
    pub fn take(&mut self) -> Vec<LogEvent> {
        std::mem::replace(&mut self.events, Vec::with_capacity(self.batch_size))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
