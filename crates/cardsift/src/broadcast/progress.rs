//! Progress broadcaster for streaming file events to in-process subscribers.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::pipeline::{ProgressEvent, ProgressSink};

/// Fans progress events out to any number of subscribers.
///
/// Slow subscribers lag and lose the oldest events; the pipeline never waits on them.
/// Meant for embedding the library; the `cardsift` binary reports through
/// [`LogSink`](crate::pipeline::LogSink) or [`JsonLinesSink`](super::JsonLinesSink).
#[derive(Clone)]
pub struct BroadcastSink {
    sender: Arc<broadcast::Sender<ProgressEvent>>,
}

impl BroadcastSink {
    /// Creates a new broadcaster with the specified channel capacity (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sends an event to all subscribers.
    pub fn send(&self, event: ProgressEvent) {
        // Ignore errors - no active receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl ProgressSink for BroadcastSink {
    fn report(&self, event: ProgressEvent) {
        self.send(event);
    }
}
