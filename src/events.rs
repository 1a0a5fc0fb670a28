//! Events flowing from a source worker to the consumer.
//!
//! The worker never blocks on the consumer: [`EventSender::emit`] uses
//! `try_send` on a bounded channel and drops the event when the queue is
//! full. The consumer drains at its own pace, typically on a fixed tick
//! (see [`run_sink`](crate::sink::run_sink)).

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{trace, warn};

use crate::sink::Sink;
use crate::types::Reading;

/// Default queue depth between worker and consumer.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// One notification produced by a source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// A validated measurement.
    Reading(Reading),
    /// Bytes exactly as received (or synthesized) before framing.
    RawBytes(Vec<u8>),
    /// Human-readable status line.
    Status(String),
}

impl SourceEvent {
    pub fn status(message: impl Into<String>) -> Self {
        SourceEvent::Status(message.into())
    }

    /// Hand this event to the matching sink callback.
    pub fn deliver<S: Sink + ?Sized>(self, sink: &mut S) {
        match self {
            SourceEvent::Reading(reading) => sink.on_reading(reading),
            SourceEvent::RawBytes(bytes) => sink.on_raw_bytes(bytes),
            SourceEvent::Status(message) => sink.on_status(message),
        }
    }
}

/// Create a bounded event channel.
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSender { tx }, EventReceiver { rx })
}

/// Producer half, cloned into every source.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<SourceEvent>,
}

impl EventSender {
    /// Queue an event without waiting.
    ///
    /// Returns `false` once the receiver is gone; a full queue drops the
    /// event and still returns `true`.
    pub fn emit(&self, event: SourceEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!(event = event_name(&event), "Event queue full, dropping event");
                true
            }
            Err(TrySendError::Closed(event)) => {
                trace!(event = event_name(&event), "Event receiver closed");
                false
            }
        }
    }

    /// Queue a status line.
    pub fn status(&self, message: impl Into<String>) -> bool {
        self.emit(SourceEvent::status(message))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half.
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::Receiver<SourceEvent>,
}

impl EventReceiver {
    /// Wait for the next event; `None` once every sender is dropped.
    pub async fn recv(&mut self) -> Option<SourceEvent> {
        self.rx.recv().await
    }

    /// Take everything currently queued without waiting.
    pub fn try_drain(&mut self) -> Vec<SourceEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    pub fn into_stream(self) -> ReceiverStream<SourceEvent> {
        ReceiverStream::new(self.rx)
    }
}

fn event_name(event: &SourceEvent) -> &'static str {
    match event {
        SourceEvent::Reading(_) => "reading",
        SourceEvent::RawBytes(_) => "raw_bytes",
        SourceEvent::Status(_) => "status",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingSink;

    #[tokio::test]
    async fn full_queue_drops_without_blocking() {
        let (tx, mut rx) = event_channel(2);
        assert!(tx.status("one"));
        assert!(tx.status("two"));
        assert!(tx.status("three"));

        let drained = rx.try_drain();
        assert_eq!(drained, vec![SourceEvent::status("one"), SourceEvent::status("two")]);
    }

    #[tokio::test]
    async fn closed_receiver_is_reported() {
        let (tx, rx) = event_channel(4);
        drop(rx);
        assert!(!tx.status("nobody listening"));
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn recv_ends_when_senders_drop() {
        let (tx, mut rx) = event_channel(4);
        tx.emit(SourceEvent::RawBytes(vec![1, 2, 3]));
        drop(tx);

        assert_eq!(rx.recv().await, Some(SourceEvent::RawBytes(vec![1, 2, 3])));
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn deliver_routes_to_callbacks() {
        let mut sink = RecordingSink::default();
        SourceEvent::RawBytes(b"abc".to_vec()).deliver(&mut sink);
        SourceEvent::status("hello").deliver(&mut sink);

        assert_eq!(sink.raw, vec![b"abc".to_vec()]);
        assert_eq!(sink.statuses, vec!["hello".to_string()]);
        assert!(sink.readings.is_empty());
    }
}
