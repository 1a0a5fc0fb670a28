//! Consumer-side contract for source events.

use std::time::Duration;

use futures::StreamExt;
use tracing::debug;

use crate::events::EventReceiver;
use crate::stream::TickDrainExt;
use crate::types::Reading;

/// Receiver of readings, raw bytes and status lines.
///
/// Implemented by the presentation layer. Callbacks run on the consumer's
/// task, never on a source worker.
pub trait Sink {
    fn on_reading(&mut self, reading: Reading);

    fn on_raw_bytes(&mut self, bytes: Vec<u8>);

    fn on_status(&mut self, status: String);
}

/// Deliver events to `sink` in batches, once per `tick`.
///
/// A zero `tick` is raised to [`MIN_TICK`](crate::stream::MIN_TICK).
///
/// Runs until every [`EventSender`](crate::events::EventSender) is dropped
/// and the queue is empty. Returns the number of events delivered.
pub async fn run_sink<S: Sink + ?Sized>(
    events: EventReceiver,
    tick: Duration,
    sink: &mut S,
) -> usize {
    let mut batches = events.into_stream().tick_drain(tick);
    let mut delivered = 0;

    while let Some(batch) = batches.next().await {
        debug!(events = batch.len(), "Delivering batch");
        delivered += batch.len();
        for event in batch {
            event.deliver(&mut *sink);
        }
    }

    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{SourceEvent, event_channel};
    use crate::test_utils::RecordingSink;

    #[tokio::test(start_paused = true)]
    async fn drains_until_senders_drop() {
        let (tx, rx) = event_channel(8);
        let producer = tokio::spawn(async move {
            tx.emit(SourceEvent::RawBytes(vec![0x31]));
            tokio::time::sleep(Duration::from_millis(250)).await;
            tx.status("done");
        });

        let mut sink = RecordingSink::default();
        let delivered = run_sink(rx, Duration::from_millis(100), &mut sink).await;
        producer.await.unwrap();

        assert_eq!(delivered, 2);
        assert_eq!(sink.raw, vec![vec![0x31]]);
        assert_eq!(sink.statuses, vec!["done".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_tick_still_delivers() {
        let (tx, rx) = event_channel(8);
        tx.status("ready");
        drop(tx);

        let mut sink = RecordingSink::default();
        assert_eq!(run_sink(rx, Duration::ZERO, &mut sink).await, 1);
        assert_eq!(sink.statuses, vec!["ready".to_string()]);
    }
}
