//! Fixed-tick batching for event streams

use futures::Stream;
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};

/// Extension trait to batch any Stream on a fixed tick
pub trait TickDrainExt: Stream {
    /// Emit, once per tick, everything the inner stream has ready.
    ///
    /// Ticks with nothing ready are skipped. Items still buffered when the
    /// inner stream ends are flushed as a final batch. Periods shorter than
    /// [`MIN_TICK`] are raised to it.
    fn tick_drain(self, period: Duration) -> TickDrain<Self>
    where
        Self: Sized,
    {
        TickDrain::new(self, period)
    }
}

impl<T: Stream> TickDrainExt for T {}

pin_project! {
    /// A stream combinator that drains its source in batches on a timer
    pub struct TickDrain<S: Stream> {
        #[pin]
        stream: S,
        interval: Interval,
        done: bool,
    }
}

/// Shortest accepted drain period.
pub const MIN_TICK: Duration = Duration::from_millis(1);

impl<S: Stream> TickDrain<S> {
    pub fn new(stream: S, period: Duration) -> Self {
        let mut interval = interval(period.max(MIN_TICK));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self { stream, interval, done: false }
    }
}

impl<S: Stream> Stream for TickDrain<S> {
    type Item = Vec<S::Item>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if *this.done {
                return Poll::Ready(None);
            }

            ready!(this.interval.poll_tick(cx));

            let mut batch = Vec::new();
            loop {
                match this.stream.as_mut().poll_next(cx) {
                    Poll::Ready(Some(item)) => batch.push(item),
                    Poll::Ready(None) => {
                        *this.done = true;
                        break;
                    }
                    Poll::Pending => break,
                }
            }

            if !batch.is_empty() {
                return Poll::Ready(Some(batch));
            }
            // Nothing this tick; loop to register the next tick's waker.
        }
    }
}
