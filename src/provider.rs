//! Provider trait for event sources

use crate::Result;
use crate::events::SourceEvent;

/// Trait for reading sources driven by a background worker
///
/// Providers abstract over the live serial device and the simulator and
/// handle their own timing internally. The [`Driver`](crate::driver::Driver)
/// owns the provider and forwards every batch it yields.
#[async_trait::async_trait]
pub trait Provider: Send + 'static {
    /// Wait for the next batch of events
    ///
    /// Returns:
    /// - `Ok(Some(events))` - Events to forward, in order
    /// - `Ok(None)` - Source ended (normal termination)
    /// - `Err(e)` - Session-ending failure
    ///
    /// Each provider handles timing internally:
    /// - Live: Polls the port and sleeps briefly when idle
    /// - Simulated: Waits for the next interval tick
    ///
    /// The future is dropped on cancellation, so it must not hold state
    /// that would be lost mid-await.
    async fn next_events(&mut self) -> Result<Option<Vec<SourceEvent>>>;

    /// Short name used in logs (endpoint or "simulator")
    fn label(&self) -> &str;
}
