//! Source lifecycle: the live serial source and the simulator.
//!
//! Both sources share one contract: they emit [`SourceEvent`]s through an
//! [`EventSender`] and publish a [`ConnectionState`]. Running at most one of
//! them at a time is the caller's responsibility.
//!
//! [`SourceEvent`]: crate::events::SourceEvent
//! [`EventSender`]: crate::events::EventSender

use std::time::Duration;
use tokio_stream::wrappers::WatchStream;

use crate::types::ConnectionState;

pub mod live;
pub mod simulated;


pub use live::LiveSource;
pub use simulated::SimulatedSource;

/// How long `disconnect`/`stop` wait for the worker before moving on.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Behaviour shared by both sources.
#[async_trait::async_trait]
pub trait Source: Send {
    /// Whether a worker is currently running.
    fn is_active(&self) -> bool;

    /// Current connection state.
    fn state(&self) -> ConnectionState;

    /// Current state followed by every change.
    fn state_updates(&self) -> WatchStream<ConnectionState>;

    /// Stop the worker if one is running. Safe to call repeatedly.
    async fn shutdown(&mut self);
}
