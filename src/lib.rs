//! Serial ingestion for blood-pressure monitors.
//!
//! bplink reads the byte stream of a serial-attached blood-pressure monitor,
//! cuts it into records, validates each record into a [`Reading`] and hands
//! readings, raw bytes and status lines to a consumer.
//!
//! # Features
//!
//! - **Live source**: polls a serial port at 8-N-1 on a background worker
//! - **Simulated source**: plausible synthetic readings with the same contract
//! - **Lenient framing**: CR or LF terminators, bounded buffering of noise
//! - **Never-fail parsing**: rejected frames are logged, never propagated
//!
//! # Architecture
//!
//! ```text
//! ByteChannel -> FrameAssembler -> RecordParser -> SourceEvent --(mpsc)--> run_sink -> Sink
//!                      LiveProvider                    |
//!                SimulatedProvider --------------------+
//! ```
//!
//! Each active source runs exactly one worker spawned by the
//! [`Driver`](driver::Driver). Workers never block on the consumer: events
//! go through a bounded queue that the consumer drains on a fixed tick.
//!
//! ## Example (simulated source)
//!
//! ```rust,no_run
//! use bplink::{Monitor, Reading, Sink, run_sink};
//! use std::time::Duration;
//!
//! struct Console;
//!
//! impl Sink for Console {
//!     fn on_reading(&mut self, reading: Reading) {
//!         println!("{reading}");
//!     }
//!     fn on_raw_bytes(&mut self, _bytes: Vec<u8>) {}
//!     fn on_status(&mut self, status: String) {
//!         println!("[{status}]");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (events, receiver) = Monitor::event_channel(256);
//!     let mut source = Monitor::simulate(&events, 1.0);
//!     drop(events);
//!
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_secs(10)).await;
//!         source.stop().await;
//!     });
//!
//!     run_sink(receiver, Duration::from_millis(100), &mut Console).await;
//! }
//! ```

// Core types and error handling
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Ingestion pipeline
pub mod assembler;
pub mod parser;
pub mod serial;

// Event delivery
pub mod events;
pub mod sink;
pub mod stream;

// Worker architecture
pub mod connection;
pub mod driver;
pub mod provider;
pub mod providers;

// Supporting features
pub mod config;
pub mod history;
pub mod snapshot;

// Core exports
pub use error::*;
pub use types::*;

pub use assembler::{Frame, FrameAssembler};
pub use config::MonitorConfig;
pub use connection::{LiveSource, SimulatedSource, Source};
pub use events::{EventReceiver, EventSender, SourceEvent, event_channel};
pub use history::ReadingHistory;
pub use parser::RecordParser;
pub use serial::PortInfo;
pub use sink::{Sink, run_sink};
pub use snapshot::ReadingSnapshot;

use std::time::Duration;

/// Default read timeout for live connections.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(1);

/// Unified entry point for creating sources.
///
/// Both sources publish into the same event channel; the consumer does not
/// need to know which one is running.
///
/// # Examples
///
/// ## Live device
/// ```rust,no_run
/// use bplink::{BaudRate, Monitor};
///
/// #[tokio::main]
/// async fn main() -> bplink::Result<()> {
///     let (events, _receiver) = Monitor::event_channel(256);
///     let ports = Monitor::list_ports()?;
///     let port = bplink::serial::pick_default(&ports, "COM3").expect("no serial ports");
///     let mut source = Monitor::connect(&events, &port.name, BaudRate::B9600).await?;
///     // Consume events...
///     source.disconnect().await;
///     Ok(())
/// }
/// ```
pub struct Monitor;

impl Monitor {
    /// Create the bounded channel sources publish into.
    pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
        event_channel(capacity)
    }

    /// Enumerate serial endpoints.
    pub fn list_ports() -> Result<Vec<PortInfo>> {
        serial::list_ports()
    }

    /// Create an idle live source.
    pub fn live(events: &EventSender) -> LiveSource {
        LiveSource::new(events.clone())
    }

    /// Open `endpoint` and start reading.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Connection`] when the port is busy, missing or
    /// cannot be configured. A status event describing the failure is emitted
    /// as well.
    pub async fn connect(
        events: &EventSender,
        endpoint: &str,
        baud: BaudRate,
    ) -> Result<LiveSource> {
        let mut source = Self::live(events);
        source.connect(endpoint, baud, DEFAULT_IO_TIMEOUT).await?;
        Ok(source)
    }

    /// Create an idle simulated source.
    pub fn simulated(events: &EventSender) -> SimulatedSource {
        SimulatedSource::new(events.clone())
    }

    /// Start a simulator producing one reading every `interval_secs` (at least 1).
    pub fn simulate(events: &EventSender, interval_secs: f64) -> SimulatedSource {
        let mut source = Self::simulated(events);
        source.start(interval_secs);
        source
    }
}
