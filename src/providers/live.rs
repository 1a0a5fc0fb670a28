//! Live provider reading a serial byte channel

use std::io;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::assembler::FrameAssembler;
use crate::events::SourceEvent;
use crate::parser::RecordParser;
use crate::provider::Provider;
use crate::serial::ByteChannel;
use crate::{MonitorError, Result};

/// Sleep between polls when the port has nothing buffered.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Interval between byte-count diagnostics.
pub const REPORT_INTERVAL: Duration = Duration::from_secs(10);

/// Hints logged when a session has produced no bytes at all.
pub const NO_DATA_HINTS: [&str; 4] = [
    "Enable the monitor's USB/serial output function",
    "Check the baud rate (try 9600, 19200, 38400 or 115200)",
    "Use a data-capable USB cable, not a charge-only one",
    "Complete one measurement on the device",
];

/// Live provider that polls a byte channel, frames and parses the stream
pub struct LiveProvider<C: ByteChannel> {
    endpoint: String,
    channel: C,
    assembler: FrameAssembler,
    parser: RecordParser,
    total_bytes: u64,
    last_report: Instant,
    poll_interval: Duration,
    report_interval: Duration,
}

impl<C: ByteChannel> LiveProvider<C> {
    /// Create a provider over an already opened channel
    pub fn new(endpoint: impl Into<String>, channel: C) -> Self {
        Self {
            endpoint: endpoint.into(),
            channel,
            assembler: FrameAssembler::new(),
            parser: RecordParser::new(),
            total_bytes: 0,
            last_report: Instant::now(),
            poll_interval: POLL_INTERVAL,
            report_interval: REPORT_INTERVAL,
        }
    }

    /// Override the idle poll interval
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Override the diagnostic interval
    pub fn with_report_interval(mut self, report_interval: Duration) -> Self {
        self.report_interval = report_interval;
        self
    }

    /// Total bytes read since the provider was created
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Turn one read into events: the raw bytes first, then any readings.
    pub fn ingest(&mut self, bytes: Vec<u8>) -> Vec<SourceEvent> {
        self.total_bytes += bytes.len() as u64;
        trace!(endpoint = %self.endpoint, bytes = bytes.len(), hex = %hex::encode(&bytes), "Read");

        let frames = self.assembler.feed(&bytes);
        let mut events = Vec::with_capacity(1 + frames.len());
        events.push(SourceEvent::RawBytes(bytes));

        for frame in frames {
            if frame.forced {
                debug!(
                    endpoint = %self.endpoint,
                    bytes = frame.bytes.len(),
                    "Parsing forced flush"
                );
            }
            if let Some(reading) = self.parser.parse(&frame.bytes) {
                events.push(SourceEvent::Reading(reading));
            }
        }

        events
    }

    fn diagnostic(&mut self) -> SourceEvent {
        self.last_report = Instant::now();

        if self.total_bytes == 0 {
            warn!(
                endpoint = %self.endpoint,
                "No data received in {}s. Check:",
                self.report_interval.as_secs()
            );
            for (n, hint) in NO_DATA_HINTS.iter().enumerate() {
                warn!("  {}. {}", n + 1, hint);
            }
            SourceEvent::status(format!("No data received from {} yet", self.endpoint))
        } else {
            info!(endpoint = %self.endpoint, total_bytes = self.total_bytes, "Receive diagnostic");
            SourceEvent::status(format!(
                "Received {} bytes from {}",
                self.total_bytes, self.endpoint
            ))
        }
    }

    fn poll_read(&mut self) -> io::Result<Option<Vec<u8>>> {
        let available = match self.channel.bytes_available() {
            Ok(0) => return Ok(None),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => return Ok(None),
            Err(e) => return Err(e),
        };

        let mut buf = vec![0u8; available];
        match self.channel.read_available(&mut buf) {
            Ok(0) => Ok(None),
            Ok(n) => {
                buf.truncate(n);
                Ok(Some(buf))
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait::async_trait]
impl<C: ByteChannel> Provider for LiveProvider<C> {
    async fn next_events(&mut self) -> Result<Option<Vec<SourceEvent>>> {
        loop {
            if self.last_report.elapsed() >= self.report_interval {
                return Ok(Some(vec![self.diagnostic()]));
            }

            match self.poll_read() {
                Ok(Some(bytes)) => return Ok(Some(self.ingest(bytes))),
                Ok(None) => tokio::time::sleep(self.poll_interval).await,
                Err(e) => return Err(MonitorError::io(self.endpoint.clone(), e)),
            }
        }
    }

    fn label(&self) -> &str {
        &self.endpoint
    }
}
