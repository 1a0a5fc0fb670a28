//! Test utilities: scripted byte channels, a recording sink and record fixtures
//!
//! These helpers stand in for a physical monitor so the live pipeline can be
//! exercised without hardware. They are also compiled for the `benchmark`
//! feature so the criterion benches can build realistic byte streams.

#![cfg(any(test, feature = "benchmark"))]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::serial::ByteChannel;
use crate::sink::Sink;
use crate::types::Reading;

/// Device serial number used by every fixture record.
pub const FIXTURE_DEVICE_ID: &str = "00000000000000000001";

/// A well-formed device record (without terminator) taken 2024-01-15 09:30.
pub fn sample_record(systolic: u16, diastolic: u16, pulse: u16) -> Vec<u8> {
    format!("2024,01,15,09,30,{FIXTURE_DEVICE_ID},0,{systolic:03},{diastolic:03},{pulse:03},0")
        .into_bytes()
}

/// A byte stream of `records` CR LF terminated records with line noise between them.
///
/// Every third record is preceded by a blank line and every fifth by a
/// short garbage line that the parser rejects.
pub fn noisy_stream(records: usize) -> Vec<u8> {
    let mut stream = Vec::new();
    for n in 0..records {
        if n % 3 == 0 {
            stream.extend_from_slice(b"\r\n");
        }
        if n % 5 == 0 {
            stream.extend_from_slice(b"\x00\xffERR,12\r\n");
        }
        let systolic = 100 + (n % 60) as u16;
        let diastolic = 60 + (n % 30) as u16;
        let pulse = 55 + (n % 40) as u16;
        stream.extend_from_slice(&sample_record(systolic, diastolic, pulse));
        stream.extend_from_slice(b"\r\n");
    }
    stream
}

#[derive(Debug)]
enum Step {
    Idle,
    Data(Vec<u8>),
    Fail(io::ErrorKind),
}

/// In-memory [`ByteChannel`] replaying a script of reads.
///
/// Clones share the same script, so a test can keep a handle and feed more
/// data after the channel has been moved into a source. An exhausted script
/// behaves like an idle port.
#[derive(Debug, Clone, Default)]
pub struct ScriptedChannel {
    steps: Arc<Mutex<VecDeque<Step>>>,
}

impl ScriptedChannel {
    /// Report no data for `polls` polls.
    pub fn idle(self, polls: usize) -> Self {
        self.steps().extend((0..polls).map(|_| Step::Idle));
        self
    }

    /// Make `bytes` available in one read.
    pub fn data(self, bytes: impl Into<Vec<u8>>) -> Self {
        self.push_data(bytes);
        self
    }

    /// Fail the next poll with `kind`.
    pub fn fail(self, kind: io::ErrorKind) -> Self {
        self.push_failure(kind);
        self
    }

    pub fn push_data(&self, bytes: impl Into<Vec<u8>>) {
        self.steps().push_back(Step::Data(bytes.into()));
    }

    pub fn push_failure(&self, kind: io::ErrorKind) {
        self.steps().push_back(Step::Fail(kind));
    }

    /// Steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.steps().len()
    }

    fn steps(&self) -> MutexGuard<'_, VecDeque<Step>> {
        self.steps.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ByteChannel for ScriptedChannel {
    fn bytes_available(&mut self) -> io::Result<usize> {
        let mut steps = self.steps();
        match steps.front() {
            Some(Step::Data(bytes)) => Ok(bytes.len()),
            Some(Step::Idle) => {
                steps.pop_front();
                Ok(0)
            }
            Some(Step::Fail(kind)) => {
                let kind = *kind;
                steps.pop_front();
                Err(io::Error::new(kind, "scripted failure"))
            }
            None => Ok(0),
        }
    }

    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut steps = self.steps();
        let Some(Step::Data(bytes)) = steps.front_mut() else {
            return Ok(0);
        };

        let n = buf.len().min(bytes.len());
        buf[..n].copy_from_slice(&bytes[..n]);
        bytes.drain(..n);
        if bytes.is_empty() {
            steps.pop_front();
        }
        Ok(n)
    }
}

/// [`Sink`] that records every callback.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub readings: Vec<Reading>,
    pub raw: Vec<Vec<u8>>,
    pub statuses: Vec<String>,
}

impl Sink for RecordingSink {
    fn on_reading(&mut self, reading: Reading) {
        self.readings.push(reading);
    }

    fn on_raw_bytes(&mut self, bytes: Vec<u8>) {
        self.raw.push(bytes);
    }

    fn on_status(&mut self, status: String) {
        self.statuses.push(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::RecordParser;

    #[test]
    fn sample_record_is_accepted() {
        let reading = RecordParser::new().inspect(&sample_record(118, 76, 64)).unwrap();
        assert_eq!((reading.systolic(), reading.diastolic(), reading.pulse()), (118, 76, 64));
    }

    #[test]
    fn scripted_channel_replays_in_order() {
        let mut channel = ScriptedChannel::default().idle(1).data(b"abcdef".to_vec());
        let mut buf = [0u8; 4];

        assert_eq!(channel.bytes_available().unwrap(), 0);
        assert_eq!(channel.bytes_available().unwrap(), 6);
        assert_eq!(channel.read_available(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(channel.bytes_available().unwrap(), 2);
        assert_eq!(channel.read_available(&mut buf).unwrap(), 2);
        assert_eq!(channel.remaining(), 0);
    }

    #[test]
    fn clones_share_the_script() {
        let mut channel = ScriptedChannel::default();
        let feeder = channel.clone();
        feeder.push_failure(io::ErrorKind::BrokenPipe);

        let error = channel.bytes_available().unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
    }
}
