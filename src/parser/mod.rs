//! Record parsing.
//!
//! A [`RecordParser`] turns one frame from the
//! [`FrameAssembler`](crate::assembler::FrameAssembler) into a validated
//! [`Reading`], or explains why it could not. Nothing here returns an error
//! to the read loop: [`RecordParser::parse`] logs the outcome and yields
//! `None` for rejected frames.
//!
//! ```rust
//! use bplink::parser::RecordParser;
//!
//! let parser = RecordParser::new();
//! let reading = parser
//!     .parse(b"2024,01,15,09,30,00000000000000000001,0,120,080,070,0")
//!     .unwrap();
//! assert_eq!((reading.systolic(), reading.diastolic(), reading.pulse()), (120, 80, 70));
//! ```

mod decode;
mod record;

pub use decode::{Decoder, decode_first};
pub use record::{DEVICE_ID_DIGITS, FIELD_COUNT, RecordFields};

use tracing::{debug, info};

use crate::error::FrameRejection;
use crate::types::Reading;

/// Validates frames into readings.
#[derive(Debug, Clone)]
pub struct RecordParser {
    decoders: Vec<Decoder>,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordParser {
    pub fn new() -> Self {
        Self::with_decoders(Decoder::DEFAULT_ORDER.to_vec())
    }

    /// Use a custom decoder order.
    pub fn with_decoders(decoders: Vec<Decoder>) -> Self {
        Self { decoders }
    }

    pub fn decoders(&self) -> &[Decoder] {
        &self.decoders
    }

    /// Validate a frame and return the typed reason when it is rejected.
    pub fn inspect(&self, frame: &[u8]) -> Result<Reading, FrameRejection> {
        self.examine(frame).1
    }

    /// Decode once, returning the text (if any decoder produced one) with the outcome.
    fn examine(&self, frame: &[u8]) -> (Option<String>, Result<Reading, FrameRejection>) {
        let Some((text, _)) = decode_first(&self.decoders, frame) else {
            return (None, Err(FrameRejection::Undecodable));
        };
        let cleaned = text.replace('\0', "");
        let outcome = RecordFields::split(&cleaned).and_then(|fields| fields.into_reading(&text));
        (Some(text), outcome)
    }

    /// Validate a frame, logging the decoded text, raw hex and outcome.
    pub fn parse(&self, frame: &[u8]) -> Option<Reading> {
        let (text, outcome) = self.examine(frame);
        match outcome {
            Ok(reading) => {
                info!(
                    systolic = reading.systolic(),
                    diastolic = reading.diastolic(),
                    pulse = reading.pulse(),
                    text = reading.raw_text(),
                    hex = %hex::encode(frame),
                    "Parsed reading"
                );
                Some(reading)
            }
            Err(rejection) => {
                debug!(
                    kind = ?rejection.kind(),
                    text = text.as_deref().unwrap_or(""),
                    hex = %hex::encode(frame),
                    "Frame rejected: {}",
                    rejection
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RejectionKind;
    use chrono::NaiveDate;

    const SAMPLE: &[u8] = b"2024,01,15,09,30,00000000000000000001,0,120,080,070,0";

    #[test]
    fn parses_device_record() {
        let reading = RecordParser::new().inspect(SAMPLE).unwrap();

        assert_eq!(reading.systolic(), 120);
        assert_eq!(reading.diastolic(), 80);
        assert_eq!(reading.pulse(), 70);
        assert_eq!(
            reading.timestamp(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(9, 30, 0).unwrap()
        );
        assert_eq!(reading.raw_text(), std::str::from_utf8(SAMPLE).unwrap());
    }

    #[test]
    fn rejects_systolic_not_above_diastolic() {
        let frame = b"2024,01,15,09,30,00000000000000000001,0,080,120,070,0";
        assert_eq!(
            RecordParser::new().inspect(frame).unwrap_err(),
            FrameRejection::Ordering { systolic: 80, diastolic: 120 }
        );
        assert!(RecordParser::new().parse(frame).is_none());
    }

    #[test]
    fn rejects_short_records() {
        let frame = b"2024,01,15,09,30,00000000000000000001,0,120,080,070";
        let rejection = RecordParser::new().inspect(frame).unwrap_err();
        assert_eq!(rejection, FrameRejection::FieldCount { found: 10 });
        assert_eq!(rejection.kind(), RejectionKind::FormatMismatch);
    }

    #[test]
    fn truncates_long_records() {
        let frame = b"2024,01,15,09,30,00000000000000000001,0,120,080,070,0,999,abc";
        let reading = RecordParser::new().inspect(frame).unwrap();
        assert_eq!(reading.pulse(), 70);
    }

    #[test]
    fn range_checks() {
        let parser = RecordParser::new();
        let low_pulse = b"2024,01,15,09,30,00000000000000000001,0,120,080,029,0";
        assert!(matches!(
            parser.inspect(low_pulse),
            Err(FrameRejection::OutOfRange { field: "pulse", value: 29, .. })
        ));

        let high_systolic = b"2024,01,15,09,30,00000000000000000001,0,301,080,070,0";
        assert!(matches!(
            parser.inspect(high_systolic),
            Err(FrameRejection::OutOfRange { field: "systolic", value: 301, .. })
        ));
    }

    #[test]
    fn tolerates_padding_and_nul_bytes() {
        let frame = b"\0 2024, 01 ,15,09,30,00000000000000000001,0,120,080,070,0 \0";
        let reading = RecordParser::new().inspect(frame).unwrap();
        assert_eq!(reading.systolic(), 120);
    }

    #[test]
    fn high_bytes_are_ignored_by_ascii_decoder() {
        let mut frame = vec![0xFF, 0xFE];
        frame.extend_from_slice(SAMPLE);
        let reading = RecordParser::new().inspect(&frame).unwrap();
        assert_eq!(reading.diastolic(), 80);
    }

    #[test]
    fn undecodable_frames_are_decode_failures() {
        let parser = RecordParser::with_decoders(vec![Decoder::Ascii]);
        let rejection = parser.inspect(&[0x80, 0x81, 0x82]).unwrap_err();
        assert_eq!(rejection, FrameRejection::Undecodable);
        assert_eq!(rejection.kind(), RejectionKind::DecodeFailure);
    }

    #[test]
    fn forced_noise_is_rejected_quietly() {
        let noise = vec![b'x'; 300];
        assert!(RecordParser::new().parse(&noise).is_none());
    }

    #[test]
    fn rejection_keeps_decoded_text() {
        let parser = RecordParser::new();
        let (text, outcome) = parser.examine(b"hello,world");
        assert_eq!(text.as_deref(), Some("hello,world"));
        assert_eq!(outcome, Err(FrameRejection::FieldCount { found: 2 }));

        let (text, outcome) = RecordParser::with_decoders(vec![Decoder::Ascii]).examine(&[0x80]);
        assert_eq!(text, None);
        assert_eq!(outcome, Err(FrameRejection::Undecodable));
    }
}
