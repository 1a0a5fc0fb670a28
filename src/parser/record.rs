//! Field layout of one device record.
//!
//! ```text
//! YYYY,MM,DD,HH,MM,<20-digit id>,<code>,<SYS>,<DIA>,<PR>,<motion>
//! ```
//!
//! The device id, code and motion fields are checked for shape only.

use chrono::{Local, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::FrameRejection;
use crate::types::Reading;

/// Number of fields in a record. Extra trailing fields are ignored.
pub const FIELD_COUNT: usize = 11;

/// Length of the device serial number field.
pub const DEVICE_ID_DIGITS: usize = 20;

/// Borrowed view of the eleven fields of a record.
#[derive(Debug, PartialEq, Eq)]
pub struct RecordFields<'a> {
    pub year: &'a str,
    pub month: &'a str,
    pub day: &'a str,
    pub hour: &'a str,
    pub minute: &'a str,
    pub device_id: &'a str,
    pub code: &'a str,
    pub systolic: &'a str,
    pub diastolic: &'a str,
    pub pulse: &'a str,
    pub motion: &'a str,
}

impl<'a> RecordFields<'a> {
    /// Split on commas, trim, drop empty fields and take the first eleven.
    pub fn split(text: &'a str) -> Result<Self, FrameRejection> {
        let parts: Vec<&str> =
            text.split(',').map(|part| part.trim()).filter(|part| !part.is_empty()).collect();

        if parts.len() < FIELD_COUNT {
            return Err(FrameRejection::FieldCount { found: parts.len() });
        }

        Ok(Self {
            year: parts[0],
            month: parts[1],
            day: parts[2],
            hour: parts[3],
            minute: parts[4],
            device_id: parts[5],
            code: parts[6],
            systolic: parts[7],
            diastolic: parts[8],
            pulse: parts[9],
            motion: parts[10],
        })
    }

    /// Validate the fields and build a reading carrying `raw_text`.
    pub fn into_reading(self, raw_text: &str) -> Result<Reading, FrameRejection> {
        digits("year", self.year, 4)?;
        digits("month", self.month, 2)?;
        digits("day", self.day, 2)?;
        digits("hour", self.hour, 2)?;
        digits("minute", self.minute, 2)?;
        digits("device_id", self.device_id, DEVICE_ID_DIGITS)?;

        let systolic = integer("systolic", self.systolic)?;
        let diastolic = integer("diastolic", self.diastolic)?;
        let pulse = integer("pulse", self.pulse)?;

        Reading::new(systolic, diastolic, pulse, self.timestamp(), raw_text)
    }

    /// Device time, or the local wall clock when the fields are not a real date.
    fn timestamp(&self) -> NaiveDateTime {
        match self.device_time() {
            Some(timestamp) => timestamp,
            None => {
                debug!(
                    "Record date {}-{}-{} {}:{} is not a valid calendar time, using wall clock",
                    self.year, self.month, self.day, self.hour, self.minute
                );
                Local::now().naive_local()
            }
        }
    }

    fn device_time(&self) -> Option<NaiveDateTime> {
        let year: i32 = self.year.parse().ok()?;
        if year < 1 {
            return None;
        }
        NaiveDate::from_ymd_opt(year, self.month.parse().ok()?, self.day.parse().ok()?)?
            .and_hms_opt(self.hour.parse().ok()?, self.minute.parse().ok()?, 0)
    }
}

fn digits(field: &'static str, value: &str, width: usize) -> Result<(), FrameRejection> {
    if value.len() == width && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(FrameRejection::Shape { field, value: value.to_string() })
    }
}

/// Parse a pressure/pulse field. Values that do not fit `u16` are reported
/// as out of range rather than non-numeric.
fn integer(field: &'static str, value: &str) -> Result<u16, FrameRejection> {
    let parsed: i64 = value
        .parse()
        .map_err(|_| FrameRejection::NotNumeric { field, value: value.to_string() })?;
    u16::try_from(parsed).map_err(|_| FrameRejection::OutOfRange {
        field,
        value: parsed,
        min: 0,
        max: i64::from(u16::MAX),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "2024,01,15,09,30,00000000000000000001,0,120,080,070,0";

    #[test]
    fn splits_eleven_fields() {
        let fields = RecordFields::split(SAMPLE).unwrap();
        assert_eq!(fields.year, "2024");
        assert_eq!(fields.device_id, "00000000000000000001");
        assert_eq!(fields.systolic, "120");
        assert_eq!(fields.motion, "0");
    }

    #[test]
    fn empty_fields_do_not_count() {
        assert_eq!(
            RecordFields::split("2024,,01, ,15").unwrap_err(),
            FrameRejection::FieldCount { found: 3 }
        );
    }

    #[test]
    fn extra_fields_are_ignored() {
        let text = format!("{SAMPLE},extra,more");
        let fields = RecordFields::split(&text).unwrap();
        assert_eq!(fields.motion, "0");
    }

    #[test]
    fn shape_checks() {
        let short_year = "24,01,15,09,30,00000000000000000001,0,120,080,070,0";
        assert!(matches!(
            RecordFields::split(short_year).unwrap().into_reading(short_year),
            Err(FrameRejection::Shape { field: "year", .. })
        ));

        let short_id = "2024,01,15,09,30,0001,0,120,080,070,0";
        assert!(matches!(
            RecordFields::split(short_id).unwrap().into_reading(short_id),
            Err(FrameRejection::Shape { field: "device_id", .. })
        ));

        let alpha_month = "2024,0a,15,09,30,00000000000000000001,0,120,080,070,0";
        assert!(matches!(
            RecordFields::split(alpha_month).unwrap().into_reading(alpha_month),
            Err(FrameRejection::Shape { field: "month", .. })
        ));
    }

    #[test]
    fn non_numeric_pressure() {
        let text = "2024,01,15,09,30,00000000000000000001,0,12x,080,070,0";
        assert!(matches!(
            RecordFields::split(text).unwrap().into_reading(text),
            Err(FrameRejection::NotNumeric { field: "systolic", .. })
        ));
    }

    #[test]
    fn negative_and_huge_values_are_out_of_range() {
        let text = "2024,01,15,09,30,00000000000000000001,0,120,080,-70,0";
        assert!(matches!(
            RecordFields::split(text).unwrap().into_reading(text),
            Err(FrameRejection::OutOfRange { field: "pulse", value: -70, .. })
        ));

        let text = "2024,01,15,09,30,00000000000000000001,0,99999,080,070,0";
        assert!(matches!(
            RecordFields::split(text).unwrap().into_reading(text),
            Err(FrameRejection::OutOfRange { field: "systolic", .. })
        ));
    }

    #[test]
    fn invalid_calendar_date_falls_back_to_wall_clock() {
        let text = "2024,02,30,25,61,00000000000000000001,0,120,080,070,0";
        let before = Local::now().naive_local();
        let reading = RecordFields::split(text).unwrap().into_reading(text).unwrap();
        let after = Local::now().naive_local();

        assert!(reading.timestamp() >= before && reading.timestamp() <= after);
        assert_eq!(reading.systolic(), 120);
    }

    #[test]
    fn year_zero_is_not_a_calendar_year() {
        let text = "0000,01,15,09,30,00000000000000000001,0,120,080,070,0";
        let reading = RecordFields::split(text).unwrap().into_reading(text).unwrap();
        assert_ne!(reading.timestamp().format("%Y").to_string(), "0000");
    }
}
