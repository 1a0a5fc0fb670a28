//! Validated blood-pressure reading

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::BpCategory;
use crate::error::FrameRejection;

/// Accepted systolic range in mmHg.
pub const SYSTOLIC_RANGE: (u16, u16) = (60, 300);
/// Accepted diastolic range in mmHg.
pub const DIASTOLIC_RANGE: (u16, u16) = (30, 200);
/// Accepted pulse range in bpm.
pub const PULSE_RANGE: (u16, u16) = (30, 200);

/// A validated blood-pressure and pulse measurement.
///
/// Fields are private so a `Reading` can only exist in a state that passed
/// [`Reading::new`]: every value inside its physiological range and systolic
/// strictly above diastolic. Deserialization goes through the same checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReadingRepr")]
pub struct Reading {
    systolic: u16,
    diastolic: u16,
    pulse: u16,
    timestamp: NaiveDateTime,
    raw_text: String,
}

impl Reading {
    /// Build a reading, checking ranges and systolic/diastolic ordering.
    pub fn new(
        systolic: u16,
        diastolic: u16,
        pulse: u16,
        timestamp: NaiveDateTime,
        raw_text: impl Into<String>,
    ) -> Result<Self, FrameRejection> {
        check_range("systolic", systolic, SYSTOLIC_RANGE)?;
        check_range("diastolic", diastolic, DIASTOLIC_RANGE)?;
        check_range("pulse", pulse, PULSE_RANGE)?;
        if systolic <= diastolic {
            return Err(FrameRejection::Ordering { systolic, diastolic });
        }

        Ok(Self { systolic, diastolic, pulse, timestamp, raw_text: raw_text.into() })
    }

    /// Systolic pressure in mmHg.
    pub fn systolic(&self) -> u16 {
        self.systolic
    }

    /// Diastolic pressure in mmHg.
    pub fn diastolic(&self) -> u16 {
        self.diastolic
    }

    /// Pulse rate in beats per minute.
    pub fn pulse(&self) -> u16 {
        self.pulse
    }

    /// Measurement time as reported by the device, or reception time when the
    /// device's date fields were not a valid calendar date.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Decoded text the reading was parsed from.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn systolic_category(&self) -> BpCategory {
        BpCategory::for_systolic(self.systolic)
    }

    pub fn diastolic_category(&self) -> BpCategory {
        BpCategory::for_diastolic(self.diastolic)
    }
}

impl std::fmt::Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}  {}/{}  {} bpm",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.systolic,
            self.diastolic,
            self.pulse
        )
    }
}

/// Unchecked wire form of a [`Reading`].
#[derive(Deserialize)]
struct ReadingRepr {
    systolic: u16,
    diastolic: u16,
    pulse: u16,
    timestamp: NaiveDateTime,
    #[serde(default)]
    raw_text: String,
}

impl TryFrom<ReadingRepr> for Reading {
    type Error = FrameRejection;

    fn try_from(repr: ReadingRepr) -> Result<Self, Self::Error> {
        Reading::new(repr.systolic, repr.diastolic, repr.pulse, repr.timestamp, repr.raw_text)
    }
}

fn check_range(
    field: &'static str,
    value: u16,
    (min, max): (u16, u16),
) -> Result<(), FrameRejection> {
    if value < min || value > max {
        return Err(FrameRejection::OutOfRange {
            field,
            value: i64::from(value),
            min: i64::from(min),
            max: i64::from(max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn accepts_bounds() {
        assert!(Reading::new(300, 200, 200, at(0, 0), "").is_ok());
        assert!(Reading::new(60, 30, 30, at(0, 0), "").is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(matches!(
            Reading::new(301, 80, 70, at(9, 30), ""),
            Err(FrameRejection::OutOfRange { field: "systolic", .. })
        ));
        assert!(matches!(
            Reading::new(120, 29, 70, at(9, 30), ""),
            Err(FrameRejection::OutOfRange { field: "diastolic", .. })
        ));
        assert!(matches!(
            Reading::new(120, 80, 201, at(9, 30), ""),
            Err(FrameRejection::OutOfRange { field: "pulse", .. })
        ));
    }

    #[test]
    fn rejects_systolic_not_above_diastolic() {
        assert_eq!(
            Reading::new(100, 100, 70, at(9, 30), ""),
            Err(FrameRejection::Ordering { systolic: 100, diastolic: 100 })
        );
    }

    #[test]
    fn deserialize_validates_values() {
        let reading = Reading::new(120, 80, 70, at(9, 30), "raw").unwrap();
        let json = serde_json::to_string(&reading).unwrap();
        assert_eq!(serde_json::from_str::<Reading>(&json).unwrap(), reading);

        let invalid =
            r#"{"systolic":10,"diastolic":250,"pulse":0,"timestamp":"2024-01-15T09:30:00"}"#;
        let error = serde_json::from_str::<Reading>(invalid).unwrap_err();
        assert!(error.to_string().contains("systolic"), "{error}");

        let inverted =
            r#"{"systolic":80,"diastolic":120,"pulse":70,"timestamp":"2024-01-15T09:30:00"}"#;
        assert!(serde_json::from_str::<Reading>(inverted).is_err());
    }

    #[test]
    fn display_matches_history_line() {
        let reading = Reading::new(120, 80, 70, at(9, 30), "raw").unwrap();
        assert_eq!(reading.to_string(), "2024-01-15 09:30  120/80  70 bpm");
        assert_eq!(reading.raw_text(), "raw");
    }
}
