//! JSON snapshot of the latest reading.
//!
//! Display clients poll a document of this shape:
//!
//! ```json
//! {"sys": 120, "dia": 80, "pulse": 70, "timestamp": "2024-01-15 09:30:00", "status": "connected"}
//! ```
//!
//! Value fields are `null` while no reading is available.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::Reading;
use crate::Result;

/// Timestamp layout used in snapshots.
pub const SNAPSHOT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingSnapshot {
    pub sys: Option<u16>,
    pub dia: Option<u16>,
    pub pulse: Option<u16>,
    pub timestamp: Option<String>,
    pub status: String,
}

impl ReadingSnapshot {
    pub fn from_reading(reading: &Reading, status: impl Into<String>) -> Self {
        Self {
            sys: Some(reading.systolic()),
            dia: Some(reading.diastolic()),
            pulse: Some(reading.pulse()),
            timestamp: Some(reading.timestamp().format(SNAPSHOT_TIME_FORMAT).to_string()),
            status: status.into(),
        }
    }

    /// Snapshot with no values, only a status.
    pub fn offline(status: impl Into<String>) -> Self {
        Self { sys: None, dia: None, pulse: None, timestamp: None, status: status.into() }
    }

    /// Parsed timestamp, if present and well-formed.
    pub fn taken_at(&self) -> Option<NaiveDateTime> {
        let text = self.timestamp.as_deref()?;
        NaiveDateTime::parse_from_str(text, SNAPSHOT_TIME_FORMAT).ok()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn encodes_reading_fields() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(9, 30, 0).unwrap();
        let reading = Reading::new(120, 80, 70, at, "").unwrap();

        let json = ReadingSnapshot::from_reading(&reading, "connected").to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["sys"], 120);
        assert_eq!(value["dia"], 80);
        assert_eq!(value["pulse"], 70);
        assert_eq!(value["timestamp"], "2024-01-15 09:30:00");
        assert_eq!(value["status"], "connected");
    }

    #[test]
    fn offline_snapshot_has_null_values() {
        let json = ReadingSnapshot::offline("waiting").to_json().unwrap();
        assert_eq!(
            json,
            r#"{"sys":null,"dia":null,"pulse":null,"timestamp":null,"status":"waiting"}"#
        );
    }

    #[test]
    fn decodes_client_documents() {
        let document =
            r#"{"sys":135,"dia":88,"pulse":72,"timestamp":"2024-03-01 18:05:00","status":"ok"}"#;
        let snapshot = ReadingSnapshot::from_json(document).unwrap();
        assert_eq!(snapshot.sys, Some(135));
        assert_eq!(
            snapshot.taken_at(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(18, 5, 0)
        );
        assert!(ReadingSnapshot::from_json("not json").is_err());
    }
}
