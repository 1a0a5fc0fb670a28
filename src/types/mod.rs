//! Core types for blood-pressure telemetry.
//!
//! ## Architecture
//!
//! - [`Reading`] is the validated measurement that flows to the sink. It can
//!   only be constructed through [`Reading::new`], which enforces the
//!   physiological ranges and systolic > diastolic.
//! - [`ConnectionState`] is the lifecycle state both sources publish.
//! - [`BaudRate`] is the closed set of line speeds the device supports.
//! - [`BpCategory`] bands a pressure value for presentation.
//!
//! ## Usage Example
//!
//! ```rust
//! use bplink::types::{BpCategory, Reading};
//! use chrono::NaiveDate;
//!
//! let taken = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(9, 30, 0).unwrap();
//! let reading = Reading::new(120, 80, 70, taken, "manual entry").unwrap();
//!
//! assert_eq!(reading.systolic_category(), BpCategory::Elevated);
//! assert!(Reading::new(80, 120, 70, taken, "").is_err());
//! ```

mod baud_rate;
mod category;
mod reading;
mod state;

pub use baud_rate::BaudRate;
pub use category::BpCategory;
pub use reading::{DIASTOLIC_RANGE, PULSE_RANGE, Reading, SYSTOLIC_RANGE};
pub use state::ConnectionState;
