//! Error types for the ingestion pipeline.
//!
//! Two families live here:
//!
//! - [`MonitorError`] covers everything that can fail at a session boundary:
//!   opening a serial endpoint, mid-session I/O, port enumeration and
//!   configuration. These surface to the caller and, for the live source, as
//!   status events.
//! - [`FrameRejection`] explains why one candidate frame produced no
//!   [`Reading`](crate::Reading). Rejections are diagnostics only; the parser
//!   never lets them escape as failures.
//!
//! ## Recovery
//!
//! ```rust
//! use bplink::{ConnectFailure, MonitorError};
//!
//! let error = MonitorError::connection_failed("COM3", ConnectFailure::Busy, "Access is denied");
//! assert!(error.is_retryable());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T, E = MonitorError> = std::result::Result<T, E>;

/// Why a serial endpoint could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectFailure {
    /// The endpoint exists but another process holds it, or access was denied.
    Busy,
    /// The endpoint does not exist or the device went away.
    NotFound,
    /// Anything else.
    Generic,
}

impl ConnectFailure {
    /// Classify a `serialport` error.
    pub fn classify(error: &serialport::Error) -> Self {
        Self::classify_kind(error.kind(), &error.description)
    }

    /// Classify from the error kind plus the platform's description text.
    ///
    /// Windows reports a held port as "Access is denied" and Linux reports
    /// `EBUSY` as a generic I/O error, so the text is consulted as well.
    pub fn classify_kind(kind: serialport::ErrorKind, description: &str) -> Self {
        use serialport::ErrorKind;
        use std::io::ErrorKind as IoKind;

        let text = description.to_lowercase();
        match kind {
            ErrorKind::NoDevice | ErrorKind::Io(IoKind::NotFound) => ConnectFailure::NotFound,
            ErrorKind::Io(IoKind::PermissionDenied) => ConnectFailure::Busy,
            _ if text.contains("busy") || text.contains("denied") || text.contains("in use") => {
                ConnectFailure::Busy
            }
            _ if text.contains("no such file") || text.contains("not found") => {
                ConnectFailure::NotFound
            }
            _ => ConnectFailure::Generic,
        }
    }

    /// Human-readable status line for the presentation layer.
    pub fn status_message(self, endpoint: &str, detail: &str) -> String {
        match self {
            ConnectFailure::Busy => {
                format!("{endpoint} is in use; close any other program using this port")
            }
            ConnectFailure::NotFound => {
                format!("{endpoint} does not exist; check the device connection")
            }
            ConnectFailure::Generic => format!("Failed to open {endpoint}: {detail}"),
        }
    }
}

/// Main error type for pipeline operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MonitorError {
    #[error("Failed to connect to {endpoint}: {reason}")]
    Connection {
        endpoint: String,
        failure: ConnectFailure,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serial I/O error on {endpoint}")]
    Io {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serial port enumeration failed: {reason}")]
    Enumeration { reason: String },

    #[error("Unsupported baud rate {baud} (expected one of 9600, 19200, 38400, 57600, 115200)")]
    InvalidBaudRate { baud: u32 },

    #[error("Invalid configuration: {details}")]
    Config { details: String },

    #[error("Configuration file error: {path}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Reading rejected: {0}")]
    Rejected(#[from] FrameRejection),

    #[error("Snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MonitorError {
    /// Returns whether retrying the same operation can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            MonitorError::Connection { failure, .. } => *failure != ConnectFailure::Generic,
            MonitorError::Io { .. } => true,
            MonitorError::Enumeration { .. } => true,
            MonitorError::InvalidBaudRate { .. } => false,
            MonitorError::Config { .. } => false,
            MonitorError::ConfigFile { .. } => false,
            MonitorError::Rejected(_) => false,
            MonitorError::Json(_) => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            MonitorError::Connection { failure: ConnectFailure::Busy, .. } => vec![
                "Close any other program using the port",
                "Check that the current user may access the device",
            ],
            MonitorError::Connection { failure: ConnectFailure::NotFound, .. } => vec![
                "Check that the USB cable is connected",
                "Refresh the port list and pick the new endpoint",
                "Install the USB-serial driver if no port appears",
            ],
            MonitorError::Connection { .. } => vec![
                "Check the device connection",
                "Try the simulated source to verify the rest of the pipeline",
            ],
            MonitorError::Io { .. } => vec![
                "Check that the device is still connected",
                "Reconnect explicitly; the live source does not retry",
            ],
            MonitorError::Enumeration { .. } => vec![
                "Check operating system permissions for serial devices",
                "Retry the port scan",
            ],
            MonitorError::InvalidBaudRate { .. } => {
                vec!["Use 9600, 19200, 38400, 57600 or 115200 baud"]
            }
            MonitorError::Config { .. } => vec![
                "Fix the reported configuration values",
                "Delete the configuration file to regenerate defaults",
            ],
            MonitorError::ConfigFile { .. } => vec![
                "Check the file exists and is readable",
                "Check the directory is writable when saving",
            ],
            MonitorError::Rejected(_) => vec![
                "Verify the device emits the 11-field comma-separated record",
                "Check the baud rate matches the device setting",
            ],
            MonitorError::Json(_) => vec!["Check the snapshot document is valid JSON"],
        }
    }

    /// Helper constructor for connection errors without an underlying source.
    pub fn connection_failed(
        endpoint: impl Into<String>,
        failure: ConnectFailure,
        reason: impl Into<String>,
    ) -> Self {
        MonitorError::Connection {
            endpoint: endpoint.into(),
            failure,
            reason: reason.into(),
            source: None,
        }
    }

    /// Helper constructor for a failed open, classifying the `serialport` error.
    pub fn from_open_error(endpoint: impl Into<String>, error: serialport::Error) -> Self {
        let endpoint = endpoint.into();
        let failure = ConnectFailure::classify(&error);
        let reason = failure.status_message(&endpoint, &error.description);
        MonitorError::Connection { endpoint, failure, reason, source: Some(Box::new(error)) }
    }

    /// Helper constructor for mid-session I/O errors.
    pub fn io(endpoint: impl Into<String>, source: std::io::Error) -> Self {
        MonitorError::Io { endpoint: endpoint.into(), source }
    }

    /// Helper constructor for configuration errors.
    pub fn config(details: impl Into<String>) -> Self {
        MonitorError::Config { details: details.into() }
    }

    /// The connect failure class, when this is a connection error.
    pub fn connect_failure(&self) -> Option<ConnectFailure> {
        match self {
            MonitorError::Connection { failure, .. } => Some(*failure),
            _ => None,
        }
    }

    /// One-line message suitable for a status event.
    pub fn status_message(&self) -> String {
        match self {
            MonitorError::Connection { reason, .. } => format!("Connection failed: {reason}"),
            MonitorError::Io { source, .. } => format!("Read error: {source}"),
            other => other.to_string(),
        }
    }
}

/// Coarse class of a rejected frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// No decoder produced usable text.
    DecodeFailure,
    /// Text was decoded but does not match the record format.
    FormatMismatch,
}

/// Why a frame did not produce a reading.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameRejection {
    #[error("no decoder produced text")]
    Undecodable,

    #[error("expected 11 non-empty fields, found {found}")]
    FieldCount { found: usize },

    #[error("field '{field}' has the wrong shape: {value:?}")]
    Shape { field: &'static str, value: String },

    #[error("field '{field}' is not an integer: {value:?}")]
    NotNumeric { field: &'static str, value: String },

    #[error("{field} {value} outside {min}..={max}")]
    OutOfRange { field: &'static str, value: i64, min: i64, max: i64 },

    #[error("systolic {systolic} is not above diastolic {diastolic}")]
    Ordering { systolic: u16, diastolic: u16 },
}

impl FrameRejection {
    /// Classify this rejection.
    pub fn kind(&self) -> RejectionKind {
        match self {
            FrameRejection::Undecodable => RejectionKind::DecodeFailure,
            _ => RejectionKind::FormatMismatch,
        }
    }
}
