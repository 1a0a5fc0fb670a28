//! Source connection state

/// Lifecycle state of a source.
///
/// Both sources publish this through a watch channel. Which source is active
/// at a time is decided by the caller; the sources do not coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// The session ended on a failure. Carries the reason shown to the user.
    Error(String),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ConnectionState::Error(_))
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => f.write_str("disconnected"),
            ConnectionState::Connecting => f.write_str("connecting"),
            ConnectionState::Connected => f.write_str("connected"),
            ConnectionState::Error(reason) => write!(f, "error: {reason}"),
        }
    }
}
