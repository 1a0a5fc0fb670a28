//! Supported serial line speeds

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// Baud rates the monitor's serial output can be configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BaudRate {
    #[default]
    B9600,
    B19200,
    B38400,
    B57600,
    B115200,
}

impl BaudRate {
    /// All supported rates, slowest first.
    pub const ALL: [BaudRate; 5] =
        [BaudRate::B9600, BaudRate::B19200, BaudRate::B38400, BaudRate::B57600, BaudRate::B115200];

    /// Numeric bits-per-second value.
    pub fn as_u32(self) -> u32 {
        match self {
            BaudRate::B9600 => 9600,
            BaudRate::B19200 => 19200,
            BaudRate::B38400 => 38400,
            BaudRate::B57600 => 57600,
            BaudRate::B115200 => 115200,
        }
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = MonitorError;

    fn try_from(baud: u32) -> Result<Self, Self::Error> {
        BaudRate::ALL
            .into_iter()
            .find(|rate| rate.as_u32() == baud)
            .ok_or(MonitorError::InvalidBaudRate { baud })
    }
}

impl From<BaudRate> for u32 {
    fn from(rate: BaudRate) -> Self {
        rate.as_u32()
    }
}

impl std::fmt::Display for BaudRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_supported_rates() {
        for rate in BaudRate::ALL {
            assert_eq!(BaudRate::try_from(rate.as_u32()).unwrap(), rate);
        }
    }

    #[test]
    fn rejects_unsupported_rates() {
        assert!(matches!(
            BaudRate::try_from(4800),
            Err(MonitorError::InvalidBaudRate { baud: 4800 })
        ));
    }

    #[test]
    fn default_is_9600() {
        assert_eq!(BaudRate::default().as_u32(), 9600);
    }
}
