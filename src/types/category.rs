//! Pressure classification bands

use serde::{Deserialize, Serialize};

/// Coarse band a pressure value falls into.
///
/// Presentation layers map these to colours; the pipeline itself never acts
/// on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BpCategory {
    Low,
    Normal,
    Elevated,
    High,
}

impl BpCategory {
    /// Band for a systolic value (mmHg).
    pub fn for_systolic(value: u16) -> Self {
        match value {
            0..=89 => BpCategory::Low,
            90..=119 => BpCategory::Normal,
            120..=139 => BpCategory::Elevated,
            _ => BpCategory::High,
        }
    }

    /// Band for a diastolic value (mmHg).
    pub fn for_diastolic(value: u16) -> Self {
        match value {
            0..=59 => BpCategory::Low,
            60..=79 => BpCategory::Normal,
            80..=89 => BpCategory::Elevated,
            _ => BpCategory::High,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BpCategory::Low => "low",
            BpCategory::Normal => "normal",
            BpCategory::Elevated => "elevated",
            BpCategory::High => "high",
        }
    }
}
