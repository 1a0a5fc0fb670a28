//! TOML configuration.
//!
//! Every section carries `#[serde(default)]`, so a file only needs the keys
//! it wants to change:
//!
//! ```toml
//! [serial]
//! port = "/dev/ttyUSB0"
//! baud_rate = 19200
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::connection::simulated::clamp_interval;
use crate::events::DEFAULT_EVENT_CAPACITY;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::serial::DEFAULT_PREFERRED_PORT;
use crate::types::BaudRate;
use crate::{MonitorError, Result};

/// Serial port settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Endpoint to open (empty = pick automatically)
    pub port: String,
    /// Endpoint preferred by automatic selection
    pub preferred_port: String,
    /// Line speed; one of 9600, 19200, 38400, 57600, 115200
    pub baud_rate: u32,
    /// Read timeout in milliseconds
    pub io_timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            preferred_port: DEFAULT_PREFERRED_PORT.into(),
            baud_rate: BaudRate::default().as_u32(),
            io_timeout_ms: 1000,
        }
    }
}

impl SerialConfig {
    pub fn baud(&self) -> Result<BaudRate> {
        BaudRate::try_from(self.baud_rate)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }
}

/// Simulator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seconds between simulated readings (minimum 1)
    pub interval_secs: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { interval_secs: 5.0 }
    }
}

impl SimulationConfig {
    pub fn interval(&self) -> Duration {
        clamp_interval(self.interval_secs)
    }
}

/// Event pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Queue depth between the source worker and the consumer
    pub event_capacity: usize,
    /// Consumer drain period in milliseconds
    pub drain_tick_ms: u64,
    /// Readings kept in memory
    pub history_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            event_capacity: DEFAULT_EVENT_CAPACITY,
            drain_tick_ms: 100,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl PipelineConfig {
    pub fn drain_tick(&self) -> Duration {
        Duration::from_millis(self.drain_tick_ms)
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub serial: SerialConfig,
    pub simulation: SimulationConfig,
    pub pipeline: PipelineConfig,
}

impl MonitorConfig {
    /// Load from a TOML file, falling back to defaults when it is missing or invalid.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match Self::from_toml_str(&content) {
                    Ok(config) => {
                        info!("Configuration loaded from {}", path.display());
                        return config;
                    }
                    Err(e) => warn!("Ignoring {}: {}", path.display(), e),
                },
                Err(e) => warn!("Could not read {}: {}", path.display(), e),
            }
        }

        info!("Using default configuration");
        Self::default()
    }

    /// Parse TOML text, failing on syntax or type errors.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| MonitorError::config(e.to_string()))
    }

    /// Write the configuration as pretty TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| MonitorError::config(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|source| MonitorError::ConfigFile { path: path.to_path_buf(), source })?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// `bp_monitor.toml` next to the executable.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("bp_monitor.toml")
    }

    /// Check values serde cannot, returning one message per problem.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Err(e) = self.serial.baud() {
            errors.push(e.to_string());
        }
        if self.serial.io_timeout_ms == 0 {
            errors.push("Serial read timeout must be greater than 0 ms".into());
        }
        if self.pipeline.event_capacity == 0 {
            errors.push("Event queue capacity must be greater than 0".into());
        }
        if self.pipeline.drain_tick_ms == 0 {
            errors.push("Drain tick must be greater than 0 ms".into());
        }
        if self.pipeline.history_capacity == 0 {
            errors.push("History capacity must be greater than 0".into());
        }

        errors
    }
}
