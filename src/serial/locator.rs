//! Serial endpoint discovery

use serde::{Deserialize, Serialize};
use serialport::SerialPortType;
use tracing::debug;

use crate::error::{MonitorError, Result};

/// Endpoint tried first when no port is configured.
pub const DEFAULT_PREFERRED_PORT: &str = "COM3";

/// One enumerated serial endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortInfo {
    /// Platform name used to open the port (`COM3`, `/dev/ttyUSB0`, ...).
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

impl std::fmt::Display for PortInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.name, self.description)
    }
}

/// List the serial endpoints present on this machine.
///
/// On macOS only the `/dev/cu.*` call-out devices are listed; their
/// `/dev/tty.*` twins block on open waiting for carrier detect.
pub fn list_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports()
        .map_err(|e| MonitorError::Enumeration { reason: e.to_string() })?;

    let ports: Vec<PortInfo> = ports
        .into_iter()
        .filter(|_p| {
            #[cfg(target_os = "macos")]
            {
                !_p.port_name.starts_with("/dev/tty.")
            }
            #[cfg(not(target_os = "macos"))]
            {
                true
            }
        })
        .map(|p| PortInfo { description: describe(&p.port_type), name: p.port_name })
        .collect();

    debug!(count = ports.len(), "Enumerated serial ports");
    Ok(ports)
}

/// Pick the preferred endpoint when present, else the first one listed.
pub fn pick_default<'a>(ports: &'a [PortInfo], preferred: &str) -> Option<&'a PortInfo> {
    ports.iter().find(|p| p.name == preferred).or_else(|| ports.first())
}

fn describe(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(info) => match (&info.product, &info.manufacturer) {
            (Some(product), _) => product.clone(),
            (None, Some(manufacturer)) => manufacturer.clone(),
            (None, None) => format!("USB {:04x}:{:04x}", info.vid, info.pid),
        },
        SerialPortType::PciPort => "PCI".to_string(),
        SerialPortType::BluetoothPort => "Bluetooth".to_string(),
        SerialPortType::Unknown => "Native".to_string(),
    }
}
