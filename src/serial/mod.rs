//! Serial port access: discovery, opening and the read seam.

mod channel;
mod locator;

pub use crate::error::ConnectFailure;
pub use channel::{ByteChannel, open_port};
pub use locator::{DEFAULT_PREFERRED_PORT, PortInfo, list_ports, pick_default};
