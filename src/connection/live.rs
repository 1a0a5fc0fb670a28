//! Live serial source

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, error, info, warn};

use super::{STOP_TIMEOUT, Source};
use crate::driver::{Driver, DriverHandle};
use crate::events::EventSender;
use crate::providers::LiveProvider;
use crate::serial::{ByteChannel, ConnectFailure, open_port};
use crate::types::{BaudRate, ConnectionState};
use crate::{MonitorError, Result};

/// Live connection to a blood-pressure monitor on a serial port
///
/// `connect` opens the endpoint and spawns the read loop; `disconnect` stops
/// it. A failed open or a mid-session read error is reported as a status
/// event and leaves the source in [`ConnectionState::Error`]. Nothing is
/// retried automatically.
pub struct LiveSource {
    events: EventSender,
    state: Arc<watch::Sender<ConnectionState>>,
    worker: Option<DriverHandle>,
    endpoint: Option<String>,
}

impl LiveSource {
    pub fn new(events: EventSender) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self { events, state: Arc::new(state), worker: None, endpoint: None }
    }

    /// Open `endpoint` at `baud` (8-N-1) and start reading.
    ///
    /// Any running session is disconnected first.
    pub async fn connect(
        &mut self,
        endpoint: &str,
        baud: BaudRate,
        io_timeout: Duration,
    ) -> Result<()> {
        self.disconnect().await;

        info!(endpoint, baud = baud.as_u32(), "Connecting to serial port");
        self.state.send_replace(ConnectionState::Connecting);

        let name = endpoint.to_string();
        let opened = match tokio::task::spawn_blocking(move || open_port(&name, baud, io_timeout))
            .await
        {
            Ok(result) => result,
            Err(e) => Err(MonitorError::connection_failed(
                endpoint,
                ConnectFailure::Generic,
                e.to_string(),
            )),
        };

        match opened {
            Ok(port) => {
                self.attach(endpoint, port);
                Ok(())
            }
            Err(e) => {
                error!(endpoint, "Connection failed: {}", e);
                let message = e.status_message();
                self.events.status(message.clone());
                self.state.send_replace(ConnectionState::Error(message));
                Err(e)
            }
        }
    }

    /// Start reading from an already opened channel.
    ///
    /// Any running session is disconnected first.
    pub async fn connect_channel<C: ByteChannel>(&mut self, endpoint: &str, channel: C) {
        self.disconnect().await;
        self.attach(endpoint, channel);
    }

    fn attach<C: ByteChannel>(&mut self, endpoint: &str, channel: C) {
        info!(endpoint, "Connected");
        self.state.send_replace(ConnectionState::Connected);
        self.events.status(format!("Connected to {endpoint}"));

        let provider = LiveProvider::new(endpoint, channel);
        self.worker = Some(Driver::spawn(provider, self.events.clone(), Arc::clone(&self.state)));
        self.endpoint = Some(endpoint.to_string());
    }

    /// Stop the read loop and close the port. Repeated calls are no-ops.
    pub async fn disconnect(&mut self) {
        let Some(worker) = self.worker.take() else {
            debug!("Disconnect requested with no active session");
            return;
        };
        let endpoint = self.endpoint.take().unwrap_or_default();

        if !worker.stop(STOP_TIMEOUT).await {
            warn!(endpoint = %endpoint, "Read loop still running after stop timeout");
        }

        self.state.send_replace(ConnectionState::Disconnected);
        info!(endpoint = %endpoint, "Disconnected");
        self.events.status("Disconnected");
    }

    /// Endpoint of the current session, if any
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }
}

#[async_trait::async_trait]
impl Source for LiveSource {
    fn is_active(&self) -> bool {
        self.worker.as_ref().is_some_and(|worker| !worker.is_finished())
    }

    fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    fn state_updates(&self) -> WatchStream<ConnectionState> {
        WatchStream::new(self.state.subscribe())
    }

    async fn shutdown(&mut self) {
        self.disconnect().await;
    }
}

impl Drop for LiveSource {
    fn drop(&mut self) {
        if let Some(worker) = &self.worker {
            debug!("Dropping live source");
            worker.cancel_token().cancel();
        }
    }
}
