//! Simulated source

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use super::{STOP_TIMEOUT, Source};
use crate::driver::{Driver, DriverHandle};
use crate::events::EventSender;
use crate::providers::SimulatedProvider;
use crate::providers::simulated::MIN_INTERVAL;
use crate::types::ConnectionState;

/// Interval used when the requested one is not a finite number.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Convert a user-supplied interval in seconds, clamping it to at least one second.
pub fn clamp_interval(interval_secs: f64) -> Duration {
    if !interval_secs.is_finite() {
        return DEFAULT_INTERVAL;
    }
    Duration::try_from_secs_f64(interval_secs.max(MIN_INTERVAL.as_secs_f64()))
        .unwrap_or(DEFAULT_INTERVAL)
}

/// Generator of synthetic readings with the same event contract as [`LiveSource`]
///
/// [`LiveSource`]: super::LiveSource
pub struct SimulatedSource {
    events: EventSender,
    state: Arc<watch::Sender<ConnectionState>>,
    worker: Option<DriverHandle>,
}

impl SimulatedSource {
    pub fn new(events: EventSender) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self { events, state: Arc::new(state), worker: None }
    }

    /// Start generating one reading every `interval_secs` seconds.
    ///
    /// Does nothing when already running. Must be called within a Tokio runtime.
    pub fn start(&mut self, interval_secs: f64) {
        if self.is_active() {
            debug!("Simulation already running");
            return;
        }
        self.start_with(SimulatedProvider::new(clamp_interval(interval_secs)));
    }

    /// Start with a prepared provider, for example a seeded one.
    ///
    /// Does nothing when already running.
    pub fn start_with<R: Rng + Send + 'static>(&mut self, provider: SimulatedProvider<R>) {
        if self.is_active() {
            debug!("Simulation already running");
            return;
        }

        info!(period = ?provider.period(), "Simulation started");
        self.state.send_replace(ConnectionState::Connected);
        self.events.status("Simulation running");
        self.worker = Some(Driver::spawn(provider, self.events.clone(), Arc::clone(&self.state)));
    }

    /// Stop generating. Repeated calls are no-ops.
    pub async fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            debug!("Stop requested with no running simulation");
            return;
        };

        if !worker.stop(STOP_TIMEOUT).await {
            warn!("Simulator still running after stop timeout");
        }

        self.state.send_replace(ConnectionState::Disconnected);
        info!("Simulation stopped");
        self.events.status("Simulation stopped");
    }
}

#[async_trait::async_trait]
impl Source for SimulatedSource {
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
        self.stop().await;
    }
}

impl Drop for SimulatedSource {
    fn drop(&mut self) {
        if let Some(worker) = &self.worker {
            debug!("Dropping simulated source");
            worker.cancel_token().cancel();
        }
    }
}
