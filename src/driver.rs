//! Driver spawns and manages the background worker of a source

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::events::{EventSender, SourceEvent};
use crate::provider::Provider;
use crate::types::ConnectionState;

/// Handle to a running worker
#[derive(Debug)]
pub struct DriverHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl DriverHandle {
    /// Whether the worker task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancellation token observed by the worker
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel the worker and wait up to `timeout` for it to exit
    ///
    /// Returns `false` if the worker was still running at the deadline. It is
    /// left to finish on its own; it emits nothing once cancelled.
    pub async fn stop(self, timeout: Duration) -> bool {
        self.cancel.cancel();
        match tokio::time::timeout(timeout, self.task).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("Worker task ended abnormally: {}", e);
                true
            }
            Err(_) => {
                warn!("Worker did not stop within {:?}", timeout);
                false
            }
        }
    }
}

/// Driver spawns the one worker per active source
///
/// The worker owns the provider, forwards every event batch to the event
/// channel and publishes the terminal state when the provider fails or ends.
pub struct Driver;

impl Driver {
    /// Spawn a worker for the given provider
    pub fn spawn<P>(
        provider: P,
        events: EventSender,
        state: Arc<watch::Sender<ConnectionState>>,
    ) -> DriverHandle
    where
        P: Provider,
    {
        let cancel = CancellationToken::new();
        let cancel_worker = cancel.clone();

        let task = tokio::spawn(async move {
            Self::worker_task(provider, events, state, cancel_worker).await;
        });

        DriverHandle { cancel, task }
    }

    async fn worker_task<P>(
        mut provider: P,
        events: EventSender,
        state: Arc<watch::Sender<ConnectionState>>,
        cancel: CancellationToken,
    ) where
        P: Provider,
    {
        let label = provider.label().to_string();
        info!(source = %label, "Worker started");
        let mut batches = 0u64;

        loop {
            if cancel.is_cancelled() {
                debug!(source = %label, "Worker cancelled");
                break;
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(source = %label, "Worker cancelled while waiting");
                    break;
                }
                result = provider.next_events() => result,
            };

            // A stop requested while the provider was producing wins over delivery.
            if cancel.is_cancelled() {
                break;
            }

            match result {
                Ok(Some(batch)) => {
                    batches += 1;
                    trace!(
                        source = %label,
                        batch = batches,
                        events = batch.len(),
                        "Forwarding events"
                    );

                    if !batch.into_iter().all(|event| events.emit(event)) {
                        debug!(source = %label, "Event receiver dropped, shutting down");
                        state.send_replace(ConnectionState::Disconnected);
                        break;
                    }
                }
                Ok(None) => {
                    info!(source = %label, "Provider ended after {} batches", batches);
                    state.send_replace(ConnectionState::Disconnected);
                    break;
                }
                Err(e) => {
                    error!(source = %label, "Provider error: {}", e);
                    let message = e.status_message();
                    events.emit(SourceEvent::Status(message.clone()));
                    state.send_replace(ConnectionState::Error(message));
                    break;
                }
            }
        }

        info!(source = %label, "Worker ended ({} batches)", batches);
    }
}
