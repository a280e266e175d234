//! The long-running event loop.
//!
//! Consumes one watch stream at a time and applies every event through the
//! reconciler. When a stream terminates, for any reason, the loop waits out
//! a fixed delay and requests a brand-new stream; no event history is
//! replayed, and the optional periodic full sync covers the gap. Both the
//! stream wait and the backoff are interruptible through the shutdown
//! channel.

use std::time::Duration;

use futures::StreamExt;
use slurmsync_observe::{WorkloadEvent, WorkloadObserver};
use slurmsync_registry::NodeControl;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::reconcile::Reconciler;

/// Phase of the watch loop's connection state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Requesting a fresh event stream.
    Connecting,
    /// Consuming events from an open stream.
    Streaming,
    /// Waiting out the delay after a terminated stream.
    Backoff,
}

/// How a streaming session ended.
enum SessionEnd {
    /// Shutdown was requested; the loop must stop.
    Shutdown,
    /// The stream terminated; the loop backs off and reconnects.
    StreamClosed,
}

/// Long-running incremental reconciliation driven by the watch stream.
pub struct EventLoop<C, O> {
    reconciler: Reconciler<C>,
    observer: O,
    reconnect_delay: Duration,
    resync_interval: Option<Duration>,
    shutdown: watch::Receiver<bool>,
    state: StreamState,
}

impl<C: NodeControl, O: WorkloadObserver> EventLoop<C, O> {
    /// Create an event loop.
    ///
    /// `resync_interval` re-runs the full sync between stream sessions on
    /// that cadence; `None` disables periodic resync.
    pub fn new(
        reconciler: Reconciler<C>,
        observer: O,
        reconnect_delay: Duration,
        resync_interval: Option<Duration>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            reconciler,
            observer,
            reconnect_delay,
            resync_interval,
            shutdown,
            state: StreamState::Connecting,
        }
    }

    /// Current state machine phase.
    #[must_use]
    pub const fn state(&self) -> StreamState {
        self.state
    }

    /// Run until shutdown is requested.
    ///
    /// Assumes the initial full sync already ran; per-event failures are
    /// contained and never abort the loop.
    pub async fn run(&mut self) -> Result<(), SyncError> {
        let mut last_sync = Instant::now();

        loop {
            if self.shutdown_requested() {
                break;
            }

            if let Some(interval) = self.resync_interval {
                if last_sync.elapsed() >= interval {
                    if let Err(e) = self.reconciler.full_sync(&self.observer).await {
                        warn!(error = %e, "periodic resync failed");
                    }
                    last_sync = Instant::now();
                }
            }

            match self.run_session().await {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::StreamClosed) => {
                    warn!("watch stream ended");
                }
                Err(e) => {
                    warn!(error = %e, "failed to open watch stream");
                }
            }

            self.state = StreamState::Backoff;
            info!(
                delay_secs = self.reconnect_delay.as_secs(),
                "reconnecting after delay"
            );
            tokio::select! {
                () = sleep(self.reconnect_delay) => {}
                _ = self.shutdown.changed() => break,
            }
        }

        info!("event loop stopped");
        Ok(())
    }

    /// One stream session: connect, then consume events until the stream
    /// terminates or shutdown is requested.
    async fn run_session(&mut self) -> Result<SessionEnd, SyncError> {
        self.state = StreamState::Connecting;
        debug!("opening watch stream");
        let mut events = self.observer.watch().await?;

        self.state = StreamState::Streaming;
        info!("watching for workload events");

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => return Ok(SessionEnd::Shutdown),
                next = events.next() => match next {
                    Some(event) => {
                        log_event(&event);
                        if let Err(e) = self.reconciler.apply_event(&event).await {
                            warn!(
                                workload = %event.workload.name,
                                error = %e,
                                "event reconciliation failed"
                            );
                        }
                    }
                    None => return Ok(SessionEnd::StreamClosed),
                },
            }
        }
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }
}

fn log_event(event: &WorkloadEvent) {
    info!(
        kind = ?event.kind,
        workload = %event.workload.name,
        phase = %event.workload.phase,
        "workload event"
    );

    for condition in &event.workload.conditions {
        debug!(
            workload = %event.workload.name,
            condition = %condition.name,
            status = condition.status,
            message = condition.message.as_deref().unwrap_or("no message"),
            "workload condition"
        );
    }
}
