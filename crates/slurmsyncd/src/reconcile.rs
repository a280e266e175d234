//! Reconciliation between observed workloads and registered nodes.
//!
//! One convergence rule serves both paths: the startup/periodic full sync
//! walks two snapshots and hands every workload needing attention to
//! [`Reconciler::converge_ready`], and the event loop hands each incremental
//! event to [`Reconciler::apply_event`], which routes ready workloads
//! through the same rule.

use std::collections::HashSet;

use slurmsync_observe::{EventKind, WorkloadEvent, WorkloadObserver};
use slurmsync_registry::{NodeControl, NodeRegistry, RegistryError};
use tracing::{debug, info, warn};

use crate::error::SyncError;

/// Applies the convergence rule to the node registry.
#[derive(Debug)]
pub struct Reconciler<C> {
    registry: NodeRegistry<C>,
}

impl<C: NodeControl> Reconciler<C> {
    /// Create a reconciler over the given registry.
    pub fn new(registry: NodeRegistry<C>) -> Self {
        Self { registry }
    }

    /// One-time snapshot diff between workloads and nodes.
    ///
    /// Ready workloads missing a node, or whose node is down, are converged;
    /// nodes with no corresponding workload are removed. The two snapshots
    /// are taken close together and small drift between them is tolerated:
    /// the event stream corrects it.
    ///
    /// Per-identity failures are logged and contained; the error return
    /// means one of the snapshots itself could not be taken, in which case
    /// the registry state is unknown for this cycle and nothing was changed
    /// on its basis.
    pub async fn full_sync<O: WorkloadObserver>(&self, observer: &O) -> Result<(), SyncError> {
        info!("starting full sync");

        let workloads = observer.list().await?;
        let nodes = self.registry.list().await?;

        for workload in &workloads {
            if let Some(reason) = workload.not_ready_reason() {
                debug!(workload = %workload.name, %reason, "skipping not-ready workload");
                continue;
            }

            let needs_attention = nodes
                .get(&workload.name)
                .is_none_or(|node| node.state.is_down());
            if !needs_attention {
                continue;
            }

            if let Err(e) = self.converge_ready(&workload.name).await {
                warn!(workload = %workload.name, error = %e, "failed to converge workload");
            }
        }

        // Every listed workload counts as live, ready or not; a node for a
        // not-yet-ready workload is left alone.
        let live: HashSet<&str> = workloads.iter().map(|w| w.name.as_str()).collect();
        for name in nodes.keys() {
            if live.contains(name.as_str()) {
                continue;
            }

            if let Err(e) = self.registry.ensure_absent(name).await {
                warn!(node = %name, error = %e, "failed to remove stale node");
            }
        }

        info!("full sync complete");
        Ok(())
    }

    /// Apply one lifecycle event to the registry.
    pub async fn apply_event(&self, event: &WorkloadEvent) -> Result<(), RegistryError> {
        let name = &event.workload.name;

        match event.kind {
            EventKind::Deleted => {
                self.registry.ensure_absent(name).await?;
            }
            EventKind::Added | EventKind::Modified => {
                if let Some(reason) = event.workload.not_ready_reason() {
                    info!(
                        kind = ?event.kind,
                        workload = %name,
                        %reason,
                        "skipping event for not-ready workload"
                    );
                    return Ok(());
                }

                self.converge_ready(name).await?;
            }
        }

        Ok(())
    }

    /// Converge one ready workload onto the registry.
    ///
    /// Absent node: register it. Down node: remove and re-register, forcing
    /// a fresh registration instead of waiting for slurmd to self-heal; if
    /// the removal fails the re-registration is skipped and the next event
    /// or sync retries. Healthy node: nothing to do.
    pub async fn converge_ready(&self, name: &str) -> Result<(), RegistryError> {
        match self.registry.get(name).await? {
            None => {
                self.registry.ensure_present(name).await?;
            }
            Some(node) if node.state.is_down() => {
                info!(node = %name, "node is down, re-registering");
                self.registry.ensure_absent(name).await?;
                self.registry.ensure_present(name).await?;
            }
            Some(_) => {}
        }

        Ok(())
    }
}
