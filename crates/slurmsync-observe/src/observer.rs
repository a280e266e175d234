//! Workload observation over the cluster API.

use futures::stream::BoxStream;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams, WatchEvent, WatchParams};
use kube::Client;
use tracing::{debug, warn};

use crate::error::ObserveError;
use crate::types::{EventKind, Workload, WorkloadEvent};

/// Source of workload snapshots and lifecycle events.
///
/// A watch stream is infinite until the underlying connection ends, cleanly
/// or with an error, and is not restartable: both terminations look the same
/// to the consumer (the stream yields `None`), and the only recovery is to
/// request a brand-new stream.
#[allow(async_fn_in_trait)]
pub trait WorkloadObserver {
    /// One-shot snapshot of all matching workloads.
    async fn list(&self) -> Result<Vec<Workload>, ObserveError>;

    /// Open a fresh stream of lifecycle events.
    async fn watch(&self) -> Result<BoxStream<'static, WorkloadEvent>, ObserveError>;
}

/// Kubernetes-backed observer for slurmd pods.
#[derive(Clone)]
pub struct PodObserver {
    api: Api<Pod>,
    selector: String,
}

impl PodObserver {
    /// Build an observer from an existing client.
    #[must_use]
    pub fn new(client: Client, namespace: &str, selector: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
            selector: selector.to_string(),
        }
    }

    /// Build an observer with an inferred client: in-cluster service-account
    /// configuration when available, the local kubeconfig otherwise.
    pub async fn connect(namespace: &str, selector: &str) -> Result<Self, ObserveError> {
        let client = Client::try_default().await?;
        Ok(Self::new(client, namespace, selector))
    }
}

impl WorkloadObserver for PodObserver {
    async fn list(&self) -> Result<Vec<Workload>, ObserveError> {
        let params = ListParams::default().labels(&self.selector);
        let pods = self.api.list(&params).await?;

        Ok(pods.items.iter().filter_map(Workload::from_pod).collect())
    }

    async fn watch(&self) -> Result<BoxStream<'static, WorkloadEvent>, ObserveError> {
        let params = WatchParams::default().labels(&self.selector);
        let raw = self.api.watch(&params, "0").await?;

        let events = futures::stream::unfold(Box::pin(raw), |mut raw| async move {
            loop {
                match raw.next().await {
                    Some(Ok(WatchEvent::Added(pod))) => {
                        if let Some(event) = convert(EventKind::Added, &pod) {
                            return Some((event, raw));
                        }
                    }
                    Some(Ok(WatchEvent::Modified(pod))) => {
                        if let Some(event) = convert(EventKind::Modified, &pod) {
                            return Some((event, raw));
                        }
                    }
                    Some(Ok(WatchEvent::Deleted(pod))) => {
                        if let Some(event) = convert(EventKind::Deleted, &pod) {
                            return Some((event, raw));
                        }
                    }
                    Some(Ok(WatchEvent::Bookmark(_))) => {
                        debug!("ignoring watch bookmark");
                    }
                    Some(Ok(WatchEvent::Error(response))) => {
                        warn!(
                            code = response.code,
                            message = %response.message,
                            "watch stream reported an error, ending stream"
                        );
                        return None;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "watch transport failed, ending stream");
                        return None;
                    }
                    None => return None,
                }
            }
        });

        Ok(events.boxed())
    }
}

fn convert(kind: EventKind, pod: &Pod) -> Option<WorkloadEvent> {
    let workload = Workload::from_pod(pod);
    if workload.is_none() {
        warn!(kind = ?kind, "dropping event for pod without a name");
    }
    workload.map(|workload| WorkloadEvent { kind, workload })
}
