//! Error types for workload observation.

use thiserror::Error;

/// Errors that can occur while observing workloads.
#[derive(Debug, Error)]
pub enum ObserveError {
    /// A Kubernetes API request failed.
    #[error("kubernetes api error: {0}")]
    Api(#[from] kube::Error),
}
