//! Error types for the sync controller.

use slurmsync_observe::ObserveError;
use slurmsync_registry::RegistryError;
use thiserror::Error;

/// Errors that can occur while reconciling.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A registry operation failed.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// A workload observation failed.
    #[error("observe error: {0}")]
    Observe(#[from] ObserveError),
}
