//! # slurmsyncd
//!
//! The sync controller: keeps the Slurm node registry consistent with the
//! set of ready slurmd pods in a Kubernetes cluster. A one-time full diff at
//! startup brings the registry in line, then a watch-driven event loop keeps
//! it converged, reconnecting with a fixed backoff whenever the stream
//! drops.
//!
//! Convergence, not point-in-time consistency, is the guarantee: every
//! registry mutation is idempotent and re-checks current state immediately
//! before acting, so operations are safe to repeat and tolerate the registry
//! changing underneath.

pub mod config;
pub mod error;
pub mod reconcile;
pub mod watch;

pub use config::Config;
pub use error::SyncError;
pub use reconcile::Reconciler;
pub use watch::{EventLoop, StreamState};
