//! # slurmsync-observe
//!
//! Kubernetes-side observer for slurmsync. Wraps the cluster's pod list and
//! watch primitives behind the [`WorkloadObserver`] trait, translating raw
//! API objects into the typed [`Workload`] model at the boundary: pods
//! without a name are dropped, and missing status, missing conditions, or an
//! unknown phase downgrade to "not ready" rather than failing.
//!
//! Watch streams are deliberately non-restartable: once a stream ends, for
//! any reason, the caller opens a brand-new one and accepts the possible
//! resync gap.

pub mod error;
pub mod observer;
pub mod types;

pub use error::ObserveError;
pub use observer::{PodObserver, WorkloadObserver};
pub use types::{Condition, EventKind, Workload, WorkloadEvent, WorkloadPhase};
