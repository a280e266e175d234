//! # slurmsync-registry
//!
//! Adapter for the Slurm node registry, wrapping the `scontrol` command-line
//! tool. Provides typed node records parsed from scontrol's one-line
//! key=value output, the raw [`NodeControl`] operations (list, show, create,
//! delete), and the idempotent [`NodeRegistry`] layer that pre-checks
//! existence before every mutation.
//!
//! The registry is owned by Slurm: this crate never caches node state across
//! calls, so every mutating operation acts on what the scheduler reports at
//! that moment.

pub mod error;
pub mod registry;
pub mod scontrol;
pub mod types;

pub use error::RegistryError;
pub use registry::NodeRegistry;
pub use scontrol::{NodeControl, Scontrol};
pub use types::{Node, NodeState};
