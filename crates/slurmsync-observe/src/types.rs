//! Typed workload model and lifecycle events.
//!
//! Conversion from raw API pods happens here, at the collaborator boundary.
//! Anything malformed is downgraded rather than propagated: a pod with no
//! name yields no workload at all, and a workload with a missing status,
//! missing conditions, or an unrecognised phase is simply not ready.

use k8s_openapi::api::core::v1::{Pod, PodCondition};
use serde::{Deserialize, Serialize};

/// Lifecycle phase reported by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkloadPhase {
    /// Accepted but not yet scheduled or started.
    Pending,
    /// All containers started.
    Running,
    /// Terminated successfully.
    Succeeded,
    /// Terminated with a failure.
    Failed,
    /// Phase missing or unrecognised.
    Unknown,
}

impl WorkloadPhase {
    /// Parse a phase string, downgrading unknown values to [`Self::Unknown`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for WorkloadPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// A named status condition on a workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Condition name (`Ready`, `PodScheduled`, ...).
    pub name: String,
    /// Whether the condition reported `True`; `False` and `Unknown` both
    /// count as unmet.
    pub status: bool,
    /// Human-readable detail, when the orchestrator provided one.
    pub message: Option<String>,
}

impl Condition {
    fn from_pod_condition(condition: &PodCondition) -> Self {
        Self {
            name: condition.type_.clone(),
            status: condition.status == "True",
            message: condition.message.clone(),
        }
    }
}

/// Observed snapshot of one workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    /// Workload identity, unique within the namespace.
    pub name: String,
    /// Lifecycle phase at snapshot time.
    pub phase: WorkloadPhase,
    /// Status conditions at snapshot time.
    pub conditions: Vec<Condition>,
}

impl Workload {
    /// Convert a raw API pod, dropping pods without a name.
    #[must_use]
    pub fn from_pod(pod: &Pod) -> Option<Self> {
        let name = pod.metadata.name.clone()?;
        let status = pod.status.as_ref();

        let phase = status
            .and_then(|s| s.phase.as_deref())
            .map_or(WorkloadPhase::Unknown, WorkloadPhase::parse);

        let conditions = status
            .and_then(|s| s.conditions.as_ref())
            .map(|conditions| {
                conditions
                    .iter()
                    .map(Condition::from_pod_condition)
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            name,
            phase,
            conditions,
        })
    }

    /// Whether the workload is ready to take work: phase Running and a
    /// `Ready` condition reporting true.
    #[must_use]
    pub fn ready(&self) -> bool {
        self.not_ready_reason().is_none()
    }

    /// Why the workload is not ready, or `None` when it is.
    #[must_use]
    pub fn not_ready_reason(&self) -> Option<String> {
        if self.phase != WorkloadPhase::Running {
            return Some(format!("phase is {}", self.phase));
        }

        if self.conditions.is_empty() {
            return Some("no conditions reported".to_string());
        }

        match self.conditions.iter().find(|c| c.name == "Ready") {
            Some(condition) if condition.status => None,
            Some(condition) => Some(format!(
                "Ready condition is false ({})",
                condition.message.as_deref().unwrap_or("no message")
            )),
            None => Some("no Ready condition found".to_string()),
        }
    }
}

/// Kind of lifecycle change carried by a watch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Workload appeared.
    Added,
    /// Workload changed.
    Modified,
    /// Workload is gone.
    Deleted,
}

/// One entry in the watch stream: the change kind plus the workload
/// snapshot at event time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadEvent {
    /// What happened.
    pub kind: EventKind,
    /// The workload as reported with the event.
    pub workload: Workload,
}
