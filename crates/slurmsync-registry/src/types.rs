//! Node records parsed from scontrol output.
//!
//! `scontrol show nodes -o` prints one line per node of space-separated
//! `Key=Value` tokens. Keys are lowercased on parse so lookups don't depend
//! on Slurm's capitalisation; values are kept verbatim.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Registration state of a Slurm node.
///
/// Slurm reports compound states such as `DOWN+DRAIN` or `IDLE+CLOUD`;
/// classification is by substring so every `DOWN` flavour counts as down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    /// State contains `DOWN` (e.g. `DOWN`, `DOWN+DRAIN`, `DOWN*`).
    Down,
    /// Dynamically registered cloud node (`CLOUD`, `IDLE+CLOUD`, ...).
    Cloud,
    /// Any other reported state (`IDLE`, `ALLOCATED`, `MIXED`, ...).
    Other(String),
    /// The record carried no state key.
    Unknown,
}

impl NodeState {
    /// Classify a raw state string from scontrol output.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let upper = raw.to_uppercase();
        if upper.contains("DOWN") {
            Self::Down
        } else if upper.contains("CLOUD") {
            Self::Cloud
        } else if upper.is_empty() {
            Self::Unknown
        } else {
            Self::Other(raw.to_string())
        }
    }

    /// Whether the node needs re-registration before it can take work.
    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self, Self::Down)
    }
}

/// A node entry in the Slurm registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Node name; matches the workload identity for synced workers.
    pub name: String,
    /// Parsed registration state.
    pub state: NodeState,
    /// Every `key=value` token from the record, keys lowercased.
    pub properties: HashMap<String, String>,
}

/// Parse a single one-line node record.
///
/// Returns `None` for blank lines and for records without a `NodeName` key.
#[must_use]
pub fn parse_node_line(line: &str) -> Option<Node> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut properties = HashMap::new();
    for token in line.split_whitespace() {
        if let Some((key, value)) = token.split_once('=') {
            properties.insert(key.to_lowercase(), value.to_string());
        }
    }

    let name = properties.get("nodename")?.clone();
    let state = properties
        .get("state")
        .map_or(NodeState::Unknown, |raw| NodeState::parse(raw));

    Some(Node {
        name,
        state,
        properties,
    })
}

/// Parse full `scontrol show nodes -o` output into a map keyed by node name.
///
/// Malformed lines are skipped rather than failing the whole snapshot.
#[must_use]
pub fn parse_node_list(output: &str) -> HashMap<String, Node> {
    output
        .lines()
        .filter_map(parse_node_line)
        .map(|node| (node.name.clone(), node))
        .collect()
}
