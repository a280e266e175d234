//! Raw scheduler operations over the scontrol command-line tool.

use std::collections::HashMap;

use tokio::process::Command;
use tracing::debug;

use crate::error::RegistryError;
use crate::types::{parse_node_list, Node};

/// Raw node operations against the scheduler registry.
///
/// [`Scontrol`] talks to a real scontrol binary; tests substitute scripted
/// implementations that record invocations.
#[allow(async_fn_in_trait)]
pub trait NodeControl {
    /// Full registry snapshot keyed by node name.
    ///
    /// A failure means the registry state is unknown for this cycle, never
    /// that the registry is empty.
    async fn list_nodes(&self) -> Result<HashMap<String, Node>, RegistryError>;

    /// Look up a single node, distinguishing absence from failure.
    async fn show_node(&self, name: &str) -> Result<Option<Node>, RegistryError>;

    /// Register a new node with the scheduler.
    async fn create_node(&self, name: &str) -> Result<(), RegistryError>;

    /// Remove a node from the scheduler registry.
    async fn delete_node(&self, name: &str) -> Result<(), RegistryError>;
}

/// scontrol-backed implementation of [`NodeControl`].
#[derive(Debug, Clone)]
pub struct Scontrol {
    path: String,
}

impl Scontrol {
    /// Create a client using `scontrol` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client using a specific scontrol binary.
    #[must_use]
    pub fn with_path(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output, RegistryError> {
        let command = format!("{} {}", self.path, args.join(" "));
        debug!(command = %command, "running scontrol");

        Command::new(&self.path)
            .args(args)
            .output()
            .await
            .map_err(|source| RegistryError::Spawn { command, source })
    }

    fn command_failed(&self, args: &[&str], output: &std::process::Output) -> RegistryError {
        RegistryError::CommandFailed {
            command: format!("{} {}", self.path, args.join(" ")),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

impl Default for Scontrol {
    fn default() -> Self {
        Self {
            path: "scontrol".to_string(),
        }
    }
}

impl NodeControl for Scontrol {
    async fn list_nodes(&self) -> Result<HashMap<String, Node>, RegistryError> {
        let args = ["show", "nodes", "-o"];
        let output = self.run(&args).await?;

        if !output.status.success() {
            return Err(self.command_failed(&args, &output));
        }

        Ok(parse_node_list(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn show_node(&self, name: &str) -> Result<Option<Node>, RegistryError> {
        let args = ["show", "node", name, "-o"];
        let output = self.run(&args).await?;

        // scontrol reports unknown nodes through a non-zero exit, so the
        // pre-check cannot distinguish a missing node from a failing daemon;
        // a failing daemon surfaces on the mutating call that follows.
        if !output.status.success() {
            return Ok(None);
        }

        let nodes = parse_node_list(&String::from_utf8_lossy(&output.stdout));
        Ok(nodes.into_values().find(|node| node.name == name))
    }

    async fn create_node(&self, name: &str) -> Result<(), RegistryError> {
        let nodename = format!("nodename={name}");
        let args = ["create", nodename.as_str(), "state=CLOUD"];
        let output = self.run(&args).await?;

        if !output.status.success() {
            return Err(self.command_failed(&args, &output));
        }

        Ok(())
    }

    async fn delete_node(&self, name: &str) -> Result<(), RegistryError> {
        let nodename = format!("nodename={name}");
        let args = ["delete", nodename.as_str()];
        let output = self.run(&args).await?;

        if !output.status.success() {
            return Err(self.command_failed(&args, &output));
        }

        Ok(())
    }
}
