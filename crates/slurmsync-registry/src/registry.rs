//! Idempotent registry operations layered over raw node control.

use std::collections::HashMap;

use tracing::info;

use crate::error::RegistryError;
use crate::scontrol::NodeControl;
use crate::types::Node;

/// Node registry with idempotent mutations.
///
/// Every mutating operation re-checks existence immediately before acting,
/// so repeating an operation is a safe no-op and concurrent external changes
/// to the registry are tolerated.
#[derive(Debug)]
pub struct NodeRegistry<C> {
    control: C,
}

impl<C: NodeControl> NodeRegistry<C> {
    /// Wrap a raw control backend.
    pub fn new(control: C) -> Self {
        Self { control }
    }

    /// Full registry snapshot keyed by node name.
    pub async fn list(&self) -> Result<HashMap<String, Node>, RegistryError> {
        self.control.list_nodes().await
    }

    /// Current record for a single node, if registered.
    pub async fn get(&self, name: &str) -> Result<Option<Node>, RegistryError> {
        self.control.show_node(name).await
    }

    /// Register the node unless it already exists.
    ///
    /// Returns whether a create was actually issued. An existing node is
    /// left alone; slurmd completes its own registration.
    pub async fn ensure_present(&self, name: &str) -> Result<bool, RegistryError> {
        if self.control.show_node(name).await?.is_some() {
            info!(node = %name, "node already registered");
            return Ok(false);
        }

        self.control.create_node(name).await?;
        info!(node = %name, "created node");
        Ok(true)
    }

    /// Remove the node unless it is already absent.
    ///
    /// Returns whether a delete was actually issued.
    pub async fn ensure_absent(&self, name: &str) -> Result<bool, RegistryError> {
        if self.control.show_node(name).await?.is_none() {
            info!(node = %name, "node not in registry, skipping removal");
            return Ok(false);
        }

        self.control.delete_node(name).await?;
        info!(node = %name, "removed node");
        Ok(true)
    }
}
