//! Consumer-facing device nodes.
//!
//! Registration asks a [`NodeProvider`] for a node through which consumers
//! open the source. [`NodeRegistry`] is an in-memory provider that hands out
//! `input/eventN` names with increasing minor numbers.

use crate::error::{Error, Result};
use crate::sync::lock;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// A created device node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceNode {
    pub minor: u32,
    /// Path relative to the device root, e.g. `input/event0`.
    pub path: String,
}

/// Creates and destroys device nodes for sources.
pub trait NodeProvider: Send + Sync {
    /// Create a node for the source named `name`.
    fn create(&self, name: &str) -> Result<DeviceNode>;

    /// Remove a node created by [`NodeProvider::create`].
    fn destroy(&self, node: &DeviceNode);
}

/// In-memory node provider.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    next_minor: AtomicU32,
    nodes: Mutex<BTreeMap<u32, (DeviceNode, String)>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live nodes with the name of the source each belongs to, by minor.
    pub fn nodes(&self) -> Vec<(DeviceNode, String)> {
        lock(&self.nodes).values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.nodes).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.nodes).is_empty()
    }

    /// Look up a live node by path.
    pub fn find(&self, path: &str) -> Option<DeviceNode> {
        lock(&self.nodes)
            .values()
            .find(|(node, _)| node.path == path)
            .map(|(node, _)| node.clone())
    }
}

impl NodeProvider for NodeRegistry {
    fn create(&self, name: &str) -> Result<DeviceNode> {
        let minor = self
            .next_minor
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |m| m.checked_add(1))
            .map_err(|_| Error::NodeCreate("minor numbers exhausted".into()))?;
        let node = DeviceNode {
            minor,
            path: format!("input/event{}", minor),
        };
        lock(&self.nodes).insert(minor, (node.clone(), name.to_string()));
        Ok(node)
    }

    fn destroy(&self, node: &DeviceNode) {
        if lock(&self.nodes).remove(&node.minor).is_none() {
            log::warn!("attempted to destroy unknown device node /dev/{}", node.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_numbers_increase() {
        let registry = NodeRegistry::new();
        let a = registry.create("keyboard").unwrap();
        let b = registry.create("mouse").unwrap();

        assert_eq!(a.path, "input/event0");
        assert_eq!(b.path, "input/event1");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.nodes()[1].1, "mouse");
    }

    #[test]
    fn test_destroy_removes_node() {
        let registry = NodeRegistry::new();
        let node = registry.create("keyboard").unwrap();
        assert_eq!(registry.find("input/event0"), Some(node.clone()));

        registry.destroy(&node);
        assert!(registry.is_empty());
        assert_eq!(registry.find("input/event0"), None);

        // Minor numbers are not reused.
        assert_eq!(registry.create("keyboard").unwrap().minor, 1);
    }

    #[test]
    fn test_minor_exhaustion_is_sticky() {
        let registry = NodeRegistry {
            next_minor: AtomicU32::new(u32::MAX - 1),
            ..Default::default()
        };
        assert_eq!(registry.create("last").unwrap().minor, u32::MAX - 1);
        assert!(matches!(registry.create("one more"), Err(Error::NodeCreate(_))));
        assert!(matches!(registry.create("again"), Err(Error::NodeCreate(_))));
        assert_eq!(registry.len(), 1);
    }
}
