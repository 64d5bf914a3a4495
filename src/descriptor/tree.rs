//! Flat-storage descriptor tree.
//!
//! Nodes live in a single `Vec` indexed by [`NodeId`]; parent and child links
//! are ids into the same arena. Arena order is insertion order, which for a
//! loaded description file is document (pre-order) order, so
//! [`DescriptorSource::nodes_of_kind`] enumerates nodes the way a device
//! tree walker would.
//!
//! References are strings: `&label` names a labelled node and `/a/b` is an
//! absolute path from the roots. A scalar value is matched against nodes'
//! `phandle` properties.

use super::id::NodeId;
use super::{DescriptorSource, PropertyValue, AVAILABLE_STATUS};
use crate::error::{Result, TopologyError};
use std::collections::HashMap;

/// A single node in the descriptor tree.
#[derive(Debug, Clone)]
pub struct DescriptorNode {
    pub id: NodeId,
    /// Node name, e.g. `"encoder@1000"`.
    pub name: String,
    /// Optional label used by `&label` references.
    pub label: Option<String>,
    /// Kind selector matched by `nodes_of_kind`.
    pub compatible: Option<String>,
    /// `None`, `"okay"` and `"ok"` mean available.
    pub status: Option<String>,
    /// Properties in insertion order.
    pub properties: Vec<(String, PropertyValue)>,
    /// Parent node (`NodeId::INVALID` for roots).
    pub parent: NodeId,
    /// Direct children in description order.
    pub children: Vec<NodeId>,
}

impl DescriptorNode {
    fn new(id: NodeId, name: String, parent: NodeId) -> Self {
        Self {
            id,
            name,
            label: None,
            compatible: None,
            status: None,
            properties: Vec::new(),
            parent,
            children: Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        match self.status.as_deref() {
            None => true,
            Some(status) => AVAILABLE_STATUS.contains(&status),
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// In-memory hardware description.
#[derive(Debug, Default)]
pub struct DescriptorTree {
    nodes: Vec<DescriptorNode>,
    roots: Vec<NodeId>,
    label_index: HashMap<String, NodeId>,
}

impl DescriptorTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&DescriptorNode> {
        self.nodes.get(id.index())
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut DescriptorNode> {
        self.nodes
            .get_mut(id.index())
            .ok_or_else(|| TopologyError::Config(format!("unknown descriptor node {id}")))
    }

    fn push(&mut self, name: String, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(DescriptorNode::new(id, name, parent));
        id
    }

    /// Add a top-level node.
    pub fn add_root(&mut self, name: impl Into<String>) -> NodeId {
        let id = self.push(name.into(), NodeId::INVALID);
        self.roots.push(id);
        id
    }

    /// Add a child under `parent`.
    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId> {
        // Validate before pushing so a bad parent leaves the arena untouched.
        self.node_mut(parent)?;
        let id = self.push(name.into(), parent);
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Set or replace a property.
    ///
    /// `status` and `compatible` are ordinary properties in a device tree;
    /// string values for them also update the node's availability and kind.
    pub fn set_property(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Result<()> {
        let name = name.into();
        let value = value.into();
        let node = self.node_mut(node)?;
        if let Some(text) = value.as_str() {
            match name.as_str() {
                "status" => node.status = Some(text.to_string()),
                "compatible" => node.compatible = Some(text.to_string()),
                _ => {}
            }
        }
        match node.properties.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => node.properties.push((name, value)),
        }
        Ok(())
    }

    pub fn set_compatible(&mut self, node: NodeId, compatible: impl Into<String>) -> Result<()> {
        self.node_mut(node)?.compatible = Some(compatible.into());
        Ok(())
    }

    pub fn set_status(&mut self, node: NodeId, status: impl Into<String>) -> Result<()> {
        self.node_mut(node)?.status = Some(status.into());
        Ok(())
    }

    /// Attach a label; labels must be unique across the tree.
    pub fn set_label(&mut self, node: NodeId, label: impl Into<String>) -> Result<()> {
        let label = label.into();
        if let Some(&owner) = self.label_index.get(&label) {
            if owner != node {
                return Err(TopologyError::Config(format!(
                    "duplicate label '{}' on {} (already on {})",
                    label,
                    self.path(node),
                    self.path(owner)
                )));
            }
        }
        if let Some(previous) = self.node_mut(node)?.label.replace(label.clone()) {
            self.label_index.remove(&previous);
        }
        self.label_index.insert(label, node);
        Ok(())
    }

    /// Node by label.
    pub fn find_label(&self, label: &str) -> Option<NodeId> {
        self.label_index.get(label).copied()
    }

    /// Node by absolute path, e.g. `/soc/funnel@2000`.
    pub fn find_path(&self, path: &str) -> Option<NodeId> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let first = segments.next()?;
        let mut current = self
            .roots
            .iter()
            .copied()
            .find(|&id| self.nodes[id.index()].name == first)?;
        for segment in segments {
            current = self.child_by_name(current, segment)?;
        }
        Some(current)
    }

    /// Absolute path of a node.
    pub fn path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = id;
        while let Some(node) = self.node(current) {
            segments.push(node.name.as_str());
            current = node.parent;
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    fn find_phandle(&self, phandle: u32) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|node| node.property("phandle").and_then(PropertyValue::as_u32) == Some(phandle))
            .map(|node| node.id)
    }
}

impl DescriptorSource for DescriptorTree {
    fn nodes_of_kind(&self, compatible: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.compatible.as_deref() == Some(compatible))
            .map(|node| node.id)
            .collect()
    }

    fn node_name(&self, node: NodeId) -> &str {
        self.node(node).map(|n| n.name.as_str()).unwrap_or("")
    }

    fn is_available(&self, node: NodeId) -> bool {
        self.node(node).is_some_and(DescriptorNode::is_available)
    }

    fn property(&self, node: NodeId, name: &str) -> Option<&PropertyValue> {
        self.node(node)?.property(name)
    }

    fn child_by_name(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.node(node)?
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child.index()].name == name)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn resolve_reference(&self, node: NodeId, name: &str) -> Option<NodeId> {
        match self.property(node, name)? {
            PropertyValue::Text(reference) => {
                if let Some(label) = reference.strip_prefix('&') {
                    self.find_label(label)
                } else if reference.starts_with('/') {
                    self.find_path(reference)
                } else {
                    None
                }
            }
            value => value.as_u32().and_then(|phandle| self.find_phandle(phandle)),
        }
    }
}
