//! Hardware description files
//!
//! A description file is the serde form of a [`DescriptorTree`]: a list of
//! root nodes, each with optional label/compatible/status, a property table
//! and nested children. TOML is the primary format; JSON is accepted for
//! files ending in `.json`.
//!
//! # Example
//!
//! ```toml
//! [[nodes]]
//! name = "encoder@1000"
//! compatible = "xuantie_ntrace,encoder-controller"
//!
//! [nodes.properties]
//! reg = [0, 0x1000, 0, 0x100]
//! cpu = 0
//!
//! [[nodes.children]]
//! name = "output_port"
//!
//! [[nodes.children.children]]
//! name = "port@0"
//! properties = { endpoint = "&funnel0" }
//! ```

use super::tree::DescriptorTree;
use super::{NodeId, PropertyValue};
use crate::error::{Result, TopologyError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Serialized description node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Node name
    pub name: String,

    /// Label for `&label` references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Kind selector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatible: Option<String>,

    /// Availability status (`okay` when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Named properties
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,

    /// Child nodes in order
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    /// Create an empty node spec
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Root of a description file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HardwareDescription {
    /// Top-level nodes
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

impl HardwareDescription {
    /// Parse a TOML description
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| TopologyError::Config(format!("Failed to parse description: {}", e)))
    }

    /// Parse a JSON description
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| TopologyError::Config(format!("Failed to parse description: {}", e)))
    }

    /// Load a description file, picking the format from the extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TopologyError::Config(format!("Failed to read description {:?}: {}", path, e))
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Build the in-memory tree (pre-order, so arena order is document order)
    pub fn into_tree(self) -> Result<DescriptorTree> {
        let mut tree = DescriptorTree::new();
        for spec in self.nodes {
            let id = tree.add_root(spec.name.clone());
            fill_node(&mut tree, id, spec)?;
        }
        Ok(tree)
    }
}

fn fill_node(tree: &mut DescriptorTree, id: NodeId, spec: NodeSpec) -> Result<()> {
    if let Some(label) = spec.label {
        tree.set_label(id, label)?;
    }
    if let Some(compatible) = spec.compatible {
        tree.set_compatible(id, compatible)?;
    }
    if let Some(status) = spec.status {
        tree.set_status(id, status)?;
    }
    for (name, value) in spec.properties {
        tree.set_property(id, name, value)?;
    }
    for child in spec.children {
        let child_id = tree.add_child(id, child.name.clone())?;
        fill_node(tree, child_id, child)?;
    }
    Ok(())
}

impl DescriptorTree {
    /// Load a description file straight into a tree
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        HardwareDescription::load(path)?.into_tree()
    }
}
