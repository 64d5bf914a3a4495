//! Descriptor source abstraction
//!
//! The hardware description is a tree of named nodes carrying typed
//! properties, in the style of a flattened device tree. Discovery never walks
//! the tree directly; it goes through the [`DescriptorSource`] trait so that
//! any provider (a parsed blob, a file, a test fixture) can drive it.
//!
//! # Main Types
//!
//! - [`DescriptorSource`] - Enumerate nodes, read properties, follow references
//! - [`PropertyValue`] - A raw property value (scalar, cell array or string)
//! - [`DescriptorTree`] - Flat-storage in-memory provider
//! - [`HardwareDescription`] - Serde form of a description file (TOML/JSON)
//!
//! # Typed reads
//!
//! The provided methods on [`DescriptorSource`] implement the typed reads used
//! by the parsers. Booleans are stored as strings and only the exact literal
//! `"true"` reads as `true`.

pub mod file;
pub mod id;
pub mod tree;

pub use file::{HardwareDescription, NodeSpec};
pub use id::NodeId;
pub use tree::{DescriptorNode, DescriptorTree};

use crate::error::{Result, TopologyError};
use serde::{Deserialize, Serialize};

/// Status values that mark a node as available
pub const AVAILABLE_STATUS: &[&str] = &["okay", "ok"];

/// A raw descriptor property value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Single 32-bit cell
    U32(u32),
    /// Array of 32-bit cells
    Cells(Vec<u32>),
    /// String (also used for `&label` and `/path` references)
    Text(String),
}

impl PropertyValue {
    /// Interpret as a single u32 (scalar or one-cell array)
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            PropertyValue::U32(v) => Some(*v),
            PropertyValue::Cells(cells) if cells.len() == 1 => Some(cells[0]),
            _ => None,
        }
    }

    /// Interpret as a cell array
    pub fn as_cells(&self) -> Option<&[u32]> {
        match self {
            PropertyValue::U32(v) => Some(std::slice::from_ref(v)),
            PropertyValue::Cells(cells) => Some(cells),
            PropertyValue::Text(_) => None,
        }
    }

    /// Interpret as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::U32(value)
    }
}

impl From<Vec<u32>> for PropertyValue {
    fn from(value: Vec<u32>) -> Self {
        PropertyValue::Cells(value)
    }
}

impl<const N: usize> From<[u32; N]> for PropertyValue {
    fn from(value: [u32; N]) -> Self {
        PropertyValue::Cells(value.to_vec())
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

/// Combine two 32-bit descriptor cells into one 64-bit value
#[inline]
pub fn cells_to_u64(high: u32, low: u32) -> u64 {
    (u64::from(high) << 32) | u64::from(low)
}

/// Map a string-encoded boolean: exactly `"true"` is true, anything else false
#[inline]
pub fn parse_flag(value: &str) -> bool {
    value == "true"
}

/// Read access to a hardware description
///
/// Node handles are plain [`NodeId`] values owned by the provider; the
/// provider decides how long the underlying nodes live.
pub trait DescriptorSource {
    /// All nodes whose `compatible` matches, in enumeration order
    fn nodes_of_kind(&self, compatible: &str) -> Vec<NodeId>;

    /// Name of a node (empty if the handle is unknown)
    fn node_name(&self, node: NodeId) -> &str;

    /// Whether the node is enabled in the description
    fn is_available(&self, node: NodeId) -> bool;

    /// Look up a raw property
    fn property(&self, node: NodeId, name: &str) -> Option<&PropertyValue>;

    /// Direct child with the given name
    fn child_by_name(&self, node: NodeId, name: &str) -> Option<NodeId>;

    /// Direct children in description order
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Follow a reference property to the node it names
    fn resolve_reference(&self, node: NodeId, name: &str) -> Option<NodeId>;

    /// Read a mandatory u32 property
    fn read_u32(&self, node: NodeId, name: &str) -> Result<u32> {
        self.property(node, name)
            .and_then(PropertyValue::as_u32)
            .ok_or_else(|| TopologyError::missing(name))
    }

    /// Read a mandatory string property
    fn read_str(&self, node: NodeId, name: &str) -> Result<&str> {
        self.property(node, name)
            .and_then(PropertyValue::as_str)
            .ok_or_else(|| TopologyError::missing(name))
    }

    /// Read a mandatory string-encoded boolean
    fn read_flag(&self, node: NodeId, name: &str) -> Result<bool> {
        self.read_str(node, name).map(parse_flag)
    }

    /// Read a cell array of exactly `expected` cells
    fn read_cells(&self, node: NodeId, name: &str, expected: usize) -> Result<&[u32]> {
        self.property(node, name)
            .and_then(PropertyValue::as_cells)
            .filter(|cells| cells.len() == expected)
            .ok_or_else(|| TopologyError::malformed(name, expected))
    }
}
