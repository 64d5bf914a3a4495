//! Arena handle for descriptor nodes.

use std::fmt;

/// Position of a node in its [`DescriptorTree`](super::DescriptorTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Parent of a root node; never resolves to a node.
    pub const INVALID: NodeId = NodeId(u32::MAX);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorTree;

    #[test]
    fn test_roots_have_no_parent() {
        let mut tree = DescriptorTree::new();
        let root = tree.add_root("soc");
        assert_eq!(root.index(), 0);
        assert_eq!(tree.node(root).unwrap().parent, NodeId::INVALID);
        assert!(tree.node(NodeId::INVALID).is_none());
        assert_eq!(tree.path(root), "/soc");
    }
}
