//! Descriptor trees shared by the discovery unit tests.

use crate::descriptor::{DescriptorTree, NodeId};
use crate::topology::{ComponentKind, PortDirection};

fn add_component(tree: &mut DescriptorTree, kind: ComponentKind, name: &str, base: u64) -> NodeId {
    let node = tree.add_root(name);
    tree.set_label(node, name.replace('@', "_")).unwrap();
    tree.set_compatible(node, kind.compatible()).unwrap();
    tree.set_property(
        node,
        "reg",
        [(base >> 32) as u32, base as u32, 0, 0x100],
    )
    .unwrap();
    node
}

/// Add a port container whose children point at `peers` by label.
pub fn add_ports(tree: &mut DescriptorTree, node: NodeId, direction: PortDirection, peers: &[NodeId]) {
    let group = tree.add_child(node, direction.group()).unwrap();
    for (i, &peer) in peers.iter().enumerate() {
        let label = tree.node(peer).unwrap().label.clone().unwrap();
        let port = tree.add_child(group, format!("port@{i}")).unwrap();
        tree.set_property(port, "endpoint", format!("&{label}")).unwrap();
    }
}

/// Encoder node with every field populated; no port container yet.
pub fn add_encoder(tree: &mut DescriptorTree, name: &str, base: u64, cpu: u32) -> NodeId {
    let node = add_component(tree, ComponentKind::Encoder, name, base);
    tree.set_property(node, "cpu", cpu).unwrap();
    tree.set_property(node, "trace_type", "instruction").unwrap();
    tree.set_property(node, "insn_mode", "full").unwrap();
    tree.set_property(node, "send_context", "true").unwrap();
    tree.set_property(node, "enable_src", "false").unwrap();
    tree.set_property(node, "src_id", 3u32).unwrap();
    tree.set_property(node, "src_bits", 4u32).unwrap();
    tree.set_property(node, "inst_sync_mode", "period").unwrap();
    tree.set_property(node, "inst_sync_value", 256u32).unwrap();
    tree.set_property(node, "enable_cpu_trigger", "true").unwrap();
    tree.set_property(node, "enable_timestamp", "true").unwrap();
    tree.set_property(node, "timestamp_runindebugmode", "no").unwrap();
    tree.set_property(node, "timestamp_source", "internal").unwrap();
    tree.set_property(node, "timestamp_prescale", 1u32).unwrap();
    tree.set_property(node, "timestamp_bits", 40u32).unwrap();
    node
}

/// Funnel node with input and output containers.
pub fn add_funnel(
    tree: &mut DescriptorTree,
    name: &str,
    base: u64,
    inputs: &[NodeId],
    outputs: &[NodeId],
) -> NodeId {
    let node = add_component(tree, ComponentKind::Funnel, name, base);
    add_ports(tree, node, PortDirection::Input, inputs);
    add_ports(tree, node, PortDirection::Output, outputs);
    node
}

/// Reserved-memory node with the given window.
pub fn add_region(tree: &mut DescriptorTree, name: &str, start: u64, size: u64) -> NodeId {
    let node = tree.add_root(name);
    tree.set_label(node, name.replace('@', "_")).unwrap();
    tree.set_property(
        node,
        "reg",
        [
            (start >> 32) as u32,
            start as u32,
            (size >> 32) as u32,
            size as u32,
        ],
    )
    .unwrap();
    node
}

/// Sink node with selectors and a `memory-region` reference; no port container yet.
pub fn add_sink(tree: &mut DescriptorTree, name: &str, base: u64, region: NodeId) -> NodeId {
    let node = add_component(tree, ComponentKind::Sink, name, base);
    tree.set_property(node, "working_mode", "circular").unwrap();
    tree.set_property(node, "format", "raw").unwrap();
    let label = tree.node(region).unwrap().label.clone().unwrap();
    tree.set_property(node, "memory-region", format!("&{label}"))
        .unwrap();
    node
}

/// encoder@1000 (cpu 0) -> funnel@2000 -> sink@3000, sink buffer 0x1000..=0x1fff.
pub fn pipeline_tree() -> DescriptorTree {
    let mut tree = DescriptorTree::new();
    let encoder = add_encoder(&mut tree, "encoder@1000", 0x1000, 0);
    let region = add_region(&mut tree, "buffer@1000", 0x1000, 0x1000);
    let sink = add_sink(&mut tree, "sink@3000", 0x3000, region);
    let funnel = add_funnel(&mut tree, "funnel@2000", 0x2000, &[encoder], &[sink]);
    add_ports(&mut tree, encoder, PortDirection::Output, &[funnel]);
    add_ports(&mut tree, sink, PortDirection::Input, &[funnel]);
    tree
}
