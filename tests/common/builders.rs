//! Test data builders for hardware descriptions

use trace_topology::descriptor::{DescriptorSource, DescriptorTree, NodeId, PropertyValue};
use trace_topology::topology::{ComponentKind, PortDirection};

/// Label a component node is referenced by (`encoder@1000` -> `encoder_1000`)
pub fn label_of(name: &str) -> String {
    name.replace('@', "_")
}

/// Split a 64-bit value into `(high, low)` cells
pub fn cells(value: u64) -> [u32; 2] {
    [(value >> 32) as u32, value as u32]
}

/// Builder for descriptor trees shaped like a trace pipeline
///
/// Components are added as root nodes; `link` wires an output port of one
/// component to an input port of another by label reference.
pub struct DescriptionBuilder {
    tree: DescriptorTree,
}

impl Default for DescriptionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptionBuilder {
    pub fn new() -> Self {
        Self {
            tree: DescriptorTree::new(),
        }
    }

    fn component(&mut self, kind: ComponentKind, name: &str, base: u64) -> NodeId {
        let node = self.tree.add_root(name);
        self.tree.set_label(node, label_of(name)).unwrap();
        self.tree.set_compatible(node, kind.compatible()).unwrap();
        let [hi, lo] = cells(base);
        self.tree.set_property(node, "reg", [hi, lo, 0, 0x100]).unwrap();
        node
    }

    fn node(&self, name: &str) -> NodeId {
        self.tree
            .find_label(&label_of(name))
            .unwrap_or_else(|| panic!("no node named {name}"))
    }

    /// Encoder with every field set; booleans are all `"true"`.
    pub fn encoder(mut self, name: &str, base: u64, cpu: u32) -> Self {
        let node = self.component(ComponentKind::Encoder, name, base);
        let numbers = [
            ("cpu", cpu),
            ("src_id", cpu),
            ("src_bits", 4),
            ("inst_sync_value", 512),
            ("timestamp_prescale", 2),
            ("timestamp_bits", 48),
        ];
        for (key, value) in numbers {
            self.tree.set_property(node, key, value).unwrap();
        }
        let strings = [
            ("trace_type", "btm"),
            ("insn_mode", "full"),
            ("inst_sync_mode", "count"),
            ("timestamp_source", "external"),
        ];
        for (key, value) in strings {
            self.tree.set_property(node, key, value).unwrap();
        }
        for key in [
            "send_context",
            "enable_src",
            "enable_cpu_trigger",
            "enable_timestamp",
            "timestamp_runindebugmode",
        ] {
            self.tree.set_property(node, key, "true").unwrap();
        }
        self.tree.add_child(node, "output_port").unwrap();
        self
    }

    pub fn funnel(mut self, name: &str, base: u64) -> Self {
        let node = self.component(ComponentKind::Funnel, name, base);
        self.tree.add_child(node, "input_port").unwrap();
        self.tree.add_child(node, "output_port").unwrap();
        self
    }

    /// Sink whose `memory-region` covers `size` bytes from `region_start`.
    pub fn sink(mut self, name: &str, base: u64, region_start: u64, region_size: u64) -> Self {
        let region_name = format!("{}-buffer", label_of(name));
        let region = self.tree.add_root(region_name.clone());
        self.tree.set_label(region, region_name.clone()).unwrap();
        let [start_hi, start_lo] = cells(region_start);
        let [size_hi, size_lo] = cells(region_size);
        self.tree
            .set_property(region, "reg", [start_hi, start_lo, size_hi, size_lo])
            .unwrap();

        let node = self.component(ComponentKind::Sink, name, base);
        self.tree.set_property(node, "working_mode", "oneshot").unwrap();
        self.tree.set_property(node, "format", "ntrace").unwrap();
        self.tree
            .set_property(node, "memory-region", format!("&{region_name}"))
            .unwrap();
        self.tree.add_child(node, "input_port").unwrap();
        self
    }

    fn add_port(&mut self, owner: &str, direction: PortDirection, peer: &str) -> NodeId {
        let owner = self.node(owner);
        let container = self
            .tree
            .child_by_name(owner, direction.group())
            .unwrap_or_else(|| panic!("no {} container", direction.group()));
        let slot = self.tree.children(container).len();
        let port = self
            .tree
            .add_child(container, format!("port@{slot}"))
            .unwrap();
        self.tree
            .set_property(port, "endpoint", format!("&{}", label_of(peer)))
            .unwrap();
        port
    }

    /// Output port on `from` and matching input port on `to`.
    pub fn link(mut self, from: &str, to: &str) -> Self {
        self.add_port(from, PortDirection::Output, to);
        self.add_port(to, PortDirection::Input, from);
        self
    }

    /// Input port on `owner` whose child node is disabled.
    pub fn disabled_input(mut self, owner: &str, peer: &str) -> Self {
        let port = self.add_port(owner, PortDirection::Input, peer);
        self.tree.set_status(port, "disabled").unwrap();
        self
    }

    pub fn status(mut self, name: &str, status: &str) -> Self {
        let node = self.node(name);
        self.tree.set_status(node, status).unwrap();
        self
    }

    pub fn property(mut self, name: &str, key: &str, value: impl Into<PropertyValue>) -> Self {
        let node = self.node(name);
        self.tree.set_property(node, key, value).unwrap();
        self
    }

    pub fn build(self) -> DescriptorTree {
        self.tree
    }
}

/// One encoder on cpu 0, one funnel, one sink with a 4 KiB buffer at 0x1000.
pub fn simple_pipeline() -> DescriptionBuilder {
    DescriptionBuilder::new()
        .encoder("encoder@10000", 0x1_0000, 0)
        .funnel("funnel@20000", 0x2_0000)
        .sink("sink@30000", 0x3_0000, 0x1000, 0x1000)
        .link("encoder@10000", "funnel@20000")
        .link("funnel@20000", "sink@30000")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_builder() {
        let tree = simple_pipeline().build();
        let funnel = tree.find_label("funnel_20000").unwrap();
        let inputs = tree.child_by_name(funnel, "input_port").unwrap();
        assert_eq!(tree.children(inputs).len(), 1);
        assert_eq!(
            tree.nodes_of_kind(ComponentKind::Sink.compatible()).len(),
            1
        );
    }
}
