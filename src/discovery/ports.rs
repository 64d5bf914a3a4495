//! Port resolution.
//!
//! A component's links live under one container child per direction
//! (`input_port` / `output_port`). Each available child carries an
//! `endpoint` reference to the peer component's node, and the peer's
//! register base is read straight from that node's `reg`.

use super::REG_CELLS;
use crate::descriptor::{cells_to_u64, DescriptorSource, NodeId};
use crate::error::{Result, TopologyError};
use crate::topology::{ComponentKind, Port, PortDirection};

/// Resolve every available port of one direction on `node`.
pub fn resolve_ports(
    source: &dyn DescriptorSource,
    node: NodeId,
    direction: PortDirection,
    peer_kind_hint: ComponentKind,
) -> Result<Vec<Port>> {
    let group = direction.group();
    let container = source
        .child_by_name(node, group)
        .ok_or_else(|| TopologyError::MissingContainer(group.to_string()))?;

    let mut ports = Vec::new();
    for child in source.children(container) {
        if !source.is_available(child) {
            continue;
        }

        let peer = source.resolve_reference(child, "endpoint").ok_or_else(|| {
            TopologyError::UnresolvableEndpoint {
                port: format!("{}/{}", group, source.node_name(child)),
            }
        })?;
        let reg = source.read_cells(peer, "reg", REG_CELLS)?;

        let port = Port {
            direction,
            index: ports.len() as u32,
            peer_kind_hint,
            peer_base_addr: cells_to_u64(reg[0], reg[1]),
            peer_name: source.node_name(peer).to_string(),
        };
        tracing::debug!(
            "{} {} type={} base_addr=0x{:x}",
            source.node_name(node),
            port,
            peer_kind_hint,
            port.peer_base_addr
        );
        ports.push(port);
    }

    Ok(ports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorTree;
    use crate::discovery::fixtures::*;
    use proptest::prelude::*;

    fn funnel_with_inputs(count: usize) -> (DescriptorTree, NodeId, Vec<NodeId>) {
        let mut tree = DescriptorTree::new();
        let encoders: Vec<NodeId> = (0..count)
            .map(|i| {
                let base = 0x1000 + 0x100 * i as u64;
                add_encoder(&mut tree, &format!("encoder@{base:x}"), base, i as u32)
            })
            .collect();
        let funnel = add_funnel(&mut tree, "funnel@2000", 0x2000, &encoders, &[]);
        (tree, funnel, encoders)
    }

    fn input_children(tree: &DescriptorTree, funnel: NodeId) -> Vec<NodeId> {
        let container = tree.child_by_name(funnel, "input_port").unwrap();
        tree.children(container)
    }

    #[test]
    fn test_resolves_peer_address_and_name() {
        let (tree, funnel, _) = funnel_with_inputs(2);
        let ports =
            resolve_ports(&tree, funnel, PortDirection::Input, ComponentKind::Encoder).unwrap();

        assert_eq!(ports.len(), 2);
        assert_eq!(ports[1].index, 1);
        assert_eq!(ports[1].peer_base_addr, 0x1100);
        assert_eq!(ports[1].peer_name, "encoder@1100");
        assert_eq!(ports[0].peer_kind_hint, ComponentKind::Encoder);
        assert_eq!(ports[0].direction, PortDirection::Input);
    }

    #[test]
    fn test_empty_container_yields_no_ports() {
        let (tree, funnel, _) = funnel_with_inputs(0);
        let ports =
            resolve_ports(&tree, funnel, PortDirection::Output, ComponentKind::Sink).unwrap();
        assert!(ports.is_empty());
    }

    #[test]
    fn test_missing_container() {
        let mut tree = DescriptorTree::new();
        let encoder = add_encoder(&mut tree, "encoder@1000", 0x1000, 0);
        let err = resolve_ports(&tree, encoder, PortDirection::Output, ComponentKind::Funnel)
            .unwrap_err();
        assert!(matches!(err, TopologyError::MissingContainer(group) if group == "output_port"));
    }

    #[test]
    fn test_dangling_endpoint() {
        let (mut tree, funnel, _) = funnel_with_inputs(2);
        let second = input_children(&tree, funnel)[1];
        tree.set_property(second, "endpoint", "&nowhere").unwrap();

        let err = resolve_ports(&tree, funnel, PortDirection::Input, ComponentKind::Encoder)
            .unwrap_err();
        assert!(matches!(
            err,
            TopologyError::UnresolvableEndpoint { port } if port == "input_port/port@1"
        ));
    }

    #[test]
    fn test_peer_with_short_reg() {
        let (mut tree, funnel, encoders) = funnel_with_inputs(1);
        tree.set_property(encoders[0], "reg", [0u32, 0x1000]).unwrap();

        let err = resolve_ports(&tree, funnel, PortDirection::Input, ComponentKind::Encoder)
            .unwrap_err();
        assert!(matches!(
            err,
            TopologyError::MalformedArray { name, expected: 4 } if name == "reg"
        ));
    }

    #[test]
    fn test_disabled_port_with_bad_endpoint_is_ignored() {
        let (mut tree, funnel, _) = funnel_with_inputs(2);
        let first = input_children(&tree, funnel)[0];
        tree.set_property(first, "endpoint", "&nowhere").unwrap();
        tree.set_status(first, "disabled").unwrap();

        let ports =
            resolve_ports(&tree, funnel, PortDirection::Input, ComponentKind::Encoder).unwrap();
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].index, 0);
        assert_eq!(ports[0].peer_base_addr, 0x1100);
    }

    proptest! {
        #[test]
        fn test_alternating_availability(k in 0usize..12) {
            let (mut tree, funnel, _) = funnel_with_inputs(2 * k);
            for (i, child) in input_children(&tree, funnel).into_iter().enumerate() {
                if i % 2 == 1 {
                    tree.set_status(child, "disabled").unwrap();
                }
            }

            let ports = resolve_ports(&tree, funnel, PortDirection::Input, ComponentKind::Encoder)
                .unwrap();

            // Property: only even-position peers survive, indexed densely
            prop_assert_eq!(ports.len(), k);
            for (i, port) in ports.iter().enumerate() {
                prop_assert_eq!(port.index as usize, i);
                prop_assert_eq!(port.peer_base_addr, 0x1000 + 0x200 * i as u64);
            }
        }
    }
}
