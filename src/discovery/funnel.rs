//! Funnel parser.

use super::ports::resolve_ports;
use super::{read_register_window, ComponentParser};
use crate::descriptor::{DescriptorSource, NodeId};
use crate::error::Result;
use crate::topology::{Component, ComponentKind, ComponentParams, FunnelParams, PortDirection};

/// Parses `xuantie_ntrace,funnel-controller` nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunnelParser;

impl ComponentParser for FunnelParser {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Funnel
    }

    fn parse(&self, source: &dyn DescriptorSource, node: NodeId) -> Result<Component> {
        let (register_base, register_size) = read_register_window(source, node)?;
        tracing::debug!("base=0x{:x} size=0x{:x}", register_base, register_size);

        let inputs = resolve_ports(source, node, PortDirection::Input, ComponentKind::Encoder)?;
        let outputs = resolve_ports(source, node, PortDirection::Output, ComponentKind::Sink)?;

        Ok(Component {
            name: source.node_name(node).to_string(),
            register_base,
            register_size,
            params: ComponentParams::Funnel(FunnelParams {}),
            inputs,
            outputs,
        })
    }
}
