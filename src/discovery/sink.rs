//! Memory sink parser.
//!
//! The sink's buffer is a reserved-memory node named by `memory-region`;
//! its `reg` gives base and size and the sink stores the inclusive range.

use super::ports::resolve_ports;
use super::{read_register_window, traced, ComponentParser};
use crate::descriptor::{DescriptorSource, NodeId};
use crate::error::{Result, TopologyError};
use crate::topology::{Component, ComponentKind, ComponentParams, PortDirection, SinkParams};

const MEMORY_REGION: &str = "memory-region";

/// Parses `xuantie_ntrace,sink-controller` nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SinkParser;

/// Resolve `memory-region` to an inclusive `(start, limit)` pair.
fn read_memory_region(source: &dyn DescriptorSource, node: NodeId) -> Result<(u64, u64)> {
    let region = source
        .resolve_reference(node, MEMORY_REGION)
        .ok_or_else(|| TopologyError::missing(MEMORY_REGION))?;
    let (start, size) = read_register_window(source, region)?;
    if size == 0 {
        return Err(TopologyError::missing(MEMORY_REGION));
    }
    let limit = start
        .checked_add(size - 1)
        .ok_or_else(|| TopologyError::missing(MEMORY_REGION))?;
    Ok((start, limit))
}

impl ComponentParser for SinkParser {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Sink
    }

    fn parse(&self, source: &dyn DescriptorSource, node: NodeId) -> Result<Component> {
        let (register_base, register_size) = read_register_window(source, node)?;
        tracing::debug!("base=0x{:x} size=0x{:x}", register_base, register_size);

        let working_mode = traced("working_mode", source.read_str(node, "working_mode"))?;
        let format = traced("format", source.read_str(node, "format"))?;

        let (start_addr, limit_addr) = match read_memory_region(source, node) {
            Ok(range) => range,
            Err(e) => {
                tracing::error!("Failed to read '{}': {}", MEMORY_REGION, e);
                return Err(e);
            }
        };
        tracing::debug!("start_addr=0x{:x} limit_addr=0x{:x}", start_addr, limit_addr);

        let inputs = resolve_ports(source, node, PortDirection::Input, ComponentKind::Funnel)?;

        Ok(Component {
            name: source.node_name(node).to_string(),
            register_base,
            register_size,
            params: ComponentParams::Sink(SinkParams {
                start_addr,
                limit_addr,
                working_mode: working_mode.to_string(),
                format: format.to_string(),
            }),
            inputs,
            outputs: Vec::new(),
        })
    }
}
