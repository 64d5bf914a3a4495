//! Encoder parser.

use super::ports::resolve_ports;
use super::{read_register_window, traced, ComponentParser};
use crate::descriptor::{DescriptorSource, NodeId};
use crate::error::Result;
use crate::topology::{Component, ComponentKind, ComponentParams, EncoderParams, PortDirection};

/// Parses `xuantie_ntrace,encoder-controller` nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncoderParser;

impl ComponentParser for EncoderParser {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Encoder
    }

    fn parse(&self, source: &dyn DescriptorSource, node: NodeId) -> Result<Component> {
        let (register_base, register_size) = read_register_window(source, node)?;
        tracing::debug!("base=0x{:x} size=0x{:x}", register_base, register_size);

        let u32_field = |name: &str| traced(name, source.read_u32(node, name));
        let str_field = |name: &str| traced(name, source.read_str(node, name)).map(str::to_string);
        let flag_field = |name: &str| traced(name, source.read_flag(node, name));

        // Field order matches the descriptor schema; the first failure wins.
        let params = EncoderParams {
            cpu: u32_field("cpu")?,
            trace_type: str_field("trace_type")?,
            insn_mode: str_field("insn_mode")?,
            send_context: flag_field("send_context")?,
            enable_src: flag_field("enable_src")?,
            src_id: u32_field("src_id")?,
            src_bits: u32_field("src_bits")?,
            inst_sync_mode: str_field("inst_sync_mode")?,
            inst_sync_value: u32_field("inst_sync_value")?,
            enable_cpu_trigger: flag_field("enable_cpu_trigger")?,
            enable_timestamp: flag_field("enable_timestamp")?,
            timestamp_run_in_debug_mode: flag_field("timestamp_runindebugmode")?,
            timestamp_source: str_field("timestamp_source")?,
            timestamp_prescale: u32_field("timestamp_prescale")?,
            timestamp_bits: u32_field("timestamp_bits")?,
        };

        let outputs = resolve_ports(source, node, PortDirection::Output, ComponentKind::Funnel)?;

        Ok(Component {
            name: source.node_name(node).to_string(),
            register_base,
            register_size,
            params: ComponentParams::Encoder(params),
            inputs: Vec::new(),
            outputs,
        })
    }
}
