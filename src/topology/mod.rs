//! Trace topology data model.
//!
//! A trace pipeline is a directed graph of hardware components:
//!
//! ```text
//! [Encoder cpu0] ──┐
//! [Encoder cpu1] ──┼──► [Funnel] ──► [Sink (reserved memory)]
//! [Encoder cpuN] ──┘
//! ```
//!
//! Each [`Component`] carries its register window, kind-specific parameters
//! ([`ComponentParams`]) and the ports linking it to its neighbours. Ports
//! record the peer's register base as read from the peer's descriptor; they
//! do not point into the registry.

pub mod registry;
pub mod report;
pub mod validate;

pub use registry::{SharedRegistry, TopologyRegistry};
pub use report::{log_topology, TopologySnapshot, TopologySummary};
pub use validate::{find_link_issues, validate_links, LinkIssue, LinkValidation};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three kinds of trace component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Per-CPU trace encoder.
    Encoder,
    /// N-input / M-output aggregator.
    Funnel,
    /// Memory sink writing into a reserved region.
    #[serde(rename = "sink_smem")]
    Sink,
}

impl ComponentKind {
    /// Descriptor `compatible` string for this kind.
    pub fn compatible(&self) -> &'static str {
        match self {
            ComponentKind::Encoder => "xuantie_ntrace,encoder-controller",
            ComponentKind::Funnel => "xuantie_ntrace,funnel-controller",
            ComponentKind::Sink => "xuantie_ntrace,sink-controller",
        }
    }

    /// Short name used in diagnostics.
    pub fn display_name(&self) -> &'static str {
        match self {
            ComponentKind::Encoder => "encoder",
            ComponentKind::Funnel => "funnel",
            ComponentKind::Sink => "sink_smem",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Whether a port is an input or output of its owning component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    /// Descriptor container holding ports of this direction.
    pub fn group(&self) -> &'static str {
        match self {
            PortDirection::Input => "input_port",
            PortDirection::Output => "output_port",
        }
    }

    fn short(&self) -> &'static str {
        match self {
            PortDirection::Input => "in",
            PortDirection::Output => "out",
        }
    }
}

/// One endpoint of a link between two components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub direction: PortDirection,
    /// Position among the available ports of its group.
    pub index: u32,
    /// Kind expected at the far end, fixed by pipeline shape.
    pub peer_kind_hint: ComponentKind,
    /// Peer register base copied from the peer descriptor.
    pub peer_base_addr: u64,
    /// Peer descriptor node name.
    pub peer_name: String,
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.direction.short(), self.index)
    }
}

/// Encoder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EncoderParams {
    pub cpu: u32,
    pub trace_type: String,
    pub insn_mode: String,
    pub send_context: bool,
    pub enable_src: bool,
    pub src_id: u32,
    pub src_bits: u32,
    pub inst_sync_mode: String,
    pub inst_sync_value: u32,
    pub enable_cpu_trigger: bool,
    pub enable_timestamp: bool,
    pub timestamp_run_in_debug_mode: bool,
    pub timestamp_source: String,
    pub timestamp_prescale: u32,
    pub timestamp_bits: u32,
}

/// Funnels carry nothing beyond the common fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FunnelParams {}

/// Memory sink configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SinkParams {
    /// First byte of the reserved region.
    pub start_addr: u64,
    /// Last byte of the reserved region (inclusive).
    pub limit_addr: u64,
    pub working_mode: String,
    pub format: String,
}

impl SinkParams {
    /// Size of the reserved region in bytes.
    pub fn buffer_len(&self) -> u64 {
        self.limit_addr
            .saturating_sub(self.start_addr)
            .saturating_add(1)
    }
}

/// Kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentParams {
    Encoder(EncoderParams),
    Funnel(FunnelParams),
    #[serde(rename = "sink_smem")]
    Sink(SinkParams),
}

impl ComponentParams {
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentParams::Encoder(_) => ComponentKind::Encoder,
            ComponentParams::Funnel(_) => ComponentKind::Funnel,
            ComponentParams::Sink(_) => ComponentKind::Sink,
        }
    }
}

/// One hardware trace element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Descriptor node name.
    pub name: String,
    pub register_base: u64,
    pub register_size: u64,
    pub params: ComponentParams,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        self.params.kind()
    }

    pub fn encoder(&self) -> Option<&EncoderParams> {
        match &self.params {
            ComponentParams::Encoder(params) => Some(params),
            _ => None,
        }
    }

    pub fn sink(&self) -> Option<&SinkParams> {
        match &self.params {
            ComponentParams::Sink(params) => Some(params),
            _ => None,
        }
    }

    /// All ports, inputs first.
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().chain(self.outputs.iter())
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @ 0x{:x}", self.kind(), self.name, self.register_base)
    }
}
