//! Topology discovery.
//!
//! Discovery runs once, single-threaded, during bring-up. Each component kind
//! has a [`ComponentParser`]; [`run_pass`] drives one parser over every
//! descriptor node of its kind and appends what it builds to the registry.
//!
//! # Pass protocol
//!
//! 1. Enumerate nodes by `compatible`; disabled nodes are skipped.
//! 2. Parse the node into an owned [`Component`]. Nothing is visible to the
//!    registry until every field and port has been read.
//! 3. Append on success. The first failure aborts the whole pass: later
//!    nodes of the same kind are not visited.
//!
//! Passes run in the fixed order Encoder, Funnel, Sink (see [`discover`]).
//! They never read the partially-built registry; ports carry the peer
//! address read from the peer's own descriptor.

pub mod encoder;
pub mod funnel;
pub mod ports;
pub mod sink;

#[cfg(test)]
pub(crate) mod fixtures;

pub use encoder::EncoderParser;
pub use funnel::FunnelParser;
pub use ports::resolve_ports;
pub use sink::SinkParser;

use crate::descriptor::{cells_to_u64, DescriptorSource, NodeId};
use crate::error::{Result, ResultExt};
use crate::topology::{
    log_topology, validate_links, Component, ComponentKind, LinkIssue, LinkValidation,
    TopologyRegistry,
};
use std::fmt;

/// Number of cells in a `reg` property: base (high, low), size (high, low).
pub const REG_CELLS: usize = 4;

/// Builds one component from one descriptor node.
pub trait ComponentParser {
    /// Kind this parser produces.
    fn kind(&self) -> ComponentKind;

    /// Parse a node; must not register anything itself.
    fn parse(&self, source: &dyn DescriptorSource, node: NodeId) -> Result<Component>;
}

/// Parsers in discovery order.
pub fn default_parsers() -> [&'static dyn ComponentParser; 3] {
    [&EncoderParser, &FunnelParser, &SinkParser]
}

/// Read a node's `reg` property as `(base, size)`.
pub fn read_register_window(source: &dyn DescriptorSource, node: NodeId) -> Result<(u64, u64)> {
    let reg = source.read_cells(node, "reg", REG_CELLS)?;
    Ok((cells_to_u64(reg[0], reg[1]), cells_to_u64(reg[2], reg[3])))
}

/// Log the outcome of one field read and pass it through.
pub(crate) fn traced<T: fmt::Display>(name: &str, result: Result<T>) -> Result<T> {
    match &result {
        Ok(value) => tracing::debug!("{}={}", name, value),
        Err(e) => tracing::error!("Failed to read '{}': {}", name, e),
    }
    result
}

/// Run one parser over all nodes of its kind; returns how many were registered.
pub fn run_pass(
    parser: &dyn ComponentParser,
    source: &dyn DescriptorSource,
    registry: &mut TopologyRegistry,
) -> Result<usize> {
    let kind = parser.kind();
    let mut registered = 0;

    for node in source.nodes_of_kind(kind.compatible()) {
        let name = source.node_name(node);
        if !source.is_available(node) {
            tracing::debug!("skipping disabled {} {}", kind, name);
            continue;
        }

        tracing::debug!("parsing {} {}", kind, name);
        let component = parser
            .parse(source, node)
            .with_context(|| format!("{} {}", kind, name))?;
        registry.append(component)?;
        registered += 1;
    }

    tracing::info!(
        "{} pass registered {} (trace components={})",
        kind,
        registered,
        registry.len()
    );
    Ok(registered)
}

/// Run all passes in order and return the populated registry.
pub fn discover(source: &dyn DescriptorSource) -> Result<TopologyRegistry> {
    let mut registry = TopologyRegistry::new();
    for parser in default_parsers() {
        run_pass(parser, source, &mut registry)
            .with_context(|| format!("{} pass", parser.kind()))?;
    }
    Ok(registry)
}

/// Result of a successful bring-up.
#[derive(Debug)]
pub struct BringUp {
    pub registry: TopologyRegistry,
    /// Link issues tolerated under the chosen validation mode.
    pub link_issues: Vec<LinkIssue>,
}

/// Discover, report, then validate links.
pub fn bring_up(source: &dyn DescriptorSource, validation: LinkValidation) -> Result<BringUp> {
    let registry = discover(source)?;
    log_topology(&registry);
    let link_issues = validate_links(&registry, validation)?;
    Ok(BringUp {
        registry,
        link_issues,
    })
}
