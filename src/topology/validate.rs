//! Post-discovery link validation.
//!
//! Port resolution copies the peer's base address straight from the peer
//! descriptor, so a port may name an address that no registered component
//! owns (peer disabled, peer of an unknown kind, typo in the description).
//! This pass checks every port against the registry once all three passes
//! have run.

use super::{ComponentKind, PortDirection, TopologyRegistry};
use crate::error::{Result, TopologyError};
use serde::{Deserialize, Serialize};

/// How bring-up treats link issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkValidation {
    /// Skip validation.
    Off,
    /// Log issues and continue.
    #[default]
    Warn,
    /// Fail bring-up on the first dangling link.
    Strict,
}

/// A problem found on one port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkIssue {
    /// No registered component has the port's peer address.
    Dangling {
        component: String,
        direction: PortDirection,
        index: u32,
        addr: u64,
    },
    /// A component exists at the address but is not the expected kind.
    KindMismatch {
        component: String,
        direction: PortDirection,
        index: u32,
        expected: ComponentKind,
        found: ComponentKind,
    },
}

impl LinkIssue {
    pub fn is_dangling(&self) -> bool {
        matches!(self, LinkIssue::Dangling { .. })
    }
}

/// Check every port of every component.
pub fn find_link_issues(registry: &TopologyRegistry) -> Vec<LinkIssue> {
    let mut issues = Vec::new();
    for component in registry {
        for port in component.ports() {
            match registry.component_at(port.peer_base_addr) {
                None => issues.push(LinkIssue::Dangling {
                    component: component.name.clone(),
                    direction: port.direction,
                    index: port.index,
                    addr: port.peer_base_addr,
                }),
                Some(peer) if peer.kind() != port.peer_kind_hint => {
                    issues.push(LinkIssue::KindMismatch {
                        component: component.name.clone(),
                        direction: port.direction,
                        index: port.index,
                        expected: port.peer_kind_hint,
                        found: peer.kind(),
                    })
                }
                Some(_) => {}
            }
        }
    }
    issues
}

/// Run validation in the given mode; returns the issues that were tolerated.
pub fn validate_links(registry: &TopologyRegistry, mode: LinkValidation) -> Result<Vec<LinkIssue>> {
    if mode == LinkValidation::Off {
        return Ok(Vec::new());
    }

    let issues = find_link_issues(registry);
    for issue in &issues {
        match issue {
            LinkIssue::Dangling {
                component,
                direction,
                index,
                addr,
            } => {
                if mode == LinkValidation::Strict {
                    return Err(TopologyError::DanglingLink {
                        component: component.clone(),
                        port: format!("{}[{}]", direction.group(), index),
                        addr: *addr,
                    });
                }
                tracing::warn!(
                    "{} {}[{}] points at 0x{:x}, no component registered there",
                    component,
                    direction.group(),
                    index,
                    addr
                );
            }
            LinkIssue::KindMismatch {
                component,
                direction,
                index,
                expected,
                found,
            } => {
                tracing::warn!(
                    "{} {}[{}] expects a {} peer, found {}",
                    component,
                    direction.group(),
                    index,
                    expected,
                    found
                );
            }
        }
    }
    Ok(issues)
}
