//! Diagnostics over the registry.
//!
//! [`log_topology`] prints the assembled graph once bring-up finishes;
//! [`TopologySnapshot`] is the serializable form exported for external
//! consumers.

use super::{Component, ComponentKind, TopologyRegistry};
use crate::error::{Result, TopologyError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-kind counts of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopologySummary {
    pub encoders: usize,
    pub funnels: usize,
    pub sinks: usize,
    /// Total number of ports across all components.
    pub links: usize,
}

impl TopologySummary {
    pub fn of(registry: &TopologyRegistry) -> Self {
        let mut summary = Self::default();
        for component in registry {
            match component.kind() {
                ComponentKind::Encoder => summary.encoders += 1,
                ComponentKind::Funnel => summary.funnels += 1,
                ComponentKind::Sink => summary.sinks += 1,
            }
            summary.links += component.inputs.len() + component.outputs.len();
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.encoders + self.funnels + self.sinks
    }
}

/// Log every component and its ports.
pub fn log_topology(registry: &TopologyRegistry) {
    for component in registry {
        tracing::info!(
            "type={} name={} base=0x{:x} in_num={} out_num={}",
            component.kind(),
            component.name,
            component.register_base,
            component.inputs.len(),
            component.outputs.len()
        );
        for port in component.ports() {
            tracing::info!(
                "\t {} type={} base_addr=0x{:x} ({})",
                port,
                port.peer_kind_hint,
                port.peer_base_addr,
                port.peer_name
            );
        }
    }

    let summary = TopologySummary::of(registry);
    tracing::info!(
        "registered {} trace components ({} encoders, {} funnels, {} sinks)",
        summary.total(),
        summary.encoders,
        summary.funnels,
        summary.sinks
    );
}

/// Serializable export of the topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologySnapshot {
    pub generated_at: DateTime<Utc>,
    pub component_count: usize,
    pub summary: TopologySummary,
    pub components: Vec<Component>,
}

impl TopologySnapshot {
    pub fn capture(registry: &TopologyRegistry) -> Self {
        Self {
            generated_at: Utc::now(),
            component_count: registry.len(),
            summary: TopologySummary::of(registry),
            components: registry.components().to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TopologyError::Config(format!("Failed to serialize topology: {}", e)))
    }

    /// Write the snapshot as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TopologyError::Config(format!("Failed to create export directory: {}", e))
            })?;
        }

        std::fs::write(path, self.to_json()?).map_err(|e| {
            TopologyError::Config(format!("Failed to write topology {:?}: {}", path, e))
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TopologyError::Config(format!("Failed to read topology {:?}: {}", path, e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            TopologyError::Config(format!("Failed to parse topology {:?}: {}", path, e))
        })
    }
}
