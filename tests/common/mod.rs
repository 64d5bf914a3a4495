//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use std::path::{Path, PathBuf};
use trace_topology::topology::{ComponentKind, TopologyRegistry};

/// Directory holding the sample description files
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Kinds of a registry in order
pub fn kinds(registry: &TopologyRegistry) -> Vec<ComponentKind> {
    registry.iter().map(|c| c.kind()).collect()
}

/// Component names of a registry in order
pub fn names(registry: &TopologyRegistry) -> Vec<String> {
    registry.iter().map(|c| c.name.clone()).collect()
}
