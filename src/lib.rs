//! # trace-topology: Hardware Trace Pipeline Discovery
//!
//! Builds the in-memory topology of a processor trace pipeline from a
//! device-tree-like hardware description, then exposes it to a host event
//! framework through a set of lifecycle hooks.
//!
//! ## Architecture
//!
//! - **Descriptor**: read-only access to the hardware description
//!   ([`descriptor::DescriptorSource`]), with an in-memory tree loaded from
//!   TOML or JSON files
//! - **Discovery**: one parser per component kind (Encoder, Funnel, Sink)
//!   run as ordered passes; ports are resolved to peer register addresses
//! - **Topology**: the append-only registry of components, diagnostics,
//!   JSON snapshots and optional link validation
//! - **Facade**: event hooks resolving events to per-CPU encoders, and the
//!   registration seam towards the host
//!
//! ## Example
//!
//! ```ignore
//! use trace_topology::{
//!     descriptor::DescriptorTree,
//!     discovery::bring_up,
//!     facade::{register_facade, LoggingHost, TraceEventFacade},
//!     topology::LinkValidation,
//! };
//! use std::sync::Arc;
//!
//! let tree = DescriptorTree::load("hardware.toml")?;
//! let outcome = bring_up(&tree, LinkValidation::Warn)?;
//! let shared = outcome.registry.into_shared();
//!
//! let facade = Arc::new(TraceEventFacade::new(shared)?);
//! let mut host = LoggingHost::new();
//! register_facade(&mut host, facade, "xuantie_ntrace")?;
//! ```

pub mod config;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod facade;
pub mod topology;

// Re-export commonly used types
pub use config::DiscoveryConfig;
pub use descriptor::{DescriptorSource, DescriptorTree, HardwareDescription, NodeId};
pub use discovery::{bring_up, discover, BringUp};
pub use error::{Result, TopologyError};
pub use facade::{EventHooks, EventHost, HookOutcome, TraceEvent, TraceEventFacade};
pub use topology::{Component, ComponentKind, SharedRegistry, TopologyRegistry};
