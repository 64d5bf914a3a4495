//! Event facade
//!
//! The boundary between the discovered topology and the host's event
//! framework. The host sees one [`PmuDescriptor`] and one [`EventHooks`]
//! object; the hooks resolve events to encoders through the shared registry.
//!
//! # Main Types
//!
//! - [`EventHooks`] - Lifecycle hooks the host calls on events
//! - [`EventHost`] - Host control plane that accepts a registration
//! - [`TraceEventFacade`] - Hook implementation backed by a [`SharedRegistry`]
//! - [`LoggingHost`] - Host that records registrations and only logs
//!
//! Arming hardware is not implemented yet: `start`/`stop`/`read` resolve
//! and lock the right encoder, log what they would program, and report
//! [`HookOutcome::NotImplemented`].
//!
//! [`SharedRegistry`]: crate::topology::SharedRegistry

pub mod hooks;

pub use hooks::TraceEventFacade;

use crate::error::{Result, TopologyError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Name the facility registers under unless configured otherwise
pub const DEFAULT_PMU_NAME: &str = "xuantie_ntrace";

/// Capability flags advertised to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PmuCapabilities {
    /// Only one event may own the hardware at a time
    pub exclusive: bool,
    /// Produces instruction trace
    pub instruction_trace: bool,
}

impl Default for PmuCapabilities {
    fn default() -> Self {
        Self {
            exclusive: true,
            instruction_trace: true,
        }
    }
}

/// Scheduling context the host runs events in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskContext {
    #[default]
    Software,
}

/// Registration record handed to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PmuDescriptor {
    pub name: String,
    pub capabilities: PmuCapabilities,
    pub task_context: TaskContext,
}

impl PmuDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: PmuCapabilities::default(),
            task_context: TaskContext::default(),
        }
    }
}

impl Default for PmuDescriptor {
    fn default() -> Self {
        Self::new(DEFAULT_PMU_NAME)
    }
}

/// An event request as seen by the hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceEvent {
    /// Processor the event was opened on; `None` for a CPU-agnostic event
    pub cpu: Option<u32>,
    /// Processor the event is currently scheduled on
    pub on_cpu: Option<u32>,
    /// Raw event configuration word
    pub config: u64,
}

impl TraceEvent {
    /// Event bound to one processor
    pub fn for_cpu(cpu: u32) -> Self {
        Self {
            cpu: Some(cpu),
            ..Default::default()
        }
    }

    /// Processor the hooks act on: where it runs, else where it was opened
    pub fn target_cpu(&self) -> Option<u32> {
        self.on_cpu.or(self.cpu)
    }
}

/// One address-range filter attached to an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddrFilter {
    pub start: u64,
    pub size: u64,
}

/// What a hook did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    /// The request was accepted
    Accepted,
    /// Resolution succeeded but hardware programming is not implemented
    NotImplemented,
    /// The facility is disabled; nothing was touched
    Gated,
}

impl fmt::Display for HookOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookOutcome::Accepted => write!(f, "accepted"),
            HookOutcome::NotImplemented => write!(f, "not implemented"),
            HookOutcome::Gated => write!(f, "gated"),
        }
    }
}

/// Lifecycle hooks invoked by the host, possibly concurrently
pub trait EventHooks: Send + Sync {
    /// Check that the event can be served by the topology
    fn init(&self, event: &TraceEvent) -> Result<HookOutcome>;

    /// Associate an event with hardware
    fn add(&self, event: &TraceEvent, flags: u32) -> Result<HookOutcome>;

    /// Drop an event's association with hardware
    fn del(&self, event: &TraceEvent, flags: u32) -> Result<HookOutcome>;

    /// Arm capture on the event's encoder
    fn start(&self, event: &TraceEvent, flags: u32) -> Result<HookOutcome>;

    /// Disarm capture on the event's encoder
    fn stop(&self, event: &TraceEvent, flags: u32) -> Result<HookOutcome>;

    /// Read counters/status
    fn read(&self, event: &TraceEvent) -> Result<HookOutcome>;

    /// Open the facility-wide gate
    fn enable(&self);

    /// Close the facility-wide gate
    fn disable(&self);

    /// Push address filters to hardware
    fn addr_filters_sync(&self, event: &TraceEvent) -> Result<HookOutcome>;

    /// Check a filter list before it is attached
    fn addr_filters_validate(&self, filters: &[AddrFilter]) -> Result<()>;
}

/// Host control plane accepting one registration per facility
#[cfg_attr(test, mockall::automock)]
pub trait EventHost {
    fn register(&mut self, descriptor: &PmuDescriptor, hooks: Arc<dyn EventHooks>) -> Result<()>;
}

/// Register the facade with the host under `name`.
pub fn register_facade(
    host: &mut dyn EventHost,
    facade: Arc<TraceEventFacade>,
    name: &str,
) -> Result<PmuDescriptor> {
    let descriptor = PmuDescriptor::new(name);
    match host.register(&descriptor, facade) {
        Ok(()) => {
            tracing::info!("Registered event facility '{}'", descriptor.name);
            Ok(descriptor)
        }
        Err(e) => {
            tracing::error!("Failed to register event facility '{}': {}", name, e);
            Err(e)
        }
    }
}

/// Host that keeps registrations in memory and logs them
#[derive(Default)]
pub struct LoggingHost {
    registrations: Vec<(PmuDescriptor, Arc<dyn EventHooks>)>,
}

impl LoggingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Hooks registered under `name`
    pub fn hooks(&self, name: &str) -> Option<Arc<dyn EventHooks>> {
        self.registrations
            .iter()
            .find(|(descriptor, _)| descriptor.name == name)
            .map(|(_, hooks)| Arc::clone(hooks))
    }
}

impl fmt::Debug for LoggingHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .registrations
            .iter()
            .map(|(descriptor, _)| descriptor.name.as_str())
            .collect();
        f.debug_struct("LoggingHost")
            .field("registrations", &names)
            .finish()
    }
}

impl EventHost for LoggingHost {
    fn register(&mut self, descriptor: &PmuDescriptor, hooks: Arc<dyn EventHooks>) -> Result<()> {
        if self.hooks(&descriptor.name).is_some() {
            return Err(TopologyError::Host(format!(
                "facility '{}' is already registered",
                descriptor.name
            )));
        }
        tracing::info!(
            "host: register '{}' exclusive={} itrace={} context={:?}",
            descriptor.name,
            descriptor.capabilities.exclusive,
            descriptor.capabilities.instruction_trace,
            descriptor.task_context
        );
        self.registrations.push((descriptor.clone(), hooks));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::TopologyRegistry;

    fn empty_facade() -> Arc<TraceEventFacade> {
        Arc::new(TraceEventFacade::new(TopologyRegistry::new().into_shared()).unwrap())
    }

    #[test]
    fn test_default_descriptor() {
        let descriptor = PmuDescriptor::default();
        assert_eq!(descriptor.name, "xuantie_ntrace");
        assert!(descriptor.capabilities.exclusive);
        assert!(descriptor.capabilities.instruction_trace);
        assert_eq!(descriptor.task_context, TaskContext::Software);
    }

    #[test]
    fn test_target_cpu_prefers_on_cpu() {
        let event = TraceEvent {
            cpu: Some(1),
            on_cpu: Some(3),
            config: 0,
        };
        assert_eq!(event.target_cpu(), Some(3));
        assert_eq!(TraceEvent::for_cpu(2).target_cpu(), Some(2));
        assert_eq!(TraceEvent::default().target_cpu(), None);
    }

    #[test]
    fn test_register_through_mock_host() {
        let mut host = MockEventHost::new();
        host.expect_register()
            .withf(|descriptor, _| descriptor.name == "ntrace0")
            .times(1)
            .returning(|_, _| Ok(()));

        let descriptor = register_facade(&mut host, empty_facade(), "ntrace0").unwrap();
        assert_eq!(descriptor.name, "ntrace0");
    }

    #[test]
    fn test_register_failure_propagates() {
        let mut host = MockEventHost::new();
        host.expect_register()
            .returning(|_, _| Err(TopologyError::Host("no slots".into())));

        let err = register_facade(&mut host, empty_facade(), DEFAULT_PMU_NAME).unwrap_err();
        assert!(matches!(err, TopologyError::Host(msg) if msg == "no slots"));
    }

    #[test]
    fn test_logging_host_rejects_duplicates() {
        let mut host = LoggingHost::new();
        register_facade(&mut host, empty_facade(), DEFAULT_PMU_NAME).unwrap();
        assert_eq!(host.len(), 1);
        assert!(host.hooks(DEFAULT_PMU_NAME).is_some());

        assert!(register_facade(&mut host, empty_facade(), DEFAULT_PMU_NAME).is_err());
        assert_eq!(host.len(), 1);
    }
}
