//! Registry-backed event hooks.

use super::{AddrFilter, EventHooks, HookOutcome, TraceEvent};
use crate::error::{Result, TopologyError};
use crate::topology::{Component, SharedRegistry, TopologyRegistry};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, RwLockReadGuard};

/// Hooks resolving events to encoders in a shared registry
///
/// Holds one mutex per registered component, indexed by registry position,
/// so `start`/`stop`/`read` on the same encoder are serialized while
/// different encoders proceed in parallel.
#[derive(Debug)]
pub struct TraceEventFacade {
    registry: SharedRegistry,
    component_locks: Vec<Mutex<()>>,
    enabled: AtomicBool,
}

impl TraceEventFacade {
    pub fn new(registry: SharedRegistry) -> Result<Self> {
        let count = registry
            .read()
            .map_err(|_| TopologyError::LockPoisoned)?
            .len();
        Ok(Self {
            registry,
            component_locks: (0..count).map(|_| Mutex::new(())).collect(),
            enabled: AtomicBool::new(true),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    fn read_registry(&self) -> Result<RwLockReadGuard<'_, TopologyRegistry>> {
        self.registry.read().map_err(|_| TopologyError::LockPoisoned)
    }

    fn lock_component(&self, index: usize) -> Result<MutexGuard<'_, ()>> {
        self.component_locks
            .get(index)
            .ok_or_else(|| {
                TopologyError::Host(format!(
                    "component {} was registered after the facade was built",
                    index
                ))
            })?
            .lock()
            .map_err(|_| TopologyError::LockPoisoned)
    }

    /// Run `f` on the event's encoder while holding that encoder's lock.
    fn with_encoder<F>(&self, event: &TraceEvent, f: F) -> Result<HookOutcome>
    where
        F: FnOnce(&Component) -> HookOutcome,
    {
        let cpu = event
            .target_cpu()
            .ok_or_else(|| TopologyError::Host("event has no target processor".to_string()))?;
        let registry = self.read_registry()?;
        let (index, encoder) = registry
            .encoder_for_cpu(cpu)
            .ok_or(TopologyError::NoEncoderForCpu(cpu))?;
        let _guard = self.lock_component(index)?;
        Ok(f(encoder))
    }
}

impl EventHooks for TraceEventFacade {
    fn init(&self, event: &TraceEvent) -> Result<HookOutcome> {
        let registry = self.read_registry()?;
        match event.cpu {
            Some(cpu) => {
                let (_, encoder) = registry
                    .encoder_for_cpu(cpu)
                    .ok_or(TopologyError::NoEncoderForCpu(cpu))?;
                tracing::debug!("init: cpu {} served by {}", cpu, encoder.name);
            }
            None => {
                if !registry.iter().any(|c| c.encoder().is_some()) {
                    return Err(TopologyError::EmptyTopology);
                }
                tracing::debug!("init: cpu-agnostic event");
            }
        }
        Ok(HookOutcome::Accepted)
    }

    fn add(&self, event: &TraceEvent, flags: u32) -> Result<HookOutcome> {
        tracing::debug!("add: cpu={:?} flags=0x{:x}", event.target_cpu(), flags);
        Ok(HookOutcome::NotImplemented)
    }

    fn del(&self, event: &TraceEvent, flags: u32) -> Result<HookOutcome> {
        tracing::debug!("del: cpu={:?} flags=0x{:x}", event.target_cpu(), flags);
        Ok(HookOutcome::NotImplemented)
    }

    fn start(&self, event: &TraceEvent, flags: u32) -> Result<HookOutcome> {
        if !self.is_enabled() {
            tracing::debug!("start: facility disabled, cpu={:?}", event.target_cpu());
            return Ok(HookOutcome::Gated);
        }
        self.with_encoder(event, |encoder| {
            if let Some(params) = encoder.encoder() {
                tracing::info!(
                    "start: arm {} cpu={} trace_type={} insn_mode={} timestamp={} flags=0x{:x}",
                    encoder.name,
                    params.cpu,
                    params.trace_type,
                    params.insn_mode,
                    params.enable_timestamp,
                    flags
                );
            }
            HookOutcome::NotImplemented
        })
    }

    fn stop(&self, event: &TraceEvent, flags: u32) -> Result<HookOutcome> {
        self.with_encoder(event, |encoder| {
            tracing::info!("stop: disarm {} flags=0x{:x}", encoder.name, flags);
            HookOutcome::NotImplemented
        })
    }

    fn read(&self, event: &TraceEvent) -> Result<HookOutcome> {
        self.with_encoder(event, |encoder| {
            tracing::debug!("read: {}", encoder.name);
            HookOutcome::NotImplemented
        })
    }

    fn enable(&self) {
        self.enabled.store(true, Ordering::Release);
        tracing::debug!("facility enabled");
    }

    fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
        tracing::debug!("facility disabled");
    }

    fn addr_filters_sync(&self, event: &TraceEvent) -> Result<HookOutcome> {
        tracing::debug!("addr_filters_sync: cpu={:?}", event.target_cpu());
        Ok(HookOutcome::NotImplemented)
    }

    fn addr_filters_validate(&self, filters: &[AddrFilter]) -> Result<()> {
        tracing::debug!("addr_filters_validate: {} filters", filters.len());
        Ok(())
    }
}
