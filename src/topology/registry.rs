//! Append-only topology registry.
//!
//! Bring-up owns the registry exclusively and appends each component once it
//! is fully parsed. Afterwards the registry is wrapped once in a
//! [`SharedRegistry`] and handed to the event facade; hooks take the read
//! lock, and a future re-discovery would take the write lock.

use super::{Component, ComponentKind};
use crate::error::{Result, TopologyError};
use std::sync::{Arc, RwLock};

/// Registry shared between bring-up and the event facade.
pub type SharedRegistry = Arc<RwLock<TopologyRegistry>>;

/// Ordered collection of discovered components (insertion = discovery order).
#[derive(Debug, Default)]
pub struct TopologyRegistry {
    components: Vec<Component>,
}

impl TopologyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fully-built component.
    pub fn append(&mut self, component: Component) -> Result<()> {
        self.components
            .try_reserve(1)
            .map_err(|_| TopologyError::AllocationFailure)?;
        self.components.push(component);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Component> {
        self.components.iter()
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Number of components of one kind.
    pub fn count_of(&self, kind: ComponentKind) -> usize {
        self.iter().filter(|c| c.kind() == kind).count()
    }

    /// First encoder owned by `cpu`, with its registry position.
    pub fn encoder_for_cpu(&self, cpu: u32) -> Option<(usize, &Component)> {
        self.iter()
            .enumerate()
            .find(|(_, c)| c.encoder().is_some_and(|e| e.cpu == cpu))
    }

    /// First component whose register window starts at `addr`.
    pub fn component_at(&self, addr: u64) -> Option<&Component> {
        self.iter().find(|c| c.register_base == addr)
    }

    /// Wrap for shared access after bring-up.
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }
}

impl<'a> IntoIterator for &'a TopologyRegistry {
    type Item = &'a Component;
    type IntoIter = std::slice::Iter<'a, Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
