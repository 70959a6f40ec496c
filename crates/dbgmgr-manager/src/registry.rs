//! The engine registry (spec §4.2).

use dbgmgr_adapters::DebugEngine;
use dbgmgr_core::{EngineId, EngineRecord};
use std::collections::HashMap;
use std::sync::Arc;

/// Handle type held in every [`EngineRecord`] managed by this crate.
pub type EngineHandle = Arc<dyn DebugEngine>;

/// The list of [`EngineRecord`]s, under a single lock (the caller's).
#[derive(Default)]
pub struct EngineRegistry {
    engines: HashMap<EngineId, EngineRecord<EngineHandle>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, info: EngineRecord<EngineHandle>) {
        self.engines.insert(info.id.clone(), info);
    }

    /// `find` returning `None` is a normal condition (spec §4.2): the
    /// engine may have disconnected between message post and dispatch.
    pub fn remove(&mut self, engine: &EngineId) -> Option<EngineRecord<EngineHandle>> {
        self.engines.remove(engine)
    }

    pub fn find(&self, engine: &EngineId) -> Option<&EngineRecord<EngineHandle>> {
        self.engines.get(engine)
    }

    pub fn find_mut(&mut self, engine: &EngineId) -> Option<&mut EngineRecord<EngineHandle>> {
        self.engines.get_mut(engine)
    }

    pub fn contains(&self, engine: &EngineId) -> bool {
        self.engines.contains_key(engine)
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &EngineId> {
        self.engines.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EngineRecord<EngineHandle>> {
        self.engines.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut EngineRecord<EngineHandle>> {
        self.engines.values_mut()
    }

    pub fn for_process<'a>(&'a self, process: dbgmgr_core::ProcessId) -> impl Iterator<Item = &'a EngineRecord<EngineHandle>> {
        self.engines.values().filter(move |e| e.process == Some(process))
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
