//! The process registry (spec §3 "Process record").

use dbgmgr_core::{ProcessId, ProcessRecord};
use std::collections::HashMap;

#[derive(Default)]
pub struct ProcessRegistry {
    processes: HashMap<ProcessId, ProcessRecord>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the record for `pid`, or create one (returning whether it was
    /// newly created, for `ProcessCreated` emission — spec §4.5).
    pub fn get_or_create(&mut self, pid: ProcessId, should_detach: bool) -> (&mut ProcessRecord, bool) {
        let mut created = false;
        let entry = self.processes.entry(pid).or_insert_with(|| {
            created = true;
            ProcessRecord::new(pid, should_detach)
        });
        (entry, created)
    }

    pub fn get(&self, pid: &ProcessId) -> Option<&ProcessRecord> {
        self.processes.get(pid)
    }

    pub fn get_mut(&mut self, pid: &ProcessId) -> Option<&mut ProcessRecord> {
        self.processes.get_mut(pid)
    }

    pub fn remove(&mut self, pid: &ProcessId) -> Option<ProcessRecord> {
        self.processes.remove(pid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.processes.values()
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}

#[cfg(test)]
#[path = "process_registry_tests.rs"]
mod tests;
