//! The process record (spec §3 "Process record").

use crate::engine_record::EngineState;
use crate::id::{ProcessId, RuntimeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The join of a process's attached runtimes' engine states (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    Running,
    Paused,
    Terminated,
}

/// An OS process under debug, keyed by pid; at most one record per pid.
#[derive(Debug, Clone)]
pub struct ProcessRecord {
    pub id: ProcessId,
    /// True if attached, not spawned (spec §3).
    pub should_detach: bool,
    pub state: ProcessState,
    pub runtimes: HashSet<RuntimeId>,
}

impl ProcessRecord {
    pub fn new(id: ProcessId, should_detach: bool) -> Self {
        Self {
            id,
            should_detach,
            state: ProcessState::Running,
            runtimes: HashSet::new(),
        }
    }

    pub fn is_empty_of_runtimes(&self) -> bool {
        self.runtimes.is_empty()
    }
}

/// Recompute a process's roll-up state from the engine states of the
/// engines currently targeting it (spec §3 / §8 invariant).
///
/// Returns `Terminated` only when explicitly told to (the caller latches
/// that transition when the last runtime detaches, see spec §4.5); this
/// function only distinguishes `Paused` from `Running` among the
/// currently-attached engines, and returns `Running` for an empty slice
/// so that a process freshly created (before its first engine connects)
/// is not reported paused.
pub fn roll_up_process_state<'a>(engine_states: impl Iterator<Item = &'a EngineState>) -> ProcessState {
    let mut any = false;
    let mut all_paused = true;
    for state in engine_states {
        any = true;
        if !matches!(state, EngineState::Paused) {
            all_paused = false;
        }
    }
    if any && all_paused {
        ProcessState::Paused
    } else {
        ProcessState::Running
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
