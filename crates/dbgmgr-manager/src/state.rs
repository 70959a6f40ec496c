//! Manager-wide mutable state, guarded by a single lock (spec §5: "a
//! single mutex serializes access to the engine registry, process list,
//! tag multiset, cached derived state, restart-options list,
//! debugged-runtimes set, and the helper references").

use crate::helpers::{BreakAllHelper, StopDebuggingHelper};
use crate::process_registry::ProcessRegistry;
use crate::registry::EngineRegistry;
use dbgmgr_core::{IsRunning, ProcessId, RuntimeId, StartOptions, TagMultiset};
use std::collections::HashSet;

/// Tri-state guard for the one-time Start initialization (spec §4.4 step
/// 2; §9 Open Question: "a cleaner encoding is a tri-state").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StartupPhase {
    NotStarted,
    Starting,
    Started,
}

pub(crate) struct ManagerState {
    pub(crate) engines: EngineRegistry,
    pub(crate) processes: ProcessRegistry,
    pub(crate) tags: TagMultiset,
    pub(crate) is_running: IsRunning,
    /// `(pid, runtimeId)` pairs currently under debug (spec §3
    /// "Debugged-runtimes set").
    pub(crate) debugged_runtimes: HashSet<(ProcessId, RuntimeId)>,
    /// One snapshot per `start()` call that carried options (spec §3
    /// "Restart options"). Cleared when `isDebugging` transitions false.
    pub(crate) restart_options: Vec<StartOptions>,
    pub(crate) current_process: Option<ProcessId>,
    pub(crate) startup_phase: StartupPhase,
    pub(crate) break_all: Option<BreakAllHelper>,
    pub(crate) stop_debugging: Option<StopDebuggingHelper>,
    /// Generation counter invalidating in-flight delayed-IsRunning
    /// timers (spec §4.7).
    pub(crate) delayed_is_running_generation: u64,
    /// Whether `DelayedIsRunningChanged(true)` is the last value emitted.
    pub(crate) delayed_is_running: bool,
}

impl ManagerState {
    pub(crate) fn new() -> Self {
        Self {
            engines: EngineRegistry::new(),
            processes: ProcessRegistry::new(),
            tags: TagMultiset::new(),
            is_running: IsRunning::False,
            debugged_runtimes: HashSet::new(),
            restart_options: Vec::new(),
            current_process: None,
            startup_phase: StartupPhase::NotStarted,
            break_all: None,
            stop_debugging: None,
            delayed_is_running_generation: 0,
            delayed_is_running: false,
        }
    }

    pub(crate) fn is_debugging(&self) -> bool {
        !self.engines.is_empty()
    }

    /// Recomputes `isRunning`, returning the new value iff it changed
    /// (spec §4.7: "IsRunningChanged is emitted iff the cached value
    /// changed").
    pub(crate) fn recompute_is_running(&mut self) -> Option<IsRunning> {
        let new = dbgmgr_core::calculate_is_running(self.engines.iter().map(|e| &e.state));
        if new != self.is_running {
            self.is_running = new;
            Some(new)
        } else {
            None
        }
    }
}

/// Recompute a process's roll-up state from its currently-attached
/// engines (spec §3, §8 invariant). A process already `Terminated` is
/// left alone — that transition only happens explicitly, on the last
/// runtime leaving (spec §4.5).
pub(crate) fn roll_up_process(state: &mut ManagerState, pid: ProcessId) {
    let states: Vec<_> = state.engines.for_process(pid).map(|e| e.state).collect();
    if let Some(process) = state.processes.get_mut(&pid) {
        if process.state != dbgmgr_core::ProcessState::Terminated {
            process.state = dbgmgr_core::roll_up_process_state(states.iter());
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
