//! User settings consulted by the Run/Break Controller and the
//! Bound-Breakpoint Bridge (spec §4.5, §4.6).
//!
//! spec.md is silent on configuration format; the host owns persistence
//! (out of scope per spec §1) and hands a loaded [`ManagerSettings`] to
//! [`crate::config::ManagerSettings::default`] or its own deserialized
//! value at `DebugManager::new` time.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerSettings {
    /// When false, a `ProgramBreak` message without the Continue flag
    /// forces a pause (spec §4.5 "conditional-break family").
    pub ignore_break_instructions: bool,
    /// When true, `onEnginePaused` initiates a BreakAll fence, and
    /// `run(process)` is upgraded to `runAll()` (spec §4.5, §4.6).
    pub break_all_processes: bool,
    /// Quiescence window, in milliseconds, before `DelayedIsRunningChanged`
    /// fires once `isRunning` settles at `true` (spec §4.7).
    pub delayed_is_running_debounce_ms: u64,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            ignore_break_instructions: false,
            break_all_processes: false,
            delayed_is_running_debounce_ms: 400,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
