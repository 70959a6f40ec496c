//! Ternary `IsRunning` derived state (spec §4.7).

use crate::engine_record::EngineState;
use serde::{Deserialize, Serialize};

/// Whether the debug session as a whole is running.
///
/// Modeled as a first-class three-valued type rather than a nullable
/// boolean: `Partial` is a normal product of mixed engine states, not
/// an absence of information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsRunning {
    False,
    True,
    Partial,
}

impl IsRunning {
    pub fn as_bool(self) -> Option<bool> {
        match self {
            IsRunning::False => Some(false),
            IsRunning::True => Some(true),
            IsRunning::Partial => None,
        }
    }
}

/// `CalculateIsRunning` (spec §4.7): empty -> `False`; all `Paused` ->
/// `False`; all non-`Paused` (`Starting`/`Running`) -> `True`; mixed ->
/// `Partial`.
pub fn calculate_is_running<'a>(states: impl Iterator<Item = &'a EngineState>) -> IsRunning {
    let mut any_paused = false;
    let mut any_non_paused = false;
    let mut count = 0;

    for state in states {
        count += 1;
        match state {
            EngineState::Paused => any_paused = true,
            EngineState::Starting | EngineState::Running => any_non_paused = true,
        }
    }

    if count == 0 || !any_non_paused {
        IsRunning::False
    } else if !any_paused {
        IsRunning::True
    } else {
        IsRunning::Partial
    }
}

#[cfg(test)]
#[path = "is_running_tests.rs"]
mod tests;
