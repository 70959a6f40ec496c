//! The engine record (spec §3 "Engine record").

use crate::id::{EngineId, ProcessId, RuntimeId};
use crate::tags::DebugTag;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier of the `ObjectFactory` bound to `(runtime, engine)`.
    pub struct ObjectFactoryId;
}

/// Lifecycle state of one engine record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Starting,
    Running,
    Paused,
}

/// Whether a `start()` call attached to an existing process or launched
/// a new one. Read off the engine-side contract once, at Connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartKind {
    Attach,
    Launch,
}

/// A tag requesting an initial pause at a distinguished event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    /// Pause as soon as the target process is created.
    CreateProcess,
    /// Pause at the debuggee's entry point.
    EntryPoint,
}

/// The exception currently displayed for a paused engine (spec §3:
/// "non-null only while `state == Paused`").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    pub type_name: Option<String>,
    pub message: String,
}

/// One attached debug engine and everything the manager knows about it.
///
/// `process`, `runtime`, and `object_factory` are populated together, on
/// the `Connected` transition (spec §3 invariant): `Starting` iff all
/// three are `None`.
pub struct EngineRecord<E> {
    pub id: EngineId,
    pub engine: E,
    pub process: Option<ProcessId>,
    pub runtime: Option<RuntimeId>,
    pub object_factory: Option<ObjectFactoryId>,
    pub state: EngineState,
    pub start_kind: StartKind,
    /// Immutable snapshot captured at engine construction (spec §3).
    pub debug_tags: Vec<DebugTag>,
    pub break_kind: Option<BreakKind>,
    pub delayed_is_running: bool,
    pub exception: Option<ExceptionInfo>,
}

impl<E> EngineRecord<E> {
    pub fn new(id: EngineId, engine: E, start_kind: StartKind, debug_tags: Vec<DebugTag>, break_kind: Option<BreakKind>) -> Self {
        Self {
            id,
            engine,
            process: None,
            runtime: None,
            object_factory: None,
            state: EngineState::Starting,
            start_kind,
            debug_tags,
            break_kind,
            delayed_is_running: false,
            exception: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.process.is_some()
    }

    /// Invariant check (spec §3): `process`/`runtime`/`object_factory`
    /// are all present or all absent.
    pub fn connection_invariant_holds(&self) -> bool {
        let all_present = self.process.is_some() && self.runtime.is_some() && self.object_factory.is_some();
        let all_absent = self.process.is_none() && self.runtime.is_none() && self.object_factory.is_none();
        all_present || all_absent
    }
}

#[cfg(test)]
#[path = "engine_record_tests.rs"]
mod tests;
