//! Observable events raised by the manager (spec §6 "Events").
//!
//! Serializes with `{"type": "...", ...fields}`, mirroring the teacher's
//! `oj-core::Event` wire convention, so a host can forward these over its
//! own IPC without the manager knowing the wire format.

use crate::engine_record::ExceptionInfo;
use crate::id::{ProcessId, RuntimeId};
use crate::is_running::IsRunning;
use crate::message::{AppDomainId, ModuleId, ThreadId};
use crate::tags::DebugTag;
use serde::{Deserialize, Serialize};

/// Kind tag for `DbgManagerMessage`/user-message events (spec §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserMessageKind {
    CouldNotConnect,
    CouldNotBreak,
    Info,
    Warning,
    Error,
}

/// Events raised outward to observers of the manager.
///
/// Unlike [`crate::message::EngineMessage`] (inbound, mutable while
/// observers vote on `pause`) this is the manager's own outward,
/// immutable broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ManagerEvent {
    #[serde(rename = "process:created")]
    ProcessCreated { process: ProcessId },
    #[serde(rename = "process:exited")]
    ProcessExited { process: ProcessId, exit_code: i32 },
    #[serde(rename = "runtime:created")]
    RuntimeCreated { process: ProcessId, runtime: RuntimeId },
    #[serde(rename = "runtime:exited")]
    RuntimeExited { process: ProcessId, runtime: RuntimeId },
    #[serde(rename = "module:loaded")]
    ModuleLoaded { runtime: RuntimeId, modules: Vec<ModuleId> },
    #[serde(rename = "module:unloaded")]
    ModuleUnloaded { runtime: RuntimeId, modules: Vec<ModuleId> },
    #[serde(rename = "appdomain:loaded")]
    AppDomainLoaded { runtime: RuntimeId, app_domain: AppDomainId },
    #[serde(rename = "appdomain:unloaded")]
    AppDomainUnloaded { runtime: RuntimeId, app_domain: AppDomainId },
    #[serde(rename = "thread:loaded")]
    ThreadLoaded { runtime: RuntimeId, thread: ThreadId },
    #[serde(rename = "thread:unloaded")]
    ThreadUnloaded { runtime: RuntimeId, thread: ThreadId },
    #[serde(rename = "breakpoint:hit")]
    BreakpointHit {
        process: ProcessId,
        thread: Option<ThreadId>,
    },
    #[serde(rename = "entry_point_break")]
    EntryPointBreak { process: ProcessId },
    #[serde(rename = "program_break")]
    ProgramBreak { process: ProcessId },
    #[serde(rename = "program_message")]
    ProgramMessage { process: ProcessId, text: String },
    #[serde(rename = "set_ip_complete")]
    SetIpComplete { process: ProcessId },
    #[serde(rename = "user_message")]
    UserMessage {
        kind: UserMessageKind,
        text: String,
    },
    #[serde(rename = "exception_thrown")]
    ExceptionThrown {
        process: ProcessId,
        exception: ExceptionInfo,
    },
    #[serde(rename = "processes_changed")]
    ProcessesChanged {
        added: Vec<ProcessId>,
        removed: Vec<ProcessId>,
    },
    #[serde(rename = "debug_tags_changed")]
    DebugTagsChanged {
        added: Vec<DebugTag>,
        removed: Vec<DebugTag>,
    },
    #[serde(rename = "process_paused")]
    ProcessPaused {
        process: ProcessId,
        thread: Option<ThreadId>,
    },
    #[serde(rename = "is_debugging_changed")]
    IsDebuggingChanged { is_debugging: bool },
    #[serde(rename = "is_running_changed")]
    IsRunningChanged { is_running: IsRunning },
    #[serde(rename = "delayed_is_running_changed")]
    DelayedIsRunningChanged { is_running: bool },
    #[serde(rename = "dbg_manager_message")]
    DbgManagerMessage {
        kind: UserMessageKind,
        text: String,
    },
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
