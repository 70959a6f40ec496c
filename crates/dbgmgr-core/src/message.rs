//! Engine message kinds (spec §4.5, §6 "Channel: `message(sender, event)`").

use crate::engine_record::ExceptionInfo;
use crate::id::ProcessId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    pub struct ThreadId;
}

crate::define_id! {
    pub struct ModuleId;
}

crate::define_id! {
    pub struct AppDomainId;
}

/// Flags carried on a message, mutable by observers (spec §4.5:
/// "Observers may set `pause=true`").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFlags {
    pub pause: bool,
    pub continue_execution: bool,
}

impl MessageFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pause(pause: bool) -> Self {
        Self {
            pause,
            continue_execution: false,
        }
    }
}

/// One message delivered by an engine, already filtered through the
/// "is still one of ours" check (spec §4.5).
#[derive(Debug, Clone)]
pub enum EngineMessage {
    /// Engine reports it connected to `pid`/`runtime_id`, or failed with
    /// `failure` set (treated as a disconnect, spec §4.5/§7).
    Connected {
        pid: ProcessId,
        runtime_id: crate::id::RuntimeId,
        failure: Option<String>,
    },
    Disconnected,
    /// `error_message` set means "user-message only, no state change"
    /// (spec §4.5).
    Break {
        error_message: Option<String>,
        thread: Option<ThreadId>,
    },
    EntryPointBreak { flags: MessageFlags },
    ProgramMessage { text: String, flags: MessageFlags },
    Breakpoint {
        thread: Option<ThreadId>,
        flags: MessageFlags,
    },
    ProgramBreak { flags: MessageFlags },
    SetIpComplete { flags: MessageFlags },
    AppDomainLoad { id: AppDomainId, flags: MessageFlags },
    AppDomainUnload { id: AppDomainId, flags: MessageFlags },
    ModuleLoad { modules: Vec<ModuleId>, flags: MessageFlags },
    ModuleUnload { modules: Vec<ModuleId>, flags: MessageFlags },
    ThreadLoad { thread: ThreadId, flags: MessageFlags },
    ThreadUnload { thread: ThreadId, flags: MessageFlags },
    ExceptionThrown {
        exception: ExceptionInfo,
        flags: MessageFlags,
    },
}

impl EngineMessage {
    /// Whether this is one of the "conditional-break family" messages
    /// that are raised to observers before the pause decision is made
    /// (spec §4.5).
    pub fn is_conditional_break(&self) -> bool {
        matches!(
            self,
            EngineMessage::EntryPointBreak { .. }
                | EngineMessage::ProgramMessage { .. }
                | EngineMessage::Breakpoint { .. }
                | EngineMessage::ProgramBreak { .. }
                | EngineMessage::SetIpComplete { .. }
                | EngineMessage::AppDomainLoad { .. }
                | EngineMessage::AppDomainUnload { .. }
                | EngineMessage::ModuleLoad { .. }
                | EngineMessage::ModuleUnload { .. }
                | EngineMessage::ThreadLoad { .. }
                | EngineMessage::ThreadUnload { .. }
                | EngineMessage::ExceptionThrown { .. }
        )
    }

    pub fn flags(&self) -> Option<&MessageFlags> {
        match self {
            EngineMessage::EntryPointBreak { flags }
            | EngineMessage::ProgramMessage { flags, .. }
            | EngineMessage::Breakpoint { flags, .. }
            | EngineMessage::ProgramBreak { flags }
            | EngineMessage::SetIpComplete { flags }
            | EngineMessage::AppDomainLoad { flags, .. }
            | EngineMessage::AppDomainUnload { flags, .. }
            | EngineMessage::ModuleLoad { flags, .. }
            | EngineMessage::ModuleUnload { flags, .. }
            | EngineMessage::ThreadLoad { flags, .. }
            | EngineMessage::ThreadUnload { flags, .. }
            | EngineMessage::ExceptionThrown { flags, .. } => Some(flags),
            EngineMessage::Connected { .. } | EngineMessage::Disconnected | EngineMessage::Break { .. } => None,
        }
    }

    pub fn flags_mut(&mut self) -> Option<&mut MessageFlags> {
        match self {
            EngineMessage::EntryPointBreak { flags }
            | EngineMessage::ProgramMessage { flags, .. }
            | EngineMessage::Breakpoint { flags, .. }
            | EngineMessage::ProgramBreak { flags }
            | EngineMessage::SetIpComplete { flags }
            | EngineMessage::AppDomainLoad { flags, .. }
            | EngineMessage::AppDomainUnload { flags, .. }
            | EngineMessage::ModuleLoad { flags, .. }
            | EngineMessage::ModuleUnload { flags, .. }
            | EngineMessage::ThreadLoad { flags, .. }
            | EngineMessage::ThreadUnload { flags, .. }
            | EngineMessage::ExceptionThrown { flags, .. } => Some(flags),
            EngineMessage::Connected { .. } | EngineMessage::Disconnected | EngineMessage::Break { .. } => None,
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
