//! Error types (spec §7 "Error Handling Design").

use thiserror::Error;

/// Non-fatal diagnostics returned from manager entry points.
///
/// The manager never panics on caller input; every entry point either
/// returns one of these or silently ignores unresolvable state (spec
/// §7: "Lifecycle mis-match... silently ignored").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ManagerError {
    /// No registered `EngineProvider` accepted the start options
    /// (spec §4.4 step 5).
    #[error("no engine provider accepted the start options")]
    NoProviderAccepted,

    /// The winning provider's engine factory raised an exception
    /// (spec §7 "Engine construction failure").
    #[error("engine construction failed: {0}")]
    EngineConstructionFailed(String),

    /// `restart()` called while a precondition in spec §4.6 does not hold.
    #[error("restart is not allowed: {0}")]
    RestartNotAllowed(&'static str),

    /// The `StopDebuggingHelper` driving a restart did not observe a
    /// clean stop before its internal timeout (spec §5).
    #[error("stop-debugging timed out during restart")]
    RestartTimedOut,

    /// `close()` was called with no such object tracked by the manager.
    #[error("object already closed or unknown")]
    UnknownObject,
}

/// Invariant violations that would corrupt internal state if allowed to
/// proceed (spec §7 "Configuration / programmer").
///
/// These guard invariants only; they are never raised in response to
/// ordinary caller input or engine behavior. In debug builds the manager
/// asserts on them; in release builds it logs and degrades rather than
/// panicking, per spec §7.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FatalError {
    /// `start()` re-entered while the startup-listener phase is `Starting`
    /// (spec §4.4 step 2).
    #[error("start() re-entered while startup listeners were running")]
    ReentrantStart,

    /// A message arrived whose kind the pump does not recognize.
    #[error("unknown engine message kind")]
    UnknownEngineMessage,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
