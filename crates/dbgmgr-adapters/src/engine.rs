//! The engine-side contract (spec §6 "Engine-side contract").

use async_trait::async_trait;
use dbgmgr_core::{DebugTag, EngineMessage, ObjectFactoryId, RuntimeId, StartKind, StartOptions};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors a backend can raise while constructing or driving an engine.
#[derive(Debug, Error, Clone)]
pub enum EngineError {
    #[error("engine construction failed: {0}")]
    ConstructionFailed(String),
    #[error("engine backend error: {0}")]
    Backend(String),
}

/// The channel an engine uses to deliver messages back to the manager
/// (spec §6 "Channel: `message(sender, event)`").
///
/// Handed to the engine by `startOnDbgThread` before `engine.start()` is
/// invoked (spec §4.4), so the engine may emit messages from any
/// background task of its own at any point after that.
#[derive(Clone)]
pub struct EngineMessageSender(mpsc::UnboundedSender<EngineMessage>);

impl EngineMessageSender {
    pub fn new(tx: mpsc::UnboundedSender<EngineMessage>) -> Self {
        Self(tx)
    }

    /// Best-effort send: a closed receiver (the manager has already
    /// dropped this engine's subscription) is not an error the engine
    /// needs to handle, per spec §7's disconnect-race tolerance.
    pub fn send(&self, message: EngineMessage) {
        let _ = self.0.send(message);
    }
}

/// A single attached debug engine backend.
///
/// Implementations drive one native or managed debuggee runtime. All
/// methods return promptly (spec §5 "Suspension points: none of the
/// manager's own operations block"); long-running work happens on the
/// backend's own tasks, which report progress via [`EngineMessageSender`].
#[async_trait]
pub trait DebugEngine: Send + Sync + 'static {
    /// Immutable snapshot of tags this engine contributes (spec §3).
    fn debug_tags(&self) -> Vec<DebugTag>;

    /// Whether `start()` attached to an existing process or launched one.
    fn start_kind(&self) -> StartKind;

    /// Whether this engine can be detached without terminating its process.
    fn can_detach(&self) -> bool;

    /// Begin connecting. `messages` is this engine's outbound channel;
    /// the engine must eventually emit `EngineMessage::Connected` (or a
    /// `Connected` with `failure` set) on it.
    async fn start(&self, options: StartOptions, messages: EngineMessageSender) -> Result<(), EngineError>;

    /// Resume execution.
    async fn run(&self);

    /// Request a pause.
    async fn r#break(&self);

    /// Detach without terminating the debuggee.
    async fn detach(&self);

    /// Terminate the debuggee.
    async fn terminate(&self);

    /// Called once, on `Connected`, before the runtime is attached to its
    /// process (spec §4.5: "before attaching the runtime to the process,
    /// so engine-supplied runtime data is visible when `RuntimesChanged`
    /// is raised").
    async fn on_connected(&self, factory: ObjectFactoryId, runtime: RuntimeId);

    /// Release backend resources. Invoked from the object close queue
    /// (spec §4.9), always on the dispatcher.
    async fn close(&self);
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
