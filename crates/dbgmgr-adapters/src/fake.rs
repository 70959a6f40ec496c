//! Fake engine and provider for testing.
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::engine::{DebugEngine, EngineError, EngineMessageSender};
use crate::provider::EngineProvider;
use async_trait::async_trait;
use dbgmgr_core::{DebugTag, ObjectFactoryId, RuntimeId, StartKind, StartOptions};
use parking_lot::Mutex;
use std::sync::Arc;

/// Recorded call made to a [`FakeEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Start,
    Run,
    Break,
    Detach,
    Terminate,
    OnConnected,
    Close,
}

struct FakeEngineState {
    calls: Vec<EngineCall>,
    messages: Option<EngineMessageSender>,
}

/// A scriptable [`DebugEngine`] double.
///
/// Exposes the sender handed to it at `start()` so a test can push
/// [`dbgmgr_core::EngineMessage`]s on the engine's behalf, mirroring the
/// teacher's `FakeSessionAdapter` call-recording pattern.
#[derive(Clone)]
pub struct FakeEngine {
    tags: Vec<DebugTag>,
    start_kind: StartKind,
    can_detach: bool,
    fail_start: Option<String>,
    inner: Arc<Mutex<FakeEngineState>>,
}

impl FakeEngine {
    pub fn new(start_kind: StartKind) -> Self {
        Self {
            tags: vec![DebugTag::from("fake")],
            start_kind,
            can_detach: true,
            fail_start: None,
            inner: Arc::new(Mutex::new(FakeEngineState {
                calls: Vec::new(),
                messages: None,
            })),
        }
    }

    pub fn with_tags(mut self, tags: Vec<DebugTag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_can_detach(mut self, can_detach: bool) -> Self {
        self.can_detach = can_detach;
        self
    }

    pub fn failing_to_start(mut self, reason: impl Into<String>) -> Self {
        self.fail_start = Some(reason.into());
        self
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.inner.lock().calls.clone()
    }

    /// The sender captured from the most recent `start()` call, if any.
    pub fn messages(&self) -> Option<EngineMessageSender> {
        self.inner.lock().messages.clone()
    }
}

#[async_trait]
impl DebugEngine for FakeEngine {
    fn debug_tags(&self) -> Vec<DebugTag> {
        self.tags.clone()
    }

    fn start_kind(&self) -> StartKind {
        self.start_kind
    }

    fn can_detach(&self) -> bool {
        self.can_detach
    }

    async fn start(&self, _options: StartOptions, messages: EngineMessageSender) -> Result<(), EngineError> {
        let mut state = self.inner.lock();
        state.calls.push(EngineCall::Start);
        if let Some(reason) = &self.fail_start {
            return Err(EngineError::ConstructionFailed(reason.clone()));
        }
        state.messages = Some(messages);
        Ok(())
    }

    async fn run(&self) {
        self.inner.lock().calls.push(EngineCall::Run);
    }

    async fn r#break(&self) {
        self.inner.lock().calls.push(EngineCall::Break);
    }

    async fn detach(&self) {
        self.inner.lock().calls.push(EngineCall::Detach);
    }

    async fn terminate(&self) {
        self.inner.lock().calls.push(EngineCall::Terminate);
    }

    async fn on_connected(&self, _factory: ObjectFactoryId, _runtime: RuntimeId) {
        self.inner.lock().calls.push(EngineCall::OnConnected);
    }

    async fn close(&self) {
        self.inner.lock().calls.push(EngineCall::Close);
    }
}

/// A provider that always hands out a fresh [`FakeEngine`], or refuses
/// (returns `Ok(None)`) when `accepts` is false.
pub struct FakeProvider {
    priority: i32,
    accepts: bool,
    start_kind: StartKind,
    last_engine: Mutex<Option<FakeEngine>>,
}

impl FakeProvider {
    pub fn new(priority: i32) -> Self {
        Self {
            priority,
            accepts: true,
            start_kind: StartKind::Launch,
            last_engine: Mutex::new(None),
        }
    }

    pub fn refusing(priority: i32) -> Self {
        Self {
            priority,
            accepts: false,
            start_kind: StartKind::Launch,
            last_engine: Mutex::new(None),
        }
    }

    pub fn with_start_kind(mut self, kind: StartKind) -> Self {
        self.start_kind = kind;
        self
    }

    /// The engine most recently constructed by this provider, if any.
    pub fn last_engine(&self) -> Option<FakeEngine> {
        self.last_engine.lock().clone()
    }
}

#[async_trait]
impl EngineProvider for FakeProvider {
    fn priority(&self) -> i32 {
        self.priority
    }

    async fn create(&self, _options: &StartOptions) -> Result<Option<Arc<dyn DebugEngine>>, EngineError> {
        if !self.accepts {
            return Ok(None);
        }
        let engine = FakeEngine::new(self.start_kind);
        *self.last_engine.lock() = Some(engine.clone());
        Ok(Some(Arc::new(engine)))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
