//! Shared scaffolding for the behavioral specifications.

use dbgmgr_adapters::{EngineProvider, FakeEngine, FakeProvider};
use dbgmgr_core::{EngineMessage, ManagerEvent, ManagerSettings};
use dbgmgr_manager::{BoundBreakpointBridge, DebugManager, ManagerObserver, NoOpBridge};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Records every event raised on the manager's outward stream, in order.
pub struct RecordingObserver {
    events: Mutex<Vec<ManagerEvent>>,
    /// `None`: never votes to pause. `Some("*")`: votes on every pollable
    /// event. `Some(kind)`: votes only on events whose [`discriminant`]
    /// equals `kind`.
    pause_on: Option<&'static str>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            pause_on: None,
        })
    }

    /// An observer that votes to pause on every conditional-break event
    /// (and on `RuntimeCreated`, the Connected-time pollable event).
    pub fn voting() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            pause_on: Some("*"),
        })
    }

    /// An observer that votes to pause only on events whose [`discriminant`]
    /// equals `kind`.
    pub fn voting_on(kind: &'static str) -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            pause_on: Some(kind),
        })
    }

    pub fn events(&self) -> Vec<ManagerEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// Short labels for order-of-emission assertions.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(discriminant).collect()
    }
}

impl ManagerObserver for RecordingObserver {
    fn on_event(&self, event: &ManagerEvent) {
        self.events.lock().push(event.clone());
    }

    fn wants_pause(&self, event: &ManagerEvent) -> bool {
        match self.pause_on {
            Some("*") => true,
            Some(kind) => discriminant(event) == kind,
            None => false,
        }
    }
}

pub fn discriminant(event: &ManagerEvent) -> &'static str {
    match event {
        ManagerEvent::ProcessCreated { .. } => "ProcessCreated",
        ManagerEvent::ProcessExited { .. } => "ProcessExited",
        ManagerEvent::RuntimeCreated { .. } => "RuntimeCreated",
        ManagerEvent::RuntimeExited { .. } => "RuntimeExited",
        ManagerEvent::ProcessesChanged { .. } => "ProcessesChanged",
        ManagerEvent::DebugTagsChanged { .. } => "DebugTagsChanged",
        ManagerEvent::IsDebuggingChanged { .. } => "IsDebuggingChanged",
        ManagerEvent::IsRunningChanged { .. } => "IsRunningChanged",
        ManagerEvent::DelayedIsRunningChanged { .. } => "DelayedIsRunningChanged",
        ManagerEvent::ProcessPaused { .. } => "ProcessPaused",
        ManagerEvent::ModuleLoaded { .. } => "ModuleLoaded",
        ManagerEvent::ModuleUnloaded { .. } => "ModuleUnloaded",
        ManagerEvent::AppDomainLoaded { .. } => "AppDomainLoaded",
        ManagerEvent::AppDomainUnloaded { .. } => "AppDomainUnloaded",
        ManagerEvent::ThreadLoaded { .. } => "ThreadLoaded",
        ManagerEvent::ThreadUnloaded { .. } => "ThreadUnloaded",
        ManagerEvent::BreakpointHit { .. } => "BreakpointHit",
        ManagerEvent::EntryPointBreak { .. } => "EntryPointBreak",
        ManagerEvent::ProgramBreak { .. } => "ProgramBreak",
        ManagerEvent::ProgramMessage { .. } => "ProgramMessage",
        ManagerEvent::SetIpComplete { .. } => "SetIpComplete",
        ManagerEvent::UserMessage { .. } => "UserMessage",
        ManagerEvent::ExceptionThrown { .. } => "ExceptionThrown",
        ManagerEvent::DbgManagerMessage { .. } => "DbgManagerMessage",
    }
}

/// A manager with `n` fake providers (priorities `0..n`), each accepting.
pub fn manager_with_fakes(n: usize) -> (DebugManager, Vec<Arc<FakeProvider>>) {
    let providers: Vec<Arc<FakeProvider>> = (0..n).map(|i| Arc::new(FakeProvider::new(i as i32))).collect();
    let dyn_providers: Vec<Arc<dyn EngineProvider>> = providers.iter().map(|p| p.clone() as Arc<dyn EngineProvider>).collect();
    let mgr = DebugManager::new(dyn_providers, bridge(), ManagerSettings::default());
    (mgr, providers)
}

pub fn bridge() -> Arc<dyn BoundBreakpointBridge> {
    Arc::new(NoOpBridge)
}

/// Deliver `message` through `engine`'s captured sender, then wait for
/// the message pump's background task to repost it onto the dispatcher
/// and for the dispatcher to drain it.
pub async fn deliver(mgr: &DebugManager, engine: &FakeEngine, message: EngineMessage) {
    engine.messages().expect("engine has started").send(message);
    tokio::time::sleep(Duration::from_millis(20)).await;
    mgr.flush().await;
    mgr.flush().await;
}
