//! The public facade (spec §6 "External interfaces").
//!
//! `DebugManager` is a cheap `Clone` handle onto `Inner`, mirroring the
//! teacher's `Executor`-wraps-`Arc<Mutex<_>>` shape. Every method here
//! either reads under the single state lock (spec §5) or posts a job
//! onto the [`Dispatcher`]; none of them block.

use crate::breakpoint_bridge::BoundBreakpointBridge;
use crate::close_queue::{CloseableObject, ObjectCloseQueue};
use crate::dispatcher::Dispatcher;
use crate::observer::{ManagerObserver, ObserverList};
use crate::registry::EngineHandle;
use crate::state::{ManagerState, StartupPhase};
use async_trait::async_trait;
use dbgmgr_adapters::EngineProvider;
use dbgmgr_core::{
    DebugTag, FatalError, IdGen, IsRunning, ManagerError, ManagerEvent, ManagerSettings, ModuleId,
    ProcessId, ProcessRecord, RuntimeId, StartOptions, UserMessageKind, UuidIdGen,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Invoked once, the first time `start()` succeeds in choosing a
/// provider (spec §4.4 step 2).
pub trait StartListener: Send + Sync {
    fn on_start(&self);
}

/// Adapts an [`EngineHandle`] onto the object close queue (spec §4.9):
/// closing an engine just delegates to its own `close()`.
pub(crate) struct EngineCloseable(pub(crate) EngineHandle);

#[async_trait]
impl CloseableObject for EngineCloseable {
    async fn close(&self) {
        self.0.close().await;
    }
}

pub(crate) struct Inner {
    pub(crate) dispatcher: Dispatcher,
    pub(crate) state: Mutex<ManagerState>,
    pub(crate) settings: Mutex<ManagerSettings>,
    pub(crate) observers: Mutex<ObserverList>,
    pub(crate) providers: Vec<Arc<dyn EngineProvider>>,
    pub(crate) bridge: Arc<dyn BoundBreakpointBridge>,
    pub(crate) close_queue: Arc<ObjectCloseQueue>,
    pub(crate) id_gen: Arc<dyn IdGen>,
    pub(crate) start_listeners: Mutex<Vec<Arc<dyn StartListener>>>,
    _dispatcher_handle: JoinHandle<()>,
}

/// The coordination core (spec §1): owns the engine/process registries,
/// derived state, and the control surface the rest of the application
/// drives it through.
#[derive(Clone)]
pub struct DebugManager {
    pub(crate) inner: Arc<Inner>,
}

impl DebugManager {
    /// Construct a manager with no engines attached.
    ///
    /// `providers` need not be pre-sorted; they are walked in ascending
    /// `priority()` order on every `start()` call (spec §4.4 step 3).
    pub fn new(
        providers: Vec<Arc<dyn EngineProvider>>,
        bridge: Arc<dyn BoundBreakpointBridge>,
        settings: ManagerSettings,
    ) -> Self {
        let mut providers = providers;
        providers.sort_by_key(|p| p.priority());
        let (dispatcher, handle) = Dispatcher::spawn();
        Self {
            inner: Arc::new(Inner {
                dispatcher,
                state: Mutex::new(ManagerState::new()),
                settings: Mutex::new(settings),
                observers: Mutex::new(ObserverList::new()),
                providers,
                bridge,
                close_queue: Arc::new(ObjectCloseQueue::new()),
                id_gen: Arc::new(UuidIdGen),
                start_listeners: Mutex::new(Vec::new()),
                _dispatcher_handle: handle,
            }),
        }
    }

    /// Subscribe to the outward event stream (spec §6 "Events").
    pub fn subscribe(&self, observer: Arc<dyn ManagerObserver>) {
        self.inner.observers.lock().subscribe(observer);
    }

    /// Register a listener invoked once, the first time `start()`
    /// succeeds (spec §4.4 step 2).
    pub fn add_start_listener(&self, listener: Arc<dyn StartListener>) {
        self.inner.start_listeners.lock().push(listener);
    }

    pub fn settings(&self) -> ManagerSettings {
        *self.inner.settings.lock()
    }

    pub fn update_settings(&self, settings: ManagerSettings) {
        *self.inner.settings.lock() = settings;
    }

    pub fn is_debugging(&self) -> bool {
        self.inner.state.lock().is_debugging()
    }

    pub fn is_running(&self) -> IsRunning {
        self.inner.state.lock().is_running
    }

    pub fn debug_tags(&self) -> Vec<DebugTag> {
        self.inner.state.lock().tags.snapshot()
    }

    pub fn processes(&self) -> Vec<ProcessRecord> {
        self.inner.state.lock().processes.iter().cloned().collect()
    }

    /// `canRestart` (spec §6): no fence active and a restart snapshot exists.
    pub fn can_restart(&self) -> bool {
        let state = self.inner.state.lock();
        state.break_all.is_none() && state.stop_debugging.is_none() && !state.restart_options.is_empty()
    }

    /// False if `pid` is the process hosting this manager, or if
    /// `(pid, runtime)` is already under debugging (spec §6).
    pub fn can_debug_runtime(&self, pid: ProcessId, runtime: &RuntimeId) -> bool {
        if pid.raw() == std::process::id() {
            return false;
        }
        !self.inner.state.lock().debugged_runtimes.contains(&(pid, runtime.clone()))
    }

    /// Emits `DbgManagerMessage` for logging consumers (spec §6), and
    /// mirrors it to `tracing` (spec §3.1 ambient logging).
    pub fn write_message(&self, kind: UserMessageKind, text: impl Into<String>) {
        let text = text.into();
        match kind {
            UserMessageKind::Warning | UserMessageKind::Error | UserMessageKind::CouldNotConnect | UserMessageKind::CouldNotBreak => {
                tracing::warn!(?kind, %text, "dbg_manager_message");
            }
            UserMessageKind::Info => {
                tracing::info!(?kind, %text, "dbg_manager_message");
            }
        }
        self.emit(ManagerEvent::DbgManagerMessage { kind, text });
    }

    /// `close(obj)` (spec §6, §4.9): enqueue for coalesced, dispatcher-ordered close.
    pub fn close(&self, object: Arc<dyn CloseableObject>) {
        let dispatcher = self.inner.dispatcher.clone();
        self.inner.close_queue.clone().enqueue(object, move |job| {
            dispatcher.post(async move { job.run().await });
        });
    }

    /// `close(objs)` (spec §6): batch form of [`Self::close`].
    pub fn close_many(&self, objects: Vec<Arc<dyn CloseableObject>>) {
        for object in objects {
            self.close(object);
        }
    }

    /// Re-bind breakpoints for `modules` on external module-refresh
    /// notification (spec §4.8).
    pub async fn notify_module_refresh(&self, runtime: &RuntimeId, modules: &[ModuleId]) {
        self.inner.bridge.refresh_modules(runtime, modules).await;
    }

    /// Post a no-op job and wait for it: a barrier confirming every job
    /// posted before this call has finished running. Useful for tests
    /// driving the dispatcher from outside it.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        self.inner.dispatcher.post(async move {
            let _ = tx.send(());
        });
        let _ = rx.await;
    }

    /// Route `kind`/`text` to the broad `Message(event)` channel as a
    /// user-message payload (spec §4.5 "route it to the user-message
    /// channel"), distinct from [`Self::write_message`]'s dedicated
    /// `DbgManagerMessage` event for logging consumers (spec §6).
    pub(crate) fn emit_user_message(&self, kind: UserMessageKind, text: impl Into<String>) {
        self.emit(ManagerEvent::UserMessage { kind, text: text.into() });
    }

    pub(crate) fn emit(&self, event: ManagerEvent) {
        let observers = self.inner.observers.lock().clone();
        observers.notify(&event);
    }

    /// Notify observers of `event` and report whether any voted to pause
    /// (spec §4.5 "conditional-break family").
    pub(crate) fn emit_and_poll_pause(&self, event: ManagerEvent) -> bool {
        let observers = self.inner.observers.lock().clone();
        observers.notify(&event);
        observers.poll_pause(&event)
    }

    /// Raise `IsRunningChanged` when `change` carries a new value, and
    /// feed it to the delayed-notifier (spec §4.7).
    pub(crate) fn emit_is_running_change(&self, change: Option<IsRunning>) {
        if let Some(new) = change {
            self.emit(ManagerEvent::IsRunningChanged { is_running: new });
            self.maybe_update_delayed_is_running(new);
        }
    }

    /// `start(options)` (spec §4.4).
    pub async fn start(&self, options: StartOptions) -> Result<(), ManagerError> {
        self.run_one_time_init().await;

        let restart_snapshot = options.clone();
        let factory_options = options.clone();

        let mut chosen = None;
        for provider in &self.inner.providers {
            match provider.create(&factory_options).await {
                Ok(Some(engine)) => {
                    chosen = Some(engine);
                    break;
                }
                Ok(None) => continue,
                Err(e) => return Err(ManagerError::EngineConstructionFailed(e.to_string())),
            }
        }
        let engine = chosen.ok_or(ManagerError::NoProviderAccepted)?;

        let me = self.clone();
        self.inner.dispatcher.post(async move {
            me.start_on_dispatcher(engine, restart_snapshot, factory_options).await;
        });
        Ok(())
    }

    /// The tri-state guard at `start()` step 2 (spec §4.4, §9 Open
    /// Question): degrades (logs, skips listener invocation) rather than
    /// panicking on reentrant calls, per spec §7's "Configuration /
    /// programmer" handling.
    async fn run_one_time_init(&self) {
        let should_run = {
            let mut state = self.inner.state.lock();
            match state.startup_phase {
                StartupPhase::NotStarted => {
                    state.startup_phase = StartupPhase::Starting;
                    true
                }
                StartupPhase::Starting => {
                    tracing::error!(error = %FatalError::ReentrantStart, "reentrant start() call ignored");
                    debug_assert!(false, "{}", FatalError::ReentrantStart);
                    false
                }
                StartupPhase::Started => false,
            }
        };
        if !should_run {
            return;
        }
        let listeners = self.inner.start_listeners.lock().clone();
        for listener in &listeners {
            listener.on_start();
        }
        self.inner.state.lock().startup_phase = StartupPhase::Started;
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
