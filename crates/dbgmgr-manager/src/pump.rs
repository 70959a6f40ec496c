//! The message pump (spec §4.5): turns inbound [`EngineMessage`]s into
//! state transitions and outward [`ManagerEvent`]s. Every function here
//! runs as (or from within) a dispatcher job — never called directly
//! from a public facade method, so none of them may `.await` a
//! completion signal produced by a later dispatcher job (that would
//! deadlock against the dispatcher's own strict FIFO draining).

use crate::controller::{begin_break_all, settle_break_all, settle_stop_debugging};
use crate::dispatcher::Dispatcher;
use crate::manager::DebugManager;
use crate::registry::EngineHandle;
use dbgmgr_adapters::EngineMessageSender;
use dbgmgr_core::{
    BreakKind, EngineId, EngineRecord, EngineState, EngineMessage, ExceptionInfo, IsRunning,
    ManagerEvent, ObjectFactoryId, ProcessId, ProcessState, RuntimeId, StartKind, StartOptions,
    ThreadId, UserMessageKind,
};
use std::sync::Arc;
use tokio::sync::mpsc;

impl DebugManager {
    /// Runs on the dispatcher as the job posted by `start()` (spec §4.4
    /// step 4, "startOnDbgThread").
    pub(crate) async fn start_on_dispatcher(&self, engine: EngineHandle, restart_snapshot: StartOptions, factory_options: StartOptions) {
        Dispatcher::verify_access();

        let id = EngineId::new(self.inner.id_gen.next());
        let tags = engine.debug_tags();
        let start_kind = engine.start_kind();
        let record = EngineRecord::new(id.clone(), engine.clone(), start_kind, tags.clone(), restart_snapshot.break_kind);

        let (was_empty, tags_added) = {
            let mut state = self.inner.state.lock();
            let was_empty = !state.is_debugging();
            state.engines.add(record);
            state.restart_options.push(restart_snapshot);
            let tags_added = state.tags.add(&tags);
            (was_empty, tags_added)
        };

        if was_empty {
            self.emit(ManagerEvent::IsDebuggingChanged { is_debugging: true });
        }
        let is_running_change = { self.inner.state.lock().recompute_is_running() };
        self.emit_is_running_change(is_running_change);
        if !tags_added.is_empty() {
            self.emit(ManagerEvent::DebugTagsChanged { added: tags_added, removed: vec![] });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.spawn_message_pump(id.clone(), rx);

        if let Err(e) = engine.start(factory_options, EngineMessageSender::new(tx)).await {
            tracing::warn!(engine = %id, error = %e, "engine failed to start");
            self.emit_user_message(UserMessageKind::CouldNotConnect, e.to_string());
            self.handle_disconnected(id).await;
        }
    }

    /// Reads one engine's outbound channel for its whole lifetime,
    /// reposting each message onto the dispatcher. A single task per
    /// engine preserves per-engine FIFO ordering (spec §5) without
    /// blocking the dispatcher while waiting on the channel.
    pub(crate) fn spawn_message_pump(&self, engine: EngineId, mut rx: mpsc::UnboundedReceiver<EngineMessage>) {
        let me = self.clone();
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                let me = me.clone();
                let engine = engine.clone();
                me.inner.dispatcher.post(async move {
                    me.handle_message(engine, message).await;
                });
            }
        });
    }

    pub(crate) async fn handle_message(&self, engine: EngineId, message: EngineMessage) {
        Dispatcher::verify_access();
        match message {
            EngineMessage::Connected { pid, runtime_id, failure } => {
                self.handle_connected(engine, pid, runtime_id, failure).await;
            }
            EngineMessage::Disconnected => self.handle_disconnected(engine).await,
            EngineMessage::Break { error_message, thread } => {
                self.handle_break(engine, error_message, thread).await;
            }
            other => self.handle_conditional_break(engine, other).await,
        }
    }

    /// `Connected` (spec §4.5).
    pub(crate) async fn handle_connected(&self, engine_id: EngineId, pid: ProcessId, runtime_id: RuntimeId, failure: Option<String>) {
        if let Some(reason) = failure {
            self.emit_user_message(UserMessageKind::CouldNotConnect, reason);
            self.handle_disconnected(engine_id).await;
            return;
        }

        let Some(engine) = self.inner.state.lock().engines.find(&engine_id).map(|r| r.engine.clone()) else {
            return; // disconnect race (spec §7)
        };

        let factory_id = ObjectFactoryId::new(self.inner.id_gen.next());
        // Runs before the runtime is attached to the process, so engine-
        // supplied runtime data is visible once RuntimeCreated fires.
        engine.on_connected(factory_id.clone(), runtime_id.clone()).await;

        let break_kind;
        let process_created;
        let break_all_active;
        {
            let mut state = self.inner.state.lock();
            let Some(record) = state.engines.find_mut(&engine_id) else {
                return;
            };
            let should_detach = record.start_kind == StartKind::Attach;
            record.process = Some(pid);
            record.runtime = Some(runtime_id.clone());
            record.object_factory = Some(factory_id);
            record.state = EngineState::Paused;
            record.delayed_is_running = false;
            break_kind = record.break_kind;

            let (process, created) = state.processes.get_or_create(pid, should_detach);
            process.runtimes.insert(runtime_id.clone());
            process_created = created;

            state.debugged_runtimes.insert((pid, runtime_id.clone()));
            break_all_active = state.break_all.is_some();
        }

        if process_created {
            self.emit(ManagerEvent::ProcessCreated { process: pid });
            self.emit(ManagerEvent::ProcessesChanged { added: vec![pid], removed: vec![] });
        }
        let observer_pause = self.emit_and_poll_pause(ManagerEvent::RuntimeCreated { process: pid, runtime: runtime_id.clone() });

        self.inner.bridge.initialize_for_runtime(&runtime_id).await;

        let pause_program = break_kind == Some(BreakKind::CreateProcess) || break_all_active || observer_pause;
        if pause_program {
            self.finalize_paused(engine_id, pid, None, false).await;
        } else {
            self.finalize_resumed(engine_id, pid).await;
        }
    }

    /// `Disconnected`, and failed `Connected` routed here (spec §4.5).
    pub(crate) async fn handle_disconnected(&self, engine_id: EngineId) {
        let Some(record) = self.inner.state.lock().engines.remove(&engine_id) else {
            return;
        };

        let tags_removed;
        let mut runtime_exited = None;
        let mut process_exited = None;
        let is_running_change;
        let is_debugging_change;
        {
            let mut state = self.inner.state.lock();
            tags_removed = state.tags.remove(&record.debug_tags);
            settle_break_all(&mut state, &engine_id);
            settle_stop_debugging(&mut state, &engine_id);

            if let (Some(pid), Some(runtime_id)) = (record.process, record.runtime.clone()) {
                state.debugged_runtimes.remove(&(pid, runtime_id.clone()));
                if let Some(process) = state.processes.get_mut(&pid) {
                    process.runtimes.remove(&runtime_id);
                    runtime_exited = Some((pid, runtime_id));
                    if process.is_empty_of_runtimes() {
                        process.state = ProcessState::Terminated;
                        process_exited = Some(pid);
                        state.processes.remove(&pid);
                    }
                }
                if process_exited.is_some() && state.current_process == Some(pid) {
                    state.current_process = state.engines.iter().find_map(|e| e.process);
                }
            }

            is_running_change = state.recompute_is_running();
            is_debugging_change = if state.is_debugging() {
                None
            } else {
                state.restart_options.clear();
                Some(false)
            };
        }

        if let Some((pid, runtime_id)) = runtime_exited.clone() {
            self.emit(ManagerEvent::RuntimeExited { process: pid, runtime: runtime_id });
        }
        if let Some(pid) = process_exited {
            self.emit(ManagerEvent::ProcessExited { process: pid, exit_code: 0 });
            self.emit(ManagerEvent::ProcessesChanged { added: vec![], removed: vec![pid] });
        }
        if !tags_removed.is_empty() {
            self.emit(ManagerEvent::DebugTagsChanged { added: vec![], removed: tags_removed });
        }
        self.emit_is_running_change(is_running_change);
        if let Some(is_debugging) = is_debugging_change {
            self.emit(ManagerEvent::IsDebuggingChanged { is_debugging });
        }

        if let Some((_, runtime_id)) = &runtime_exited {
            self.inner.bridge.remove_for_runtime(runtime_id).await;
        }

        self.close(Arc::new(crate::manager::EngineCloseable(record.engine)));
    }

    /// `Break` (spec §4.5).
    pub(crate) async fn handle_break(&self, engine_id: EngineId, error_message: Option<String>, thread: Option<ThreadId>) {
        if let Some(msg) = error_message {
            self.emit_user_message(UserMessageKind::CouldNotBreak, msg);
            return;
        }
        let Some((pid, was_paused)) = self
            .inner
            .state
            .lock()
            .engines
            .find(&engine_id)
            .and_then(|r| r.process.map(|pid| (pid, r.state == EngineState::Paused)))
        else {
            return;
        };
        self.finalize_paused(engine_id, pid, thread, was_paused).await;
    }

    /// The conditional-break family (spec §4.5): `EntryPointBreak`,
    /// `ProgramMessage`, `Breakpoint`, `ProgramBreak`, `SetIpComplete`,
    /// AppDomain/Module/Thread load-unload, `ExceptionThrown`.
    pub(crate) async fn handle_conditional_break(&self, engine_id: EngineId, message: EngineMessage) {
        let Some((pid, runtime_id, was_paused)) = ({
            let state = self.inner.state.lock();
            state
                .engines
                .find(&engine_id)
                .and_then(|r| r.process.zip(r.runtime.clone()).map(|(p, rt)| (p, rt, r.state == EngineState::Paused)))
        }) else {
            return;
        };

        self.apply_bridge_side_effects(&runtime_id, &message).await;

        let observer_pause = conditional_break_event(pid, &runtime_id, &message)
            .map(|event| self.emit_and_poll_pause(event))
            .unwrap_or(false);

        let flags = message.flags().copied().unwrap_or_default();
        let settings = self.settings();
        let break_all_active = self.inner.state.lock().break_all.is_some();

        let mut pause_program = flags.pause || observer_pause || break_all_active;
        if was_paused && !flags.continue_execution {
            pause_program = true;
        }
        match &message {
            EngineMessage::ProgramBreak { .. } if !settings.ignore_break_instructions && !flags.continue_execution => {
                pause_program = true;
            }
            EngineMessage::SetIpComplete { .. } if !flags.continue_execution => {
                pause_program = true;
            }
            _ => {}
        }

        if pause_program {
            if let EngineMessage::ExceptionThrown { exception, .. } = &message {
                let mut state = self.inner.state.lock();
                stash_exception(&mut state, &engine_id, exception.clone());
            }
            let thread = conditional_break_thread(&message);
            self.finalize_paused(engine_id, pid, thread, was_paused).await;
        } else {
            self.finalize_resumed(engine_id, pid).await;
        }
    }

    /// Transition `engine_id` into `Paused`, notify any active
    /// `BreakAllHelper`, and run `onEnginePaused` (spec §4.5, §4.6).
    pub(crate) async fn finalize_paused(&self, engine_id: EngineId, pid: ProcessId, thread: Option<ThreadId>, was_paused: bool) {
        let is_running_change = {
            let mut state = self.inner.state.lock();
            if let Some(record) = state.engines.find_mut(&engine_id) {
                record.state = EngineState::Paused;
            }
            crate::state::roll_up_process(&mut state, pid);
            settle_break_all(&mut state, &engine_id);
            state.recompute_is_running()
        };
        self.emit_is_running_change(is_running_change);
        self.on_engine_paused(engine_id, pid, thread, !was_paused).await;
    }

    /// Resolve the exception, mark `Running`, and resume the engine iff
    /// it was actually `Paused` (spec §4.5/§4.6).
    pub(crate) async fn finalize_resumed(&self, engine_id: EngineId, pid: ProcessId) {
        let (should_run, is_running_change) = {
            let mut state = self.inner.state.lock();
            let should_run = state.engines.find(&engine_id).map(|r| r.state == EngineState::Paused).unwrap_or(false);
            if let Some(record) = state.engines.find_mut(&engine_id) {
                record.exception = None;
                record.state = EngineState::Running;
            }
            crate::state::roll_up_process(&mut state, pid);
            (should_run, state.recompute_is_running())
        };
        self.emit_is_running_change(is_running_change);
        if should_run {
            if let Some(engine) = self.inner.state.lock().engines.find(&engine_id).map(|r| r.engine.clone()) {
                engine.run().await;
            }
        }
    }

    /// Mark the process paused for this runtime, adopt current-process
    /// focus when appropriate, and optionally begin a `BreakAll` fence
    /// (spec §4.5 "onEnginePaused").
    pub(crate) async fn on_engine_paused(&self, engine_id: EngineId, pid: ProcessId, thread: Option<ThreadId>, set_current_process: bool) {
        let _ = engine_id;
        let (adopted, pending) = {
            let mut state = self.inner.state.lock();
            let adopted = set_current_process && state.current_process.is_none();
            if adopted {
                state.current_process = Some(pid);
            }
            let pending = if self.settings().break_all_processes {
                begin_break_all(&mut state)
            } else {
                Vec::new()
            };
            (adopted, pending)
        };

        for (_, engine) in pending {
            engine.r#break().await;
        }

        if adopted {
            self.emit(ManagerEvent::ProcessPaused { process: pid, thread });
        }
    }

    /// Debounce `DelayedIsRunningChanged(true)` behind the configured
    /// quiescence window (spec §4.7); the `false` edge is immediate.
    pub(crate) fn maybe_update_delayed_is_running(&self, new_value: IsRunning) {
        if new_value == IsRunning::True {
            let generation = {
                let mut state = self.inner.state.lock();
                state.delayed_is_running_generation += 1;
                state.delayed_is_running_generation
            };
            let debounce_ms = self.settings().delayed_is_running_debounce_ms;
            let me = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(debounce_ms)).await;
                me.inner.dispatcher.post(async move {
                    me.finish_delayed_is_running(generation).await;
                });
            });
        } else {
            let was_true = {
                let mut state = self.inner.state.lock();
                state.delayed_is_running_generation += 1;
                let was_true = state.delayed_is_running;
                state.delayed_is_running = false;
                was_true
            };
            if was_true {
                self.emit(ManagerEvent::DelayedIsRunningChanged { is_running: false });
            }
        }
    }

    /// Runs on the dispatcher after the debounce window; validates the
    /// generation is still current before emitting (spec §4.7, §9).
    pub(crate) async fn finish_delayed_is_running(&self, generation: u64) {
        Dispatcher::verify_access();
        let should_emit = {
            let mut state = self.inner.state.lock();
            if state.delayed_is_running_generation == generation && state.is_running == IsRunning::True && !state.delayed_is_running {
                state.delayed_is_running = true;
                true
            } else {
                false
            }
        };
        if should_emit {
            self.emit(ManagerEvent::DelayedIsRunningChanged { is_running: true });
        }
    }

    async fn apply_bridge_side_effects(&self, runtime_id: &RuntimeId, message: &EngineMessage) {
        match message {
            EngineMessage::ModuleLoad { modules, .. } => self.inner.bridge.add_for_modules(runtime_id, modules).await,
            EngineMessage::ModuleUnload { modules, .. } => self.inner.bridge.remove_for_modules(runtime_id, modules).await,
            _ => {}
        }
    }
}

/// Stash `exception` only if the engine is not already holding one
/// (spec §9 Open Question: "guard tag-removal against a missing
/// record" generalized to exception stashing too).
pub(crate) fn stash_exception(state: &mut crate::state::ManagerState, engine_id: &EngineId, exception: ExceptionInfo) {
    if let Some(record) = state.engines.find_mut(engine_id) {
        if record.exception.is_none() {
            record.exception = Some(exception);
        }
    }
}

fn conditional_break_event(pid: ProcessId, runtime_id: &RuntimeId, message: &EngineMessage) -> Option<ManagerEvent> {
    match message {
        EngineMessage::EntryPointBreak { .. } => Some(ManagerEvent::EntryPointBreak { process: pid }),
        EngineMessage::ProgramMessage { text, .. } => Some(ManagerEvent::ProgramMessage { process: pid, text: text.clone() }),
        EngineMessage::Breakpoint { thread, .. } => Some(ManagerEvent::BreakpointHit { process: pid, thread: thread.clone() }),
        EngineMessage::ProgramBreak { .. } => Some(ManagerEvent::ProgramBreak { process: pid }),
        EngineMessage::SetIpComplete { .. } => Some(ManagerEvent::SetIpComplete { process: pid }),
        EngineMessage::AppDomainLoad { id, .. } => Some(ManagerEvent::AppDomainLoaded { runtime: runtime_id.clone(), app_domain: id.clone() }),
        EngineMessage::AppDomainUnload { id, .. } => Some(ManagerEvent::AppDomainUnloaded { runtime: runtime_id.clone(), app_domain: id.clone() }),
        EngineMessage::ModuleLoad { modules, .. } => Some(ManagerEvent::ModuleLoaded { runtime: runtime_id.clone(), modules: modules.clone() }),
        EngineMessage::ModuleUnload { modules, .. } => Some(ManagerEvent::ModuleUnloaded { runtime: runtime_id.clone(), modules: modules.clone() }),
        EngineMessage::ThreadLoad { thread, .. } => Some(ManagerEvent::ThreadLoaded { runtime: runtime_id.clone(), thread: thread.clone() }),
        EngineMessage::ThreadUnload { thread, .. } => Some(ManagerEvent::ThreadUnloaded { runtime: runtime_id.clone(), thread: thread.clone() }),
        EngineMessage::ExceptionThrown { exception, .. } => Some(ManagerEvent::ExceptionThrown { process: pid, exception: exception.clone() }),
        EngineMessage::Connected { .. } | EngineMessage::Disconnected | EngineMessage::Break { .. } => None,
    }
}

fn conditional_break_thread(message: &EngineMessage) -> Option<ThreadId> {
    match message {
        EngineMessage::Breakpoint { thread, .. } => thread.clone(),
        _ => None,
    }
}

#[cfg(test)]
#[path = "pump_tests.rs"]
mod tests;
