//! Run/Break/Restart controllers (spec §4.6) and the helper state
//! machines' pure mutation points. Public methods here are facade entry
//! points: they may freely `.await` a helper's completion oneshot,
//! since they are only ever called from outside the dispatcher (never
//! from [`crate::pump`]).

use crate::helpers::{BreakAllHelper, StopDebuggingHelper};
use crate::manager::DebugManager;
use crate::registry::EngineHandle;
use crate::state::ManagerState;
use dbgmgr_core::{EngineId, EngineState, ManagerError, ProcessId, StartKind};
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::oneshot;

const RESTART_STOP_TIMEOUT: Duration = Duration::from_secs(5);

impl DebugManager {
    /// `runAll()` (spec §4.6): resume every `Paused` engine.
    pub async fn run_all(&self) {
        let engines = self.engines_for(None);
        self.run_engines(engines).await;
    }

    /// `run(process)` (spec §4.6). Upgraded to [`Self::run_all`] whole-sale
    /// when `BreakAllProcesses` is set.
    pub async fn run(&self, process: ProcessId) {
        if self.settings().break_all_processes {
            self.run_all().await;
            return;
        }
        let engines = self.engines_for(Some(process));
        self.run_engines(engines).await;
    }

    pub(crate) fn engines_for(&self, process: Option<ProcessId>) -> Vec<EngineId> {
        let state = self.inner.state.lock();
        state
            .engines
            .iter()
            .filter(|e| e.state == EngineState::Paused)
            .filter(|e| process.map_or(true, |p| e.process == Some(p)))
            .map(|e| e.id.clone())
            .collect()
    }

    /// Aborts the whole batch (no partial resume) if a `BreakAll` fence
    /// is active at entry (spec §4.6).
    async fn run_engines(&self, engines: Vec<EngineId>) {
        if self.inner.state.lock().break_all.is_some() {
            return;
        }
        for engine_id in engines {
            let pid = self.inner.state.lock().engines.find(&engine_id).and_then(|r| r.process);
            if let Some(pid) = pid {
                self.finalize_resumed(engine_id, pid).await;
            }
        }
    }

    /// `break(process)` (spec §4.6): request a pause for every `Running`
    /// engine targeting `process`. Named with a raw identifier since
    /// `break` is reserved.
    pub async fn r#break(&self, process: ProcessId) {
        let engines: Vec<EngineHandle> = {
            let state = self.inner.state.lock();
            state
                .engines
                .iter()
                .filter(|e| e.process == Some(process) && e.state == EngineState::Running)
                .map(|e| e.engine.clone())
                .collect()
        };
        for engine in engines {
            engine.r#break().await;
        }
    }

    /// `detach(process)` (spec §4.6): per-engine detach for records
    /// targeting `process`.
    pub async fn detach(&self, process: ProcessId) {
        for engine in self.engines_for_process(process) {
            engine.detach().await;
        }
    }

    /// `terminate(process)` (spec §4.6).
    pub async fn terminate(&self, process: ProcessId) {
        for engine in self.engines_for_process(process) {
            engine.terminate().await;
        }
    }

    /// `detachAll()` (spec §6).
    pub async fn detach_all(&self) {
        for engine in self.all_engines() {
            engine.detach().await;
        }
    }

    /// `terminateAll()` (spec §6).
    pub async fn terminate_all(&self) {
        for engine in self.all_engines() {
            engine.terminate().await;
        }
    }

    /// `stopDebuggingAll()` (spec §4.6): per engine, detach if
    /// `process.shouldDetach ?? (startKind == Attach)`, else terminate.
    pub async fn stop_debugging_all(&self) {
        for (engine, should_detach) in self.stop_debugging_decisions() {
            if should_detach {
                engine.detach().await;
            } else {
                engine.terminate().await;
            }
        }
    }

    /// `canDetachWithoutTerminating()` (spec §6): conjunction of
    /// `canDetach` over every attached engine.
    pub fn can_detach_without_terminating(&self) -> bool {
        self.inner.state.lock().engines.iter().all(|e| e.engine.can_detach())
    }

    /// `breakAll()` (spec §4.6). At most one `BreakAllHelper` exists at a
    /// time; a call arriving while one is already active just joins its
    /// waiter list instead of re-issuing `break()` to already-targeted
    /// engines.
    pub async fn break_all(&self) {
        let mut freshly_targeted = Vec::new();
        let rx = {
            let mut state = self.inner.state.lock();
            if state.break_all.is_none() {
                freshly_targeted = begin_break_all(&mut state);
            }
            state.break_all.as_mut().map(|helper| {
                let (tx, rx) = oneshot::channel();
                helper.add_waiter(tx);
                rx
            })
        };

        for (_, engine) in &freshly_targeted {
            engine.r#break().await;
        }

        if let Some(rx) = rx {
            let _ = rx.await;
        }
    }

    /// `restart()` (spec §4.6). Valid only with no `BreakAll` or
    /// `StopDebugging` fence active and a non-empty restart snapshot.
    /// Stops every engine, then posts (rather than calls inline) a
    /// `start()` per snapshot, so the restart doesn't reenter
    /// `ProcessesChanged` emission from inside this call.
    pub async fn restart(&self) -> Result<(), ManagerError> {
        let (snapshot, rx, targets) = {
            let mut state = self.inner.state.lock();
            if state.break_all.is_some() {
                return Err(ManagerError::RestartNotAllowed("a break-all fence is active"));
            }
            if state.stop_debugging.is_some() {
                return Err(ManagerError::RestartNotAllowed("a stop-debugging fence is already active"));
            }
            if state.restart_options.is_empty() {
                return Err(ManagerError::RestartNotAllowed("no restart options recorded"));
            }

            let snapshot = state.restart_options.clone();
            let targets: Vec<(EngineId, EngineHandle, bool)> = state
                .engines
                .iter()
                .map(|e| {
                    let should_detach = e
                        .process
                        .and_then(|pid| state.processes.get(&pid))
                        .map(|p| p.should_detach)
                        .unwrap_or(e.start_kind == StartKind::Attach);
                    (e.id.clone(), e.engine.clone(), should_detach)
                })
                .collect();

            let rx = if targets.is_empty() {
                None
            } else {
                let pending: HashSet<EngineId> = targets.iter().map(|(id, _, _)| id.clone()).collect();
                let mut helper = StopDebuggingHelper::new(pending);
                let (tx, rx) = oneshot::channel();
                helper.add_waiter(tx);
                state.stop_debugging = Some(helper);
                Some(rx)
            };
            (snapshot, rx, targets)
        };

        for (_, engine, should_detach) in &targets {
            if *should_detach {
                engine.detach().await;
            } else {
                engine.terminate().await;
            }
        }

        if let Some(rx) = rx {
            if tokio::time::timeout(RESTART_STOP_TIMEOUT, rx).await.is_err() {
                self.inner.state.lock().stop_debugging = None;
                self.write_message(dbgmgr_core::UserMessageKind::Error, "restart: stop-debugging timed out");
                return Err(ManagerError::RestartTimedOut);
            }
        }

        let me = self.clone();
        self.inner.dispatcher.post(async move {
            for options in snapshot {
                let _ = me.start(options).await;
            }
        });

        Ok(())
    }

    fn engines_for_process(&self, process: ProcessId) -> Vec<EngineHandle> {
        self.inner
            .state
            .lock()
            .engines
            .iter()
            .filter(|e| e.process == Some(process))
            .map(|e| e.engine.clone())
            .collect()
    }

    fn all_engines(&self) -> Vec<EngineHandle> {
        self.inner.state.lock().engines.iter().map(|e| e.engine.clone()).collect()
    }

    fn stop_debugging_decisions(&self) -> Vec<(EngineHandle, bool)> {
        let state = self.inner.state.lock();
        state
            .engines
            .iter()
            .map(|e| {
                let should_detach = e
                    .process
                    .and_then(|pid| state.processes.get(&pid))
                    .map(|p| p.should_detach)
                    .unwrap_or(e.start_kind == StartKind::Attach);
                (e.engine.clone(), should_detach)
            })
            .collect()
    }
}

/// Target every `Running` engine for a break fence, installing a
/// [`BreakAllHelper`] only if one isn't already active and there is
/// something to track (spec §4.6, §9 "helper state machines").
pub(crate) fn begin_break_all(state: &mut ManagerState) -> Vec<(EngineId, EngineHandle)> {
    let targets: Vec<(EngineId, EngineHandle)> = state
        .engines
        .iter()
        .filter(|e| e.state == EngineState::Running)
        .map(|e| (e.id.clone(), e.engine.clone()))
        .collect();
    if state.break_all.is_none() && !targets.is_empty() {
        let pending = targets.iter().map(|(id, _)| id.clone()).collect();
        state.break_all = Some(BreakAllHelper::new(pending));
    }
    targets
}

/// Notify the active `BreakAllHelper`, if any, that `engine_id` settled
/// (paused or disconnected), finishing and clearing it once every
/// target has reported.
pub(crate) fn settle_break_all(state: &mut ManagerState, engine_id: &EngineId) {
    if let Some(helper) = state.break_all.as_mut() {
        if helper.mark_settled(engine_id) {
            if let Some(helper) = state.break_all.take() {
                helper.finish();
            }
        }
    }
}

/// As [`settle_break_all`], for the `StopDebuggingHelper` driving a
/// `restart()`.
pub(crate) fn settle_stop_debugging(state: &mut ManagerState, engine_id: &EngineId) {
    if let Some(helper) = state.stop_debugging.as_mut() {
        if helper.mark_settled(engine_id) {
            if let Some(helper) = state.stop_debugging.take() {
                helper.finish();
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
