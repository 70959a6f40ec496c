//! Helper state machines: BreakAll and StopDebugging (spec §4.6, §9
//! "Helper state machines").
//!
//! Each tracks a set of engines it is waiting to settle and a list of
//! waiters to notify on completion. At most one of each exists at a
//! time, held as `Option<T>` on [`crate::state::ManagerState`] and
//! constructed only while the manager lock is held.

use dbgmgr_core::EngineId;
use std::collections::HashSet;
use tokio::sync::oneshot;

/// Tracks outstanding Break requests issued by `breakAll()` (spec §4.6).
///
/// Completes once every engine that was Running when the fence was
/// raised has reported Paused or disconnected. Unlike
/// [`StopDebuggingHelper`], BreakAll has no internal timeout (spec §5).
#[derive(Default)]
pub(crate) struct BreakAllHelper {
    pending: HashSet<EngineId>,
    waiters: Vec<oneshot::Sender<()>>,
}

impl BreakAllHelper {
    pub(crate) fn new(pending: HashSet<EngineId>) -> Self {
        Self {
            pending,
            waiters: Vec::new(),
        }
    }

    pub(crate) fn add_waiter(&mut self, waiter: oneshot::Sender<()>) {
        self.waiters.push(waiter);
    }

    /// Record that `engine` settled (Paused or disconnected). Returns
    /// `true` once every tracked engine has settled.
    pub(crate) fn mark_settled(&mut self, engine: &EngineId) -> bool {
        self.pending.remove(engine);
        self.pending.is_empty()
    }

    /// Wake every waiter. Consumes `self` since a completed fence is no
    /// longer the manager's active helper.
    pub(crate) fn finish(self) {
        for waiter in self.waiters {
            let _ = waiter.send(());
        }
    }
}

/// Drives engines toward disconnect for `restart()`/`stopDebuggingAll()`
/// (spec §4.6). The internal timeout (spec §5) is applied by the caller
/// wrapping the completion wait in `tokio::time::timeout`, not by this
/// struct.
#[derive(Default)]
pub(crate) struct StopDebuggingHelper {
    pending: HashSet<EngineId>,
    waiters: Vec<oneshot::Sender<()>>,
}

impl StopDebuggingHelper {
    pub(crate) fn new(pending: HashSet<EngineId>) -> Self {
        Self {
            pending,
            waiters: Vec::new(),
        }
    }

    pub(crate) fn add_waiter(&mut self, waiter: oneshot::Sender<()>) {
        self.waiters.push(waiter);
    }

    pub(crate) fn mark_settled(&mut self, engine: &EngineId) -> bool {
        self.pending.remove(engine);
        self.pending.is_empty()
    }

    pub(crate) fn finish(self) {
        for waiter in self.waiters {
            let _ = waiter.send(());
        }
    }
}

#[cfg(test)]
#[path = "helpers_tests.rs"]
mod tests;
