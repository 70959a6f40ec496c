//! Observers of outward [`ManagerEvent`]s (spec §6 "Events").
//!
//! `ManagerEvent` is broadcast immutably (unlike the inbound
//! [`dbgmgr_core::EngineMessage`], whose flags observers are allowed to
//! mutate before the pump decides on a pause). An observer that wants to
//! request a pause for the conditional-break family votes by returning
//! `true` from [`ManagerObserver::wants_pause`] instead (spec §4.5:
//! "raise the message first to observers, who may set `Pause`").

use dbgmgr_core::ManagerEvent;
use std::sync::Arc;

/// Something interested in the manager's outward event stream.
///
/// Implementations are invoked with no locks held (spec §5:
/// "External observers are invoked with no locks held"), so reentrant
/// calls back into the manager (Run, Break, Close) are safe.
pub trait ManagerObserver: Send + Sync {
    fn on_event(&self, event: &ManagerEvent);

    /// Vote to pause for a conditional-break family event, or for the
    /// `RuntimeCreated` raised on `Connected` (spec §4.5: "any observer
    /// asked to pause" is one of the four `pauseProgram` OR-terms at both
    /// sites). Defaults to no vote.
    fn wants_pause(&self, _event: &ManagerEvent) -> bool {
        false
    }
}

/// The set of subscribed observers, notified in subscription order.
#[derive(Default, Clone)]
pub(crate) struct ObserverList {
    observers: Vec<Arc<dyn ManagerObserver>>,
}

impl ObserverList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn subscribe(&mut self, observer: Arc<dyn ManagerObserver>) {
        self.observers.push(observer);
    }

    pub(crate) fn notify(&self, event: &ManagerEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }

    /// Whether any observer voted to pause for `event` (spec §4.5).
    pub(crate) fn poll_pause(&self, event: &ManagerEvent) -> bool {
        self.observers.iter().any(|o| o.wants_pause(event))
    }
}

#[cfg(test)]
#[path = "observer_tests.rs"]
mod tests;
