//! The bound-breakpoint bridge (spec §4.8).
//!
//! The binding logic itself (address resolution, symbol lookup) is an
//! external collaborator (spec §1); the manager only invokes its
//! lifecycle hooks at the points spec §4.8 names.

use async_trait::async_trait;
use dbgmgr_core::{ModuleId, RuntimeId};

#[async_trait]
pub trait BoundBreakpointBridge: Send + Sync {
    /// On engine `Connected`: initialize bindings for that engine's runtime.
    async fn initialize_for_runtime(&self, runtime: &RuntimeId);

    /// On engine `Disconnected`: remove all bindings for its runtime.
    async fn remove_for_runtime(&self, runtime: &RuntimeId);

    /// On module load: add bindings for the module set.
    async fn add_for_modules(&self, runtime: &RuntimeId, modules: &[ModuleId]);

    /// On module unload: remove bindings for the module set.
    async fn remove_for_modules(&self, runtime: &RuntimeId, modules: &[ModuleId]);

    /// On external module-refresh notification: re-add bindings for the
    /// listed modules.
    async fn refresh_modules(&self, runtime: &RuntimeId, modules: &[ModuleId]);
}

/// A bridge with no external binder attached.
///
/// Useful for hosts that have not wired up symbol resolution yet, and
/// for the manager's own tests, where binding side effects are
/// irrelevant to the coordination logic under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpBridge;

#[async_trait]
impl BoundBreakpointBridge for NoOpBridge {
    async fn initialize_for_runtime(&self, _runtime: &RuntimeId) {}
    async fn remove_for_runtime(&self, _runtime: &RuntimeId) {}
    async fn add_for_modules(&self, _runtime: &RuntimeId, _modules: &[ModuleId]) {}
    async fn remove_for_modules(&self, _runtime: &RuntimeId, _modules: &[ModuleId]) {}
    async fn refresh_modules(&self, _runtime: &RuntimeId, _modules: &[ModuleId]) {}
}

#[cfg(test)]
#[path = "breakpoint_bridge_tests.rs"]
mod tests;
