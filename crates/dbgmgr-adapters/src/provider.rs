//! The engine-provider contract (spec §6 "Engine-provider contract").

use crate::engine::{DebugEngine, EngineError};
use async_trait::async_trait;
use dbgmgr_core::StartOptions;
use std::sync::Arc;

/// Constructs engines for a given `start()` call.
///
/// Providers are walked in ascending [`priority`](EngineProvider::priority)
/// order (spec §4.4 step 3: "ascending metadata-order"); the first to
/// return `Some` wins.
#[async_trait]
pub trait EngineProvider: Send + Sync + 'static {
    fn priority(&self) -> i32;

    /// Attempt to construct an engine for `options`. Returning `Ok(None)`
    /// means "not applicable, try the next provider" — distinct from
    /// `Err`, which means this provider was responsible for `options` but
    /// failed to construct the engine (spec §7 "Engine construction
    /// failure").
    async fn create(&self, options: &StartOptions) -> Result<Option<Arc<dyn DebugEngine>>, EngineError>;
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
