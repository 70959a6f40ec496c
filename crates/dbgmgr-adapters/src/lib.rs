// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dbgmgr-adapters: the engine-side and engine-provider contracts.
//!
//! These traits are the boundary spec.md §1 calls "external
//! collaborators" — individual engine backends and their providers are
//! out of scope; only their observable interface lives here.

mod engine;
mod provider;

pub use engine::{DebugEngine, EngineError, EngineMessageSender};
pub use provider::EngineProvider;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{EngineCall, FakeEngine, FakeProvider};
