// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dbgmgr-manager: the coordination core (spec.md §1).
//!
//! Owns the dispatcher, the engine/process registries, the message
//! pump, the run/break/restart controllers, the derived-state tracker,
//! the bound-breakpoint bridge hook, and the object close queue. The
//! public entry point is [`DebugManager`]; everything else in this
//! crate is either a piece of its private state or a trait a host
//! implements to plug in the bound-breakpoint binder.

mod breakpoint_bridge;
mod close_queue;
mod controller;
mod dispatcher;
mod helpers;
mod manager;
mod observer;
mod process_registry;
mod pump;
mod registry;
mod state;

pub use breakpoint_bridge::{BoundBreakpointBridge, NoOpBridge};
pub use close_queue::{CloseableObject, ObjectCloseQueue};
pub use manager::{DebugManager, StartListener};
pub use observer::ManagerObserver;
pub use registry::EngineHandle;

#[cfg(any(test, feature = "test-support"))]
pub use dispatcher::Dispatcher;
