//! Start-option snapshots (spec §3 "Restart options", §4.4).

use crate::engine_record::{BreakKind, StartKind};
use serde::{Deserialize, Serialize};
use serde_json::Map;
use serde_json::Value;

/// The options passed to `start()`.
///
/// spec §4.4 treats these as opaque, clone-twice-before-use snapshots.
/// This expansion types them concretely as a `start_kind` plus a
/// free-form `params` map, rather than using reflection, since Rust has
/// no ambient "clone this unknown object" operation: `Clone` on a
/// concrete type is the idiomatic replacement for "defend against
/// mutating callers."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartOptions {
    pub start_kind: StartKind,
    /// Requests an initial pause at a distinguished event (spec §3
    /// "breakKind"), carried into the engine record at `startOnDbgThread`.
    #[serde(default)]
    pub break_kind: Option<BreakKind>,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl StartOptions {
    pub fn launch() -> Self {
        Self {
            start_kind: StartKind::Launch,
            break_kind: None,
            params: Map::new(),
        }
    }

    pub fn attach(pid: u32) -> Self {
        let mut params = Map::new();
        params.insert("pid".to_string(), Value::from(pid));
        Self {
            start_kind: StartKind::Attach,
            break_kind: None,
            params,
        }
    }

    /// Request an initial pause at `kind` (spec §3 "breakKind").
    pub fn with_break_kind(mut self, kind: BreakKind) -> Self {
        self.break_kind = Some(kind);
        self
    }
}

#[cfg(test)]
#[path = "start_options_tests.rs"]
mod tests;
