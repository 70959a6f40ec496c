//! The tags multiset (spec §4.3).
//!
//! Tracks, per debug tag string, how many currently-registered engines
//! contribute it. `add`/`remove` report only the tags whose membership
//! actually flipped, so callers can raise `DebugTagsChanged` deltas
//! without recomputing the whole set.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A string label an engine contributes to the session, identifying a
/// capability or backend kind (spec GLOSSARY: DebugTag).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DebugTag(pub String);

impl DebugTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }
}

impl From<&str> for DebugTag {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for DebugTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference-counted set of debug tags.
#[derive(Debug, Default, Clone)]
pub struct TagMultiset {
    counts: HashMap<DebugTag, usize>,
}

impl TagMultiset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the given tags in. Returns the tags whose count transitioned
    /// 0 -> 1, in input order (stable for the same input, per spec §4.3).
    pub fn add(&mut self, tags: &[DebugTag]) -> Vec<DebugTag> {
        let mut added = Vec::new();
        for tag in tags {
            let count = self.counts.entry(tag.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                added.push(tag.clone());
            }
        }
        added
    }

    /// Fold the given tags out. Returns the tags whose count transitioned
    /// 1 -> 0, in input order.
    pub fn remove(&mut self, tags: &[DebugTag]) -> Vec<DebugTag> {
        let mut removed = Vec::new();
        for tag in tags {
            if let Some(count) = self.counts.get_mut(tag) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.counts.remove(tag);
                    removed.push(tag.clone());
                }
            }
        }
        removed
    }

    pub fn contains(&self, tag: &DebugTag) -> bool {
        self.counts.contains_key(tag)
    }

    pub fn count_of(&self, tag: &DebugTag) -> usize {
        self.counts.get(tag).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> Vec<DebugTag> {
        self.counts.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
#[path = "tags_tests.rs"]
mod tests;
