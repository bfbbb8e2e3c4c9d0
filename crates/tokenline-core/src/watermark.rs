//! Cumulative-counter watermarks.
//!
//! Claude Code reports running totals on every status line refresh. A
//! watermark remembers the last total seen per source so each new report
//! can be turned into the increment since the previous one.

use crate::TokenPair;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Last-seen cumulative counters, one watermark per source key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(
    serialize = "K: Serialize",
    deserialize = "K: Ord + Deserialize<'de>"
))]
pub struct Watermarks<K> {
    marks: BTreeMap<K, TokenPair>,
}

impl<K> Default for Watermarks<K> {
    fn default() -> Self {
        Self {
            marks: BTreeMap::new(),
        }
    }
}

impl<K: Ord> Watermarks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last cumulative counters seen for `key`, zero if never seen.
    pub fn get(&self, key: &K) -> TokenPair {
        self.marks.get(key).copied().unwrap_or_default()
    }

    /// Records a new cumulative observation and returns the increment.
    ///
    /// The increment is floored at zero per counter, and the watermark
    /// always moves to the observed value, even when it went backwards.
    pub fn advance(&mut self, key: K, cumulative: TokenPair) -> TokenPair {
        let prior = self.marks.insert(key, cumulative).unwrap_or_default();
        cumulative.saturating_delta(prior)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.marks.contains_key(key)
    }

    /// Keeps only the watermarks whose key satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        self.marks.retain(|key, _| keep(key));
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}
