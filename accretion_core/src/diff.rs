// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-channel memory of what was published last tick.
//!
//! Three granularities exist, matching what the conversion side can promise
//! about its ids:
//!
//! - [`IdSetState`]: the exact set of [`MarkerKey`]s published. Used when
//!   ids are stable per model entity, so a set difference yields the minimal
//!   retirements.
//! - [`CountState`]: only how many primitives went out. Used when ids are
//!   positional (`0..n`) and carry no identity across ticks.
//! - [`PresenceState`]: only whether anything went out. Used when the source
//!   exposes an emptiness predicate but no per-element ids.
//!
//! # Invariant
//!
//! After a tick commits, the state equals exactly what that tick published.
//! A superset leaks ghost primitives that are never deleted; a subset deletes
//! live ones. States are owned by a single synchronizer and are only mutated
//! after its publish decision for the tick has been made.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::ops::Range;

use crate::marker::MarkerKey;

/// The set of keys published on a channel's previous tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdSetState {
    previous: BTreeSet<MarkerKey>,
}

impl IdSetState {
    /// Creates an empty state (nothing published yet).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if nothing is currently published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.previous.is_empty()
    }

    /// Returns the keys published last tick.
    #[must_use]
    pub fn keys(&self) -> &BTreeSet<MarkerKey> {
        &self.previous
    }

    /// Returns the keys that were published but are absent from `current`,
    /// in key order, without modifying the state.
    #[must_use]
    pub fn removed(&self, current: &BTreeSet<MarkerKey>) -> Vec<MarkerKey> {
        self.previous.difference(current).cloned().collect()
    }

    /// Commits `current` as the published set and returns the retired keys.
    pub fn retire(&mut self, current: BTreeSet<MarkerKey>) -> Vec<MarkerKey> {
        let removed = self.removed(&current);
        self.previous = current;
        removed
    }

    /// Forgets everything and returns what was published.
    pub fn take(&mut self) -> BTreeSet<MarkerKey> {
        core::mem::take(&mut self.previous)
    }
}

/// How many positional primitives a channel published last tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountState {
    previous: u64,
}

impl CountState {
    /// Creates a state with no previous primitives.
    #[must_use]
    pub const fn new() -> Self {
        Self { previous: 0 }
    }

    /// Returns the previous count.
    #[must_use]
    pub const fn previous(&self) -> u64 {
        self.previous
    }

    /// Stores `current` and returns the id range `[0, previous)` to delete.
    ///
    /// The replacement is unconditional: positional ids say nothing about
    /// which primitive survived, so everything from last tick is retired.
    pub fn replace(&mut self, current: u64) -> Range<u64> {
        let range = 0..self.previous;
        self.previous = current;
        range
    }
}

/// Whether a channel currently has anything published.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PresenceState {
    published: bool,
}

impl PresenceState {
    /// Creates a state with nothing published.
    #[must_use]
    pub const fn new() -> Self {
        Self { published: false }
    }

    /// Returns `true` if the channel currently shows something.
    #[must_use]
    pub const fn is_published(&self) -> bool {
        self.published
    }

    /// Records a content publish.
    pub fn mark_published(&mut self) {
        self.published = true;
    }

    /// Records a clear. Returns whether anything was published before.
    pub fn clear(&mut self) -> bool {
        core::mem::replace(&mut self.published, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::PrimitiveId;

    fn keys(ids: &[u64]) -> BTreeSet<MarkerKey> {
        ids.iter()
            .map(|&id| MarkerKey::new("ns", PrimitiveId(id)))
            .collect()
    }

    #[test]
    fn retire_returns_only_missing_keys() {
        let mut state = IdSetState::new();
        assert!(state.retire(keys(&[1, 2, 3])).is_empty());

        let removed = state.retire(keys(&[2, 3, 4]));
        assert_eq!(removed, [MarkerKey::new("ns", PrimitiveId(1))]);
        assert_eq!(state.keys(), &keys(&[2, 3, 4]));
    }

    #[test]
    fn same_id_in_other_namespace_is_distinct() {
        let mut state = IdSetState::new();
        let mut first = keys(&[1]);
        first.insert(MarkerKey::new("other", PrimitiveId(1)));
        let _ = state.retire(first);

        let removed = state.retire(keys(&[1]));
        assert_eq!(removed, [MarkerKey::new("other", PrimitiveId(1))]);
    }

    #[test]
    fn take_empties_state() {
        let mut state = IdSetState::new();
        let _ = state.retire(keys(&[5, 6]));
        assert_eq!(state.take(), keys(&[5, 6]));
        assert!(state.is_empty());
    }

    #[test]
    fn count_replace_retires_everything_previous() {
        let mut state = CountState::new();
        assert_eq!(state.replace(3), 0..0);
        assert_eq!(state.replace(3), 0..3);
        assert_eq!(state.replace(0), 0..3);
        assert_eq!(state.replace(2), 0..0);
        assert_eq!(state.previous(), 2);
    }

    #[test]
    fn presence_clear_reports_previous_flag() {
        let mut state = PresenceState::new();
        assert!(!state.clear());
        state.mark_published();
        assert!(state.is_published());
        assert!(state.clear());
        assert!(!state.is_published());
    }
}
