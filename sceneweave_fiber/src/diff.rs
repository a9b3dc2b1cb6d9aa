// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Prop diffing.
//!
//! [`diff`] compares two [`Props`] bags and returns the keys that changed as
//! a [`ChangeSet`]. The set is ordered: keys set or changed in the new bag
//! come first, in the new bag's order, followed by keys only the old bag
//! had, in the old bag's order.
//!
//! Values compare with [`PropValue::same_as`]. Point-like values compare
//! structurally, so against a point `[1, 1]`, `1`, `"1,1"` and
//! `{ x: 1, y: 1 }` are the same value and produce no record. A change in
//! one axis yields a single record for the whole key. NaN equals itself, so
//! a bag never differs from itself.

use crate::props::{PropValue, Props};

/// What happened to a key.
#[derive(Clone, Debug, PartialEq)]
pub enum Change {
    /// The key is set to a new value.
    Set(PropValue),
    /// The key disappeared; the consumer resets it to the kind's default.
    Removed,
}

impl Change {
    /// Returns the new value, or `None` for a removal.
    #[must_use]
    pub fn value(&self) -> Option<&PropValue> {
        match self {
            Self::Set(v) => Some(v),
            Self::Removed => None,
        }
    }
}

/// One changed key.
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeRecord {
    /// The property key.
    pub key: String,
    /// The new value or the removal marker.
    pub change: Change,
}

/// An ordered list of [`ChangeRecord`]s.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChangeSet {
    records: Vec<ChangeRecord>,
}

impl ChangeSet {
    /// Returns whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of changed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Iterates records in order.
    pub fn iter(&self) -> core::slice::Iter<'_, ChangeRecord> {
        self.records.iter()
    }

    /// Iterates the changed keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.key.as_str())
    }

    /// Returns the change recorded for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Change> {
        self.records
            .iter()
            .find_map(|r| (r.key == key).then_some(&r.change))
    }

    /// Returns the records as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[ChangeRecord] {
        &self.records
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a ChangeRecord;
    type IntoIter = core::slice::Iter<'a, ChangeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Computes the ordered list of changes turning `old` into `new`.
#[must_use]
pub fn diff(old: &Props, new: &Props) -> ChangeSet {
    let mut records = Vec::new();

    for (key, value) in new.iter() {
        if !old.get(key).is_some_and(|old| old.same_as(value)) {
            records.push(ChangeRecord {
                key: String::from(key),
                change: Change::Set(value.clone()),
            });
        }
    }

    for key in old.keys() {
        if !new.contains(key) {
            records.push(ChangeRecord {
                key: String::from(key),
                change: Change::Removed,
            });
        }
    }

    ChangeSet { records }
}
