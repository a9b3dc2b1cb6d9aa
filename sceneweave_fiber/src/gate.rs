// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Load gates.
//!
//! A [`LoadGate`] marks a subtree whose content is not available yet. While
//! the gate is loading, rendering the subtree suspends: the nearest enclosing
//! suspense boundary shows its fallback instead. Every root that suspended on
//! the gate is subscribed to it; [`LoadGate::resolve`] moves the gate to ready
//! and schedules a fresh pass on each of those roots.
//!
//! ```text
//! Loading ──resolve──▶ Ready
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::root::RootState;

/// Shared `Loading → Ready` state of a subtree's content.
///
/// Clones share the same state.
#[derive(Clone, Default)]
pub struct LoadGate {
    inner: Rc<GateInner>,
}

#[derive(Default)]
struct GateInner {
    ready: Cell<bool>,
    waiting: RefCell<Vec<Weak<RootState>>>,
}

impl LoadGate {
    /// Creates a gate in the loading state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gate that is already ready.
    #[must_use]
    pub fn ready() -> Self {
        let gate = Self::default();
        gate.inner.ready.set(true);
        gate
    }

    /// Returns whether the content is available.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.ready.get()
    }

    /// Returns whether both handles share the same state.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Marks the content available and re-renders every root waiting on it.
    ///
    /// Resolving a ready gate does nothing.
    pub fn resolve(&self) {
        if self.inner.ready.replace(true) {
            return;
        }
        let waiting = core::mem::take(&mut *self.inner.waiting.borrow_mut());
        for root in waiting.iter().filter_map(Weak::upgrade) {
            RootState::wake(&root);
        }
    }

    /// Returns how many roots wait on this gate.
    #[must_use]
    pub fn waiting(&self) -> usize {
        self.inner
            .waiting
            .borrow()
            .iter()
            .filter(|root| root.strong_count() > 0)
            .count()
    }

    pub(crate) fn subscribe(&self, root: &Rc<RootState>) {
        let mut waiting = self.inner.waiting.borrow_mut();
        waiting.retain(|w| w.strong_count() > 0);
        let weak = Rc::downgrade(root);
        if !waiting.iter().any(|w| Weak::ptr_eq(w, &weak)) {
            waiting.push(weak);
        }
    }
}

impl fmt::Debug for LoadGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadGate")
            .field("ready", &self.is_ready())
            .field("waiting", &self.waiting())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let gate = LoadGate::new();
        let other = gate.clone();
        assert!(!other.is_ready());
        gate.resolve();
        assert!(other.is_ready());
        assert!(gate.ptr_eq(&other));
        assert!(!gate.ptr_eq(&LoadGate::ready()));
    }
}
