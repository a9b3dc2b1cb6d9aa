// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node handles.

use core::fmt;

/// Link value meaning "no node" in the parent and sibling columns.
pub const INVALID: u32 = u32::MAX;

/// Generational handle to a scene node.
///
/// A slot of the [`SceneGraph`](super::SceneGraph) is reused once its node
/// is destroyed; the generation tells the new occupant apart from handles to
/// the old one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self { idx, generation }
    }

    /// Slot index, stable while the node is alive.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Times the slot had been reused when this node was created.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "NodeId(#{})", self.idx)
        } else {
            write!(f, "NodeId(#{}v{})", self.idx, self.generation)
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reused_slots_compare_unequal() {
        let first = NodeId::new(3, 0);
        let reused = NodeId::new(3, 1);
        assert_ne!(first, reused);
        assert_eq!(alloc::format!("{first}"), alloc::format!("{reused}"));
        assert_eq!(alloc::format!("{reused:?}"), "NodeId(#3v1)");
    }
}
