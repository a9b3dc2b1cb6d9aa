// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame evaluation and change tracking.
//!
//! Evaluation drains each dirty channel in turn:
//!
//! 1. **TRANSFORM**: recompute `world_transform` as
//!    `parent_world * local_transform`.
//! 2. **APPEARANCE**: recompute `effective_alpha` as
//!    `parent_effective * alpha` and `effective_visible` as
//!    `parent_visible && visible`, recording visibility transitions.
//! 3. **CONTENT**: collect only; presenters read content directly.
//! 4. **TOPOLOGY**: consume (the traversal order was already rebuilt).
//!
//! [`SceneChanges`] carries raw slot indices so presenters can use the
//! `*_at()` accessors without generation checks.

use alloc::vec::Vec;

use kurbo::Affine;

use super::id::INVALID;
use super::store::SceneGraph;
use crate::dirty;

/// The set of changes produced by a single [`SceneGraph::evaluate`] call.
#[derive(Clone, Debug, Default)]
pub struct SceneChanges {
    /// Nodes whose world transform was recomputed.
    pub transforms: Vec<u32>,
    /// Nodes whose effective alpha or visibility was recomputed.
    pub appearance: Vec<u32>,
    /// Nodes whose content or attributes changed.
    pub content: Vec<u32>,
    /// Nodes that became effectively invisible.
    pub hidden: Vec<u32>,
    /// Nodes that became effectively visible again.
    pub shown: Vec<u32>,
    /// Nodes created since the last evaluate.
    pub added: Vec<u32>,
    /// Nodes destroyed since the last evaluate.
    pub removed: Vec<u32>,
    /// Whether the tree topology changed (traversal order was rebuilt).
    pub topology_changed: bool,
}

impl SceneChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.appearance.clear();
        self.content.clear();
        self.hidden.clear();
        self.shown.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
            && self.appearance.is_empty()
            && self.content.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

impl SceneGraph {
    /// Evaluates the scene, recomputing dirty properties and returning the
    /// set of changes.
    pub fn evaluate(&mut self) -> SceneChanges {
        let mut changes = SceneChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer.
    pub fn evaluate_into(&mut self, changes: &mut SceneChanges) {
        changes.clear();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        let dirty_transforms: Vec<u32> = self
            .dirty
            .drain(dirty::TRANSFORM)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_transforms {
            let parent_idx = self.parent[idx as usize];
            let parent_world = if parent_idx != INVALID {
                self.world_transform[parent_idx as usize]
            } else {
                Affine::IDENTITY
            };
            self.world_transform[idx as usize] =
                parent_world * self.local[idx as usize].transform();
        }
        changes.transforms = dirty_transforms;

        let dirty_appearance: Vec<u32> = self
            .dirty
            .drain(dirty::APPEARANCE)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_appearance {
            let parent_idx = self.parent[idx as usize];
            let (parent_alpha, parent_visible) = if parent_idx != INVALID {
                (
                    self.effective_alpha[parent_idx as usize],
                    self.effective_visible[parent_idx as usize],
                )
            } else {
                (1.0, true)
            };
            let local = &self.local[idx as usize];
            self.effective_alpha[idx as usize] = parent_alpha * local.alpha;

            let visible = parent_visible && local.visible;
            if visible != self.effective_visible[idx as usize] {
                if visible {
                    changes.shown.push(idx);
                } else {
                    changes.hidden.push(idx);
                }
                self.effective_visible[idx as usize] = visible;
            }
        }
        changes.appearance = dirty_appearance;

        changes.content = self
            .dirty
            .drain(dirty::CONTENT)
            .deterministic()
            .run()
            .collect();

        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }

    /// Returns the current paint order (depth-first pre-order).
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                self.dfs_collect(idx);
            }
        }
    }

    fn dfs_collect(&mut self, idx: u32) {
        self.traversal_order.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.dfs_collect(child);
            child = self.next_sibling[child as usize];
        }
    }
}
