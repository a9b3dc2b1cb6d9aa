// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Out-of-band bookkeeping for reconciler-managed nodes.

use hashbrown::HashMap;
use sceneweave_core::node::NodeId;

use crate::config::DestroyPolicy;
use crate::kind::Kind;
use crate::registry::LifecycleHooks;

/// What the renderer knows about one node it created.
#[derive(Clone, Debug)]
pub struct InstanceMeta {
    /// The kind tag assigned at creation. Never reassigned.
    pub kind: Kind,
    /// Lifecycle hooks, for custom kinds that declare any.
    pub hooks: Option<LifecycleHooks>,
    /// How the node is released on removal.
    pub destroy: DestroyPolicy,
    /// The root container the node renders into; render requests for the
    /// node are emitted there.
    pub root: NodeId,
}

/// Side table from node identity to [`InstanceMeta`].
#[derive(Debug, Default)]
pub struct InstanceTable {
    entries: HashMap<NodeId, InstanceMeta>,
}

impl InstanceTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, node: NodeId, meta: InstanceMeta) {
        self.entries.insert(node, meta);
    }

    pub(crate) fn remove(&mut self, node: NodeId) -> Option<InstanceMeta> {
        self.entries.remove(&node)
    }

    /// Returns the bookkeeping of `node`.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&InstanceMeta> {
        self.entries.get(&node)
    }

    pub(crate) fn get_mut(&mut self, node: NodeId) -> Option<&mut InstanceMeta> {
        self.entries.get_mut(&node)
    }

    /// Returns the kind tag of `node`.
    #[must_use]
    pub fn kind(&self, node: NodeId) -> Option<&Kind> {
        self.entries.get(&node).map(|meta| &meta.kind)
    }

    /// Returns the hooks of `node`, if it has any.
    #[must_use]
    pub fn hooks(&self, node: NodeId) -> Option<&LifecycleHooks> {
        self.entries.get(&node).and_then(|meta| meta.hooks.as_ref())
    }

    /// Returns the number of tracked nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no node is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
