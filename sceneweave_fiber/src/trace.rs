// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Operation tracing.
//!
//! Every host operation, render request, lifecycle hook and destroy
//! primitive is reported to a [`TraceSink`] as a [`HostEvent`]. Both sink
//! methods default to no-ops. [`NoopSink`] is what a session starts with;
//! [`OpLog`] records events for later inspection and is cheap to clone, so a
//! test can keep one handle while the session owns the other.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink` so instrumentation sites
//! pay a single `Option` branch when nothing listens.

use std::cell::RefCell;
use std::rc::Rc;

use sceneweave_core::node::NodeId;

use crate::error::HookKind;
use crate::kind::Kind;

/// One traced operation.
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    /// A node was created.
    CreateInstance {
        /// The new node.
        node: NodeId,
        /// Its kind.
        kind: Kind,
    },
    /// A child was appended to a parent that is still being built.
    AppendInitialChild {
        /// The parent.
        parent: NodeId,
        /// The child.
        child: NodeId,
    },
    /// A node finished receiving its initial children.
    FinalizeInitialChildren {
        /// The node.
        node: NodeId,
        /// Whether it asked for a mount pass.
        needs_mount: bool,
    },
    /// Props were diffed for an update.
    PrepareUpdate {
        /// The node.
        node: NodeId,
        /// Changed keys.
        keys: Vec<String>,
    },
    /// A commit is about to start.
    PrepareForCommit {
        /// The root container.
        container: NodeId,
    },
    /// A child was appended to a parent.
    AppendChild {
        /// The parent.
        parent: NodeId,
        /// The child.
        child: NodeId,
    },
    /// A child was appended to a root container.
    AppendChildToContainer {
        /// The container.
        container: NodeId,
        /// The child.
        child: NodeId,
    },
    /// A child was inserted before a sibling.
    InsertBefore {
        /// The parent.
        parent: NodeId,
        /// The child.
        child: NodeId,
        /// The sibling it now precedes.
        before: NodeId,
    },
    /// A child was inserted before a sibling in a root container.
    InsertInContainerBefore {
        /// The container.
        container: NodeId,
        /// The child.
        child: NodeId,
        /// The sibling it now precedes.
        before: NodeId,
    },
    /// A child was removed from a parent.
    RemoveChild {
        /// The parent.
        parent: NodeId,
        /// The child.
        child: NodeId,
    },
    /// A child was removed from a root container.
    RemoveChildFromContainer {
        /// The container.
        container: NodeId,
        /// The child.
        child: NodeId,
    },
    /// Changed props were applied to a node.
    CommitUpdate {
        /// The node.
        node: NodeId,
        /// Applied keys.
        keys: Vec<String>,
    },
    /// The mount pass ran for a node.
    CommitMount {
        /// The node.
        node: NodeId,
    },
    /// A node was hidden while its suspense boundary shows a fallback.
    HideInstance {
        /// The node.
        node: NodeId,
    },
    /// A hidden node was shown again.
    UnhideInstance {
        /// The node.
        node: NodeId,
    },
    /// A commit finished.
    ResetAfterCommit {
        /// The root container.
        container: NodeId,
    },
    /// A render request was emitted.
    RenderRequested {
        /// The container it was emitted on.
        container: NodeId,
    },
    /// A lifecycle hook ran.
    Hook {
        /// The node.
        node: NodeId,
        /// Which hook.
        hook: HookKind,
    },
    /// A node went through the scene graph's destroy primitive.
    Destroy {
        /// The node.
        node: NodeId,
        /// Whether its subtree went with it.
        children: bool,
    },
    /// A node created by an abandoned render pass was released.
    DiscardInstance {
        /// The node.
        node: NodeId,
    },
}

impl HostEvent {
    /// Returns the operation name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateInstance { .. } => "createInstance",
            Self::AppendInitialChild { .. } => "appendInitialChild",
            Self::FinalizeInitialChildren { .. } => "finalizeInitialChildren",
            Self::PrepareUpdate { .. } => "prepareUpdate",
            Self::PrepareForCommit { .. } => "prepareForCommit",
            Self::AppendChild { .. } => "appendChild",
            Self::AppendChildToContainer { .. } => "appendChildToContainer",
            Self::InsertBefore { .. } => "insertBefore",
            Self::InsertInContainerBefore { .. } => "insertInContainerBefore",
            Self::RemoveChild { .. } => "removeChild",
            Self::RemoveChildFromContainer { .. } => "removeChildFromContainer",
            Self::CommitUpdate { .. } => "commitUpdate",
            Self::CommitMount { .. } => "commitMount",
            Self::HideInstance { .. } => "hideInstance",
            Self::UnhideInstance { .. } => "unhideInstance",
            Self::ResetAfterCommit { .. } => "resetAfterCommit",
            Self::RenderRequested { .. } => "renderRequested",
            Self::Hook { .. } => "hook",
            Self::Destroy { .. } => "destroy",
            Self::DiscardInstance { .. } => "discardInstance",
        }
    }
}

/// Counts of what one commit did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// The root container.
    pub container: Option<NodeId>,
    /// Subtrees removed.
    pub deletions: usize,
    /// Nodes attached or moved.
    pub placements: usize,
    /// Nodes updated.
    pub updates: usize,
    /// Mount hooks run.
    pub mounts: usize,
    /// Render requests emitted.
    pub render_requests: usize,
}

/// Receives trace events.
pub trait TraceSink {
    /// Called for every traced operation.
    fn on_event(&mut self, _event: &HostEvent) {}

    /// Called once per finished commit.
    fn on_commit(&mut self, _summary: &CommitSummary) {}
}

/// A sink that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

/// A sink that records events and commit summaries.
#[derive(Clone, Debug, Default)]
pub struct OpLog {
    inner: Rc<RefCell<OpLogInner>>,
}

#[derive(Debug, Default)]
struct OpLogInner {
    events: Vec<HostEvent>,
    commits: Vec<CommitSummary>,
}

impl OpLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HostEvent> {
        self.inner.borrow().events.clone()
    }

    /// Returns a copy of the recorded commit summaries.
    #[must_use]
    pub fn commits(&self) -> Vec<CommitSummary> {
        self.inner.borrow().commits.clone()
    }

    /// Returns the recorded events with the given operation name.
    #[must_use]
    pub fn named(&self, name: &str) -> Vec<HostEvent> {
        self.inner
            .borrow()
            .events
            .iter()
            .filter(|e| e.name() == name)
            .cloned()
            .collect()
    }

    /// Returns how many recorded events have the given operation name.
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.inner
            .borrow()
            .events
            .iter()
            .filter(|e| e.name() == name)
            .count()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.events.clear();
        inner.commits.clear();
    }
}

impl TraceSink for OpLog {
    fn on_event(&mut self, event: &HostEvent) {
        self.inner.borrow_mut().events.push(event.clone());
    }

    fn on_commit(&mut self, summary: &CommitSummary) {
        self.inner.borrow_mut().commits.push(*summary);
    }
}

/// Dispatches to an optional sink.
pub struct Tracer<'a> {
    sink: Option<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer")
            .field("active", &self.sink.is_some())
            .finish()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer dispatching to `sink`.
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        Self { sink: Some(sink) }
    }

    /// Creates a tracer that drops everything.
    #[must_use]
    pub fn none() -> Self {
        Self { sink: None }
    }

    /// Reports an event.
    #[inline]
    pub fn event(&mut self, event: impl FnOnce() -> HostEvent) {
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.on_event(&event());
        }
    }

    /// Reports a finished commit.
    #[inline]
    pub fn commit(&mut self, summary: &CommitSummary) {
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.on_commit(summary);
        }
    }
}
