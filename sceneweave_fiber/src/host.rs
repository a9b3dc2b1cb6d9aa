// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host configuration.
//!
//! [`HostConfig`] is the contract between the [reconciler](crate::reconciler)
//! and the tree it drives. The reconciler decides *what* changes; the host
//! performs each change on its own node representation. [`SceneHost`] is the
//! host for a [`SceneGraph`](sceneweave_core::node::SceneGraph) owned by a
//! [`Stage`].
//!
//! ## Node lifetime
//!
//! ```text
//! Unattached ──attach──▶ Attached ──update──▶ Attached ──remove──▶ Detaching ──▶ Destroyed | Released
//! ```
//!
//! Nodes are built off-tree: [`create_instance`](HostConfig::create_instance)
//! makes a detached node, [`append_initial_child`](HostConfig::append_initial_child)
//! assembles a fresh subtree, and the subtree is attached to the live tree in
//! one step during the commit. Detaching always runs the `will_unmount` hooks
//! of the whole subtree, deepest nodes first, before any structural change.
//!
//! ## Render requests
//!
//! Every attach, insert, removal, hide/unhide and applied update records one
//! render request on the root container the node renders into.
//! [`reset_after_commit`](HostConfig::reset_after_commit) adds one more only
//! when the commit recorded none, so every commit is followed by at least one
//! request when [`RendererConfig::request_render_on_noop_commit`] is set.
//! Requests are collected, not delivered: the session hands them to render
//! loop subscribers once the stage is no longer borrowed.
//!
//! [`RendererConfig::request_render_on_noop_commit`]: crate::config::RendererConfig::request_render_on_noop_commit

use core::fmt;

use sceneweave_core::node::{DestroyOptions, NodeId};
use tracing::trace;

use crate::apply::apply_changes;
use crate::diff::{ChangeSet, diff};
use crate::error::{Error, HookKind, Result};
use crate::factory;
use crate::kind::KindName;
use crate::props::{PropValue, Props};
use crate::registry::MountTiming;
use crate::stage::Stage;
use crate::trace::{CommitSummary, HostEvent, TraceSink, Tracer};

/// Callbacks the reconciler issues against a host tree.
///
/// Callbacks run synchronously and never interleave. Structural callbacks
/// are issued in the exact order the reconciler computed them.
pub trait HostConfig {
    /// A node of the host tree.
    type Instance: Copy + Eq + fmt::Debug;
    /// A root container of the host tree.
    type Container: Copy + Eq + fmt::Debug;
    /// What [`prepare_update`](Self::prepare_update) hands to
    /// [`commit_update`](Self::commit_update).
    type UpdatePayload: Clone + fmt::Debug;
    /// Context passed from parents to children during creation.
    type HostContext: Clone + fmt::Debug;

    /// Creates a detached node.
    fn create_instance(
        &mut self,
        kind: &KindName,
        props: &Props,
        root: Self::Container,
        context: &Self::HostContext,
    ) -> Result<Self::Instance>;

    /// Creates a node for raw text.
    fn create_text_instance(
        &mut self,
        text: &str,
        root: Self::Container,
        context: &Self::HostContext,
    ) -> Result<Self::Instance>;

    /// Returns whether the children of a node are raw text content.
    fn should_set_text_content(&self, kind: &KindName, props: &Props) -> bool;

    /// Appends `child` to `parent` while `parent` is still off-tree.
    fn append_initial_child(&mut self, parent: Self::Instance, child: Self::Instance);

    /// Runs once a fresh node has all its initial children.
    ///
    /// Returns whether [`commit_mount`](Self::commit_mount) must run after the
    /// node is attached.
    fn finalize_initial_children(
        &mut self,
        instance: Self::Instance,
        kind: &KindName,
        props: &Props,
    ) -> Result<bool>;

    /// Computes the update of a node, or `None` when nothing changed.
    fn prepare_update(
        &mut self,
        instance: Self::Instance,
        kind: &KindName,
        old: &Props,
        new: &Props,
    ) -> Option<Self::UpdatePayload>;

    /// Returns the context for the top level of a root.
    fn get_root_host_context(&self, root: Self::Container) -> Self::HostContext;

    /// Returns the context for the children of a node of `kind`.
    fn get_child_host_context(
        &self,
        parent: &Self::HostContext,
        kind: &KindName,
    ) -> Self::HostContext;

    /// Returns the handle exposed to application code for a node.
    fn get_public_instance(&self, instance: Self::Instance) -> Self::Instance;

    /// Runs before the mutations of a commit.
    fn prepare_for_commit(&mut self, container: Self::Container);

    /// Runs after the mutations of a commit.
    fn reset_after_commit(&mut self, container: Self::Container);

    /// Appends `child` to an attached `parent`, moving it if needed.
    fn append_child(&mut self, parent: Self::Instance, child: Self::Instance);

    /// Appends `child` to a root container, moving it if needed.
    fn append_child_to_container(&mut self, container: Self::Container, child: Self::Instance);

    /// Inserts `child` before `before` in `parent`.
    fn insert_before(
        &mut self,
        parent: Self::Instance,
        child: Self::Instance,
        before: Self::Instance,
    );

    /// Inserts `child` before `before` in a root container.
    fn insert_in_container_before(
        &mut self,
        container: Self::Container,
        child: Self::Instance,
        before: Self::Instance,
    );

    /// Removes `child` and its subtree from `parent`.
    fn remove_child(&mut self, parent: Self::Instance, child: Self::Instance) -> Result<()>;

    /// Removes `child` and its subtree from a root container.
    fn remove_child_from_container(
        &mut self,
        container: Self::Container,
        child: Self::Instance,
    ) -> Result<()>;

    /// Applies an update computed by [`prepare_update`](Self::prepare_update).
    fn commit_update(
        &mut self,
        instance: Self::Instance,
        payload: Self::UpdatePayload,
        kind: &KindName,
        old: &Props,
        new: &Props,
    ) -> Result<()>;

    /// Runs post-attach setup for nodes that asked for it.
    fn commit_mount(&mut self, instance: Self::Instance, kind: &KindName, props: &Props)
    -> Result<()>;

    /// Hides a node while its suspense boundary shows a fallback.
    fn hide_instance(&mut self, instance: Self::Instance);

    /// Shows a node hidden by [`hide_instance`](Self::hide_instance).
    fn unhide_instance(&mut self, instance: Self::Instance, props: &Props);

    /// Releases a node created by a render pass that will not commit.
    fn discard_instance(&mut self, instance: Self::Instance);
}

/// Context threaded through node creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostContext {
    /// The root container being rendered into.
    pub root: NodeId,
    /// Host nesting depth below the root container.
    pub depth: usize,
}

/// [`HostConfig`] over the scene graph of a [`Stage`].
pub struct SceneHost<'a> {
    stage: &'a mut Stage,
    tracer: Tracer<'a>,
    requests: Vec<NodeId>,
    commit_signals: usize,
}

impl fmt::Debug for SceneHost<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneHost")
            .field("requests", &self.requests)
            .field("commit_signals", &self.commit_signals)
            .finish_non_exhaustive()
    }
}

impl<'a> SceneHost<'a> {
    /// Creates a host driving `stage` and reporting to `sink`.
    pub fn new(stage: &'a mut Stage, sink: &'a mut dyn TraceSink) -> Self {
        Self {
            stage,
            tracer: Tracer::new(sink),
            requests: Vec::new(),
            commit_signals: 0,
        }
    }

    /// Creates a host without tracing.
    pub fn untraced(stage: &'a mut Stage) -> Self {
        Self {
            stage,
            tracer: Tracer::none(),
            requests: Vec::new(),
            commit_signals: 0,
        }
    }

    /// Returns the stage.
    #[must_use]
    pub fn stage(&self) -> &Stage {
        self.stage
    }

    /// Returns the render requests recorded so far, in emission order.
    #[must_use]
    pub fn requests(&self) -> &[NodeId] {
        &self.requests
    }

    /// Reports a finished commit and returns the recorded render requests.
    pub fn finish(mut self, summary: Option<CommitSummary>) -> Vec<NodeId> {
        if let Some(mut summary) = summary {
            summary.render_requests = self.requests.len();
            self.tracer.commit(&summary);
        }
        self.requests
    }

    fn request_render(&mut self, container: NodeId) {
        self.requests.push(container);
        self.commit_signals += 1;
        self.tracer.event(|| HostEvent::RenderRequested { container });
    }

    /// Requests a render on the root container `node` renders into.
    fn request_render_for(&mut self, node: NodeId) {
        if let Some(root) = self.stage.instances().get(node).map(|meta| meta.root) {
            self.request_render(root);
        }
    }

    fn kind_label(&self, node: NodeId) -> String {
        self.stage
            .kind_of(node)
            .map_or_else(|| String::from("<untracked>"), |kind| String::from(kind.name()))
    }

    /// Runs `will_unmount` for the subtree of `node`, deepest first, and
    /// drops the bookkeeping of every node in it.
    ///
    /// All hooks run even when one fails; the first failure is returned.
    fn unmount_subtree(&mut self, node: NodeId, first_error: &mut Option<Error>) {
        let children: Vec<NodeId> = self.stage.graph().children(node).collect();
        for child in children {
            self.unmount_subtree(child, first_error);
        }
        let hook = self
            .stage
            .instances()
            .hooks(node)
            .and_then(|hooks| hooks.will_unmount.clone());
        if let Some(hook) = hook {
            self.tracer.event(|| HostEvent::Hook {
                node,
                hook: HookKind::WillUnmount,
            });
            let parent = self.stage.graph().parent(node);
            if let Err(e) = hook(self.stage.graph_mut(), node, parent) {
                let kind = self.kind_label(node);
                first_error.get_or_insert(Error::hook(&kind, HookKind::WillUnmount, e));
            }
        }
        self.stage.release(node);
    }

    /// Returns the topmost descendants of `node` whose own policy keeps them
    /// alive. They are cut loose before a subtree destroy.
    fn spared_descendants(&self, node: NodeId) -> Vec<NodeId> {
        let graph = self.stage.graph();
        let mut spared = Vec::new();
        let mut stack: Vec<NodeId> = graph.children(node).collect();
        while let Some(next) = stack.pop() {
            match self.stage.instances().get(next) {
                Some(meta) if !meta.destroy.destroy => spared.push(next),
                _ => stack.extend(graph.children(next)),
            }
        }
        spared
    }

    /// Detaches `child` from `parent` and releases it per its destroy policy.
    ///
    /// Descendants registered with a policy that does not destroy them
    /// survive a subtree destroy, parentless.
    fn detach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let policy = self
            .stage
            .instances()
            .get(child)
            .map_or(self.stage.config().destroy, |meta| meta.destroy);
        let root = self.stage.instances().get(child).map(|meta| meta.root);

        let spared = if policy.destroy && policy.destroy_children {
            self.spared_descendants(child)
        } else {
            Vec::new()
        };

        let mut first_error = None;
        if self.stage.graph().is_alive(child) {
            self.unmount_subtree(child, &mut first_error);
        } else {
            self.stage.release(child);
        }

        let graph = self.stage.graph_mut();
        if graph.is_alive(child) {
            if graph.parent(child) == Some(parent) {
                graph.remove_from_parent(child);
            }
            if policy.destroy {
                for &node in &spared {
                    if graph.is_alive(node) {
                        graph.remove_from_parent(node);
                    }
                }
                let children = policy.destroy_children;
                self.tracer.event(|| HostEvent::Destroy {
                    node: child,
                    children,
                });
                let destroyed = graph.destroy(child, DestroyOptions { children });
                trace!("destroyed {} ({} nodes)", child, destroyed);
            }
        }

        self.request_render(root.unwrap_or(parent));
        first_error.map_or(Ok(()), Err)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) {
        let graph = self.stage.graph_mut();
        match before {
            Some(before) if graph.is_alive(before) && graph.parent(before) == Some(parent) => {
                graph.insert_before(child, before);
            }
            _ => graph.add_child(parent, child),
        }
    }
}

impl HostConfig for SceneHost<'_> {
    type Instance = NodeId;
    type Container = NodeId;
    type UpdatePayload = ChangeSet;
    type HostContext = HostContext;

    fn create_instance(
        &mut self,
        kind: &KindName,
        props: &Props,
        root: NodeId,
        context: &HostContext,
    ) -> Result<NodeId> {
        let node = factory::create_instance(self.stage, kind, props, root)?;
        trace!("createInstance {} at depth {}", kind, context.depth);
        let tag = self.stage.kind_of(node).cloned();
        if let Some(kind) = tag {
            self.tracer.event(|| HostEvent::CreateInstance { node, kind });
        }
        Ok(node)
    }

    fn create_text_instance(
        &mut self,
        text: &str,
        _root: NodeId,
        _context: &HostContext,
    ) -> Result<NodeId> {
        Err(Error::RawText(String::from(text)))
    }

    fn should_set_text_content(&self, _kind: &KindName, _props: &Props) -> bool {
        false
    }

    fn append_initial_child(&mut self, parent: NodeId, child: NodeId) {
        self.stage.graph_mut().add_child(parent, child);
        self.tracer
            .event(|| HostEvent::AppendInitialChild { parent, child });
        self.request_render_for(parent);
    }

    fn finalize_initial_children(
        &mut self,
        instance: NodeId,
        kind: &KindName,
        _props: &Props,
    ) -> Result<bool> {
        let hooks = self.stage.instances().hooks(instance).cloned();
        let needs_mount = match hooks {
            Some(hooks) => match (hooks.did_mount, hooks.mount_timing) {
                (Some(_), MountTiming::AfterAttach) => true,
                (Some(hook), MountTiming::OnCreate) => {
                    self.tracer.event(|| HostEvent::Hook {
                        node: instance,
                        hook: HookKind::DidMount,
                    });
                    hook(self.stage.graph_mut(), instance, None)
                        .map_err(|e| Error::hook(kind.as_str(), HookKind::DidMount, e))?;
                    false
                }
                (None, _) => false,
            },
            None => false,
        };
        self.tracer.event(|| HostEvent::FinalizeInitialChildren {
            node: instance,
            needs_mount,
        });
        Ok(needs_mount)
    }

    fn prepare_update(
        &mut self,
        instance: NodeId,
        _kind: &KindName,
        old: &Props,
        new: &Props,
    ) -> Option<ChangeSet> {
        let changes = diff(old, new);
        if changes.is_empty() {
            return None;
        }
        self.tracer.event(|| HostEvent::PrepareUpdate {
            node: instance,
            keys: changes.keys().map(String::from).collect(),
        });
        Some(changes)
    }

    fn get_root_host_context(&self, root: NodeId) -> HostContext {
        HostContext { root, depth: 0 }
    }

    fn get_child_host_context(&self, parent: &HostContext, _kind: &KindName) -> HostContext {
        HostContext {
            root: parent.root,
            depth: parent.depth + 1,
        }
    }

    fn get_public_instance(&self, instance: NodeId) -> NodeId {
        instance
    }

    fn prepare_for_commit(&mut self, container: NodeId) {
        self.tracer
            .event(|| HostEvent::PrepareForCommit { container });
    }

    fn reset_after_commit(&mut self, container: NodeId) {
        self.tracer
            .event(|| HostEvent::ResetAfterCommit { container });
        if self.commit_signals == 0 && self.stage.config().request_render_on_noop_commit {
            self.request_render(container);
        }
        self.commit_signals = 0;
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.attach(parent, child, None);
        self.tracer.event(|| HostEvent::AppendChild { parent, child });
        self.request_render_for(child);
    }

    fn append_child_to_container(&mut self, container: NodeId, child: NodeId) {
        self.attach(container, child, None);
        self.tracer
            .event(|| HostEvent::AppendChildToContainer { container, child });
        self.request_render(container);
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, before: NodeId) {
        self.attach(parent, child, Some(before));
        self.tracer.event(|| HostEvent::InsertBefore {
            parent,
            child,
            before,
        });
        self.request_render_for(child);
    }

    fn insert_in_container_before(&mut self, container: NodeId, child: NodeId, before: NodeId) {
        self.attach(container, child, Some(before));
        self.tracer.event(|| HostEvent::InsertInContainerBefore {
            container,
            child,
            before,
        });
        self.request_render(container);
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.tracer.event(|| HostEvent::RemoveChild { parent, child });
        self.detach(parent, child)
    }

    fn remove_child_from_container(&mut self, container: NodeId, child: NodeId) -> Result<()> {
        self.tracer
            .event(|| HostEvent::RemoveChildFromContainer { container, child });
        self.detach(container, child)
    }

    fn commit_update(
        &mut self,
        instance: NodeId,
        payload: ChangeSet,
        kind: &KindName,
        old: &Props,
        new: &Props,
    ) -> Result<()> {
        self.tracer.event(|| HostEvent::CommitUpdate {
            node: instance,
            keys: payload.keys().map(String::from).collect(),
        });
        let hook = self
            .stage
            .instances()
            .hooks(instance)
            .and_then(|hooks| hooks.apply_props.clone());
        let result = match hook {
            Some(hook) => {
                self.tracer.event(|| HostEvent::Hook {
                    node: instance,
                    hook: HookKind::ApplyProps,
                });
                hook(self.stage.graph_mut(), instance, old, new)
                    .map_err(|e| Error::hook(kind.as_str(), HookKind::ApplyProps, e))
            }
            None => {
                apply_changes(self.stage, instance, &payload);
                Ok(())
            }
        };
        self.request_render_for(instance);
        result
    }

    fn commit_mount(&mut self, instance: NodeId, kind: &KindName, _props: &Props) -> Result<()> {
        self.tracer
            .event(|| HostEvent::CommitMount { node: instance });
        let hook = self
            .stage
            .instances()
            .hooks(instance)
            .and_then(|hooks| hooks.did_mount.clone());
        let Some(hook) = hook else {
            return Ok(());
        };
        if !self.stage.graph().is_alive(instance) {
            return Ok(());
        }
        self.tracer.event(|| HostEvent::Hook {
            node: instance,
            hook: HookKind::DidMount,
        });
        let parent = self.stage.graph().parent(instance);
        hook(self.stage.graph_mut(), instance, parent)
            .map_err(|e| Error::hook(kind.as_str(), HookKind::DidMount, e))
    }

    fn hide_instance(&mut self, instance: NodeId) {
        self.stage.graph_mut().set_visible(instance, false);
        self.tracer
            .event(|| HostEvent::HideInstance { node: instance });
        self.request_render_for(instance);
    }

    fn unhide_instance(&mut self, instance: NodeId, props: &Props) {
        let visible = props
            .get("visible")
            .and_then(PropValue::as_bool)
            .unwrap_or(true);
        self.stage.graph_mut().set_visible(instance, visible);
        self.tracer
            .event(|| HostEvent::UnhideInstance { node: instance });
        self.request_render_for(instance);
    }

    fn discard_instance(&mut self, instance: NodeId) {
        self.tracer
            .event(|| HostEvent::DiscardInstance { node: instance });
        self.stage.release(instance);
        let graph = self.stage.graph_mut();
        if graph.is_alive(instance) {
            graph.destroy(instance, DestroyOptions { children: true });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::{DestroyPolicy, RendererConfig};
    use crate::registry::{CustomKind, LifecycleHooks};
    use crate::trace::OpLog;

    fn text(s: &str) -> Props {
        Props::new().with("text", s)
    }

    #[test]
    fn insert_before_falls_back_to_append() {
        let mut stage = Stage::new(RendererConfig::DEFAULT);
        let root = stage.graph_mut().create_container();
        let mut host = SceneHost::untraced(&mut stage);
        let ctx = host.get_root_host_context(root);
        let name = KindName::from("Text");
        let a = host.create_instance(&name, &text("a"), root, &ctx).unwrap();
        let b = host.create_instance(&name, &text("b"), root, &ctx).unwrap();
        let c = host.create_instance(&name, &text("c"), root, &ctx).unwrap();

        host.append_child_to_container(root, a);
        host.insert_in_container_before(root, b, a);
        host.remove_child_from_container(root, a).unwrap();
        // `a` is gone, so `c` lands at the end.
        host.insert_in_container_before(root, c, a);

        let order: Vec<_> = stage.graph().children(root).collect();
        assert_eq!(order, [b, c]);
    }

    #[test]
    fn removal_unmounts_deepest_first_then_destroys() {
        let mut stage = Stage::new(RendererConfig::DEFAULT);
        let root = stage.graph_mut().create_container();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        stage
            .kinds_mut()
            .register(
                "Watched",
                CustomKind::new(|graph, _| Ok(graph.create_container())).with_hooks(
                    LifecycleHooks::default().will_unmount(move |graph, node, parent| {
                        assert!(graph.is_alive(node));
                        log.borrow_mut().push((node, parent));
                        Ok(())
                    }),
                ),
            )
            .unwrap();

        let ops = OpLog::new();
        let mut sink = ops.clone();
        let mut host = SceneHost::new(&mut stage, &mut sink);
        let ctx = host.get_root_host_context(root);
        let name = KindName::from("Watched");
        let parent = host.create_instance(&name, &Props::new(), root, &ctx).unwrap();
        let child = host.create_instance(&name, &Props::new(), root, &ctx).unwrap();
        let leaf = host.create_instance(&name, &Props::new(), root, &ctx).unwrap();
        host.append_initial_child(child, leaf);
        host.append_initial_child(parent, child);
        host.append_child_to_container(root, parent);

        host.remove_child_from_container(root, parent).unwrap();
        let requests = host.finish(None);

        assert_eq!(
            *seen.borrow(),
            [(leaf, Some(child)), (child, Some(parent)), (parent, Some(root))]
        );
        let events = ops.events();
        let destroy_at = events.iter().position(|e| e.name() == "destroy").unwrap();
        let hooks_before = events[..destroy_at]
            .iter()
            .filter(|e| e.name() == "hook")
            .count();
        assert_eq!(hooks_before, 3);
        assert_eq!(ops.count("destroy"), 1);
        assert!(!stage.graph().is_alive(leaf));
        assert!(stage.instances().is_empty());
        assert_eq!(requests.len(), 4);
    }

    #[test]
    fn detach_policy_keeps_the_node_alive() {
        let mut stage = Stage::new(RendererConfig::DEFAULT.with_destroy(DestroyPolicy::DETACH));
        let root = stage.graph_mut().create_container();
        let mut host = SceneHost::untraced(&mut stage);
        let ctx = host.get_root_host_context(root);
        let node = host
            .create_instance(&KindName::from("Sprite"), &Props::new(), root, &ctx)
            .unwrap();
        host.append_child_to_container(root, node);
        host.remove_child_from_container(root, node).unwrap();

        assert!(stage.graph().is_alive(node));
        assert_eq!(stage.graph().parent(node), None);
        assert!(stage.instances().get(node).is_none());
    }

    #[test]
    fn descendants_keep_their_own_destroy_policy() {
        let mut stage = Stage::new(RendererConfig::DEFAULT);
        let root = stage.graph_mut().create_container();
        stage
            .kinds_mut()
            .register(
                "Pinned",
                CustomKind::new(|graph, _| Ok(graph.create_container()))
                    .with_destroy(DestroyPolicy::DETACH),
            )
            .unwrap();

        let mut host = SceneHost::untraced(&mut stage);
        let ctx = host.get_root_host_context(root);
        let outer = host
            .create_instance(&KindName::from("Container"), &Props::new(), root, &ctx)
            .unwrap();
        let pinned = host
            .create_instance(&KindName::from("Pinned"), &Props::new(), root, &ctx)
            .unwrap();
        let inner = host
            .create_instance(&KindName::from("Sprite"), &Props::new(), root, &ctx)
            .unwrap();
        host.append_initial_child(pinned, inner);
        host.append_initial_child(outer, pinned);
        host.append_child_to_container(root, outer);
        host.remove_child_from_container(root, outer).unwrap();

        let graph = stage.graph();
        assert!(!graph.is_alive(outer), "outer destroyed");
        assert!(graph.is_alive(pinned), "pinned survives");
        assert_eq!(graph.parent(pinned), None);
        assert!(graph.is_alive(inner), "pinned keeps its subtree");
        assert_eq!(graph.parent(inner), Some(pinned));
    }

    #[test]
    fn noop_commit_still_requests_a_render() {
        let mut stage = Stage::new(RendererConfig::DEFAULT);
        let root = stage.graph_mut().create_container();
        let mut host = SceneHost::untraced(&mut stage);
        host.prepare_for_commit(root);
        host.reset_after_commit(root);
        assert_eq!(host.requests(), [root]);

        let mut quiet =
            Stage::new(RendererConfig::DEFAULT.with_noop_commit_request(false));
        let root = quiet.graph_mut().create_container();
        let mut host = SceneHost::untraced(&mut quiet);
        host.prepare_for_commit(root);
        host.reset_after_commit(root);
        assert!(host.requests().is_empty());
    }

    #[test]
    fn raw_text_is_rejected() {
        let mut stage = Stage::new(RendererConfig::DEFAULT);
        let root = stage.graph_mut().create_container();
        let mut host = SceneHost::untraced(&mut stage);
        let ctx = host.get_root_host_context(root);
        assert!(!host.should_set_text_content(&KindName::from("Text"), &Props::new()));
        let err = host.create_text_instance("hello", root, &ctx).unwrap_err();
        assert!(matches!(err, Error::RawText(text) if text == "hello"));
    }

    #[test]
    fn unhide_restores_the_visible_prop() {
        let mut stage = Stage::new(RendererConfig::DEFAULT);
        let root = stage.graph_mut().create_container();
        let mut host = SceneHost::untraced(&mut stage);
        let ctx = host.get_root_host_context(root);
        let props = Props::new().with("visible", false);
        let node = host
            .create_instance(&KindName::from("Container"), &props, root, &ctx)
            .unwrap();
        host.unhide_instance(node, &Props::new());
        assert!(host.stage().graph().local(node).visible);
        host.hide_instance(node);
        host.unhide_instance(node, &props);
        assert!(!host.stage().graph().local(node).visible);
    }
}
