// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree reconciliation.
//!
//! [`Reconciler`] keeps the fiber tree of one root: the last committed
//! element tree together with the host instances it produced. Each
//! [`render`](Reconciler::render) runs in two phases against a
//! [`HostConfig`]:
//!
//! 1. **Render.** The new element tree is matched against the current fibers
//!    (by key, or by position for unkeyed siblings). Unmatched fibers are
//!    scheduled for deletion in their old order. New subtrees are built
//!    off-tree, children before parents:
//!    `create_instance`, `append_initial_child` for each child,
//!    `finalize_initial_children`. Matched hosts get `prepare_update`.
//!    Nothing visible changes in this phase; if it fails, every instance it
//!    created is discarded and the committed tree stays as it was.
//! 2. **Commit.** `prepare_for_commit`; deletions; then for every host
//!    parent, placements (`insert_before` the next sibling that did not move,
//!    or append) followed by the updates of each child, parents before
//!    children; hide/unhide for suspense boundaries; `reset_after_commit`;
//!    finally `commit_mount` for fresh nodes that asked for it, children
//!    before parents. Hook failures in this phase do not stop it; the first
//!    one is returned once the commit completes.
//!
//! Moves use the last-placed-index rule: walking the new children in order,
//! a matched fiber whose old index is lower than the highest old index kept
//! in place so far has moved and is placed again.
//!
//! A [`Gate`](Element::Gate) whose [`LoadGate`] is loading suspends the
//! render. The nearest [`Suspense`](Element::Suspense) boundary rolls back
//! what its content created, keeps (and hides) the content it showed before,
//! and renders its fallback. With no boundary the whole pass is abandoned
//! and the committed tree stays on screen. Either way the gate is reported
//! in [`Outcome::waiting`] so the caller can retry once it resolves.

use core::fmt;
use core::mem;

use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::element::{Element, HostElement, Key, SuspenseElement};
use crate::error::{Error, Result};
use crate::gate::LoadGate;
use crate::host::HostConfig;
use crate::kind::KindName;
use crate::props::Props;
use crate::trace::CommitSummary;

/// Kind name given to raw text instances.
pub const TEXT_KIND: &str = "#text";

/// Result of a successful [`Reconciler::render`].
#[derive(Debug, Default)]
pub struct Outcome {
    /// Counts of the commit, or `None` when the pass suspended outside any
    /// suspense boundary and nothing was committed.
    pub committed: Option<CommitSummary>,
    /// Loading gates the pass ran into.
    pub waiting: Vec<LoadGate>,
}

/// The committed fiber tree of one root.
pub struct Reconciler<I, P> {
    current: Vec<Fiber<I, P>>,
}

impl<I, P> Default for Reconciler<I, P> {
    fn default() -> Self {
        Self {
            current: Vec::new(),
        }
    }
}

impl<I: fmt::Debug, P: fmt::Debug> fmt::Debug for Reconciler<I, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("current", &self.current)
            .finish()
    }
}

impl<I: Copy + Eq + fmt::Debug, P: Clone + fmt::Debug> Reconciler<I, P> {
    /// Creates a reconciler with nothing rendered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether nothing is rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Returns the instances attached directly to the container, in order.
    #[must_use]
    pub fn top_instances(&self) -> Vec<I> {
        top_instances(&self.current)
    }

    /// Brings the host tree in line with `element`.
    ///
    /// # Errors
    ///
    /// Render-phase failures leave the committed tree untouched. Commit-phase
    /// hook failures are reported after the commit completes; the new tree is
    /// kept in that case.
    pub fn render<H>(
        &mut self,
        host: &mut H,
        container: H::Container,
        element: &Element,
        max_depth: usize,
    ) -> Result<Outcome>
    where
        H: HostConfig<Instance = I, UpdatePayload = P>,
    {
        let context = host.get_root_host_context(container);
        let mut pass = Pass {
            host,
            container,
            max_depth,
            deletions: Vec::new(),
            mounts: Vec::new(),
            created: Vec::new(),
            visibility: Vec::new(),
            waiting: Vec::new(),
        };
        let rendered = pass.reconcile_children(
            Some(Parent::Container(container)),
            &context,
            self.current.clone(),
            core::slice::from_ref(element),
            0,
            false,
        );
        match rendered {
            Ok(mut next) => {
                let (summary, failure) = pass.commit(&mut next);
                debug!(
                    "committed {:?}: {} deletions, {} placements, {} updates, {} mounts",
                    container,
                    summary.deletions,
                    summary.placements,
                    summary.updates,
                    summary.mounts,
                );
                self.current = next;
                match failure {
                    Some(e) => Err(e),
                    None => Ok(Outcome {
                        committed: Some(summary),
                        waiting: pass.waiting,
                    }),
                }
            }
            Err(Interrupt::Suspended(gate)) => {
                debug!("{:?} suspended outside any boundary", container);
                pass.rollback(Mark::default());
                pass.waiting.push(gate);
                Ok(Outcome {
                    committed: None,
                    waiting: pass.waiting,
                })
            }
            Err(Interrupt::Failed(e)) => {
                pass.rollback(Mark::default());
                Err(e)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Slot {
    Key(Key),
    Index(usize),
}

#[derive(Clone, Debug)]
struct Fiber<I, P> {
    slot: Slot,
    node: FiberNode<I, P>,
    /// Needs to be attached or moved in the next commit.
    placed: bool,
}

#[derive(Clone, Debug)]
enum FiberNode<I, P> {
    Host {
        kind: KindName,
        instance: I,
        props: Props,
        /// Prepared payload and the props it was computed from.
        update: Option<(P, Props)>,
        children: Vec<Fiber<I, P>>,
    },
    Fragment {
        children: Vec<Fiber<I, P>>,
    },
    Gate {
        children: Vec<Fiber<I, P>>,
    },
    Suspense {
        primary: Vec<Fiber<I, P>>,
        /// Present while the fallback is shown; `primary` is hidden then.
        fallback: Option<Vec<Fiber<I, P>>>,
    },
}

impl<I, P> FiberNode<I, P> {
    fn matches(&self, element: &Element) -> bool {
        match (self, element) {
            (Self::Host { kind, .. }, Element::Host(host)) => *kind == host.kind,
            (Self::Host { kind, .. }, Element::Text(_)) => kind.as_str() == TEXT_KIND,
            (Self::Fragment { .. }, Element::Fragment(_))
            | (Self::Gate { .. }, Element::Gate(_))
            | (Self::Suspense { .. }, Element::Suspense(_)) => true,
            _ => false,
        }
    }
}

/// Visits the topmost host instances of `fibers` in paint order.
///
/// `placed` is inherited: every host under a placed fragment or boundary is
/// reported as placed.
fn for_each_host<'f, I: Copy, P>(
    fibers: &'f [Fiber<I, P>],
    placed: bool,
    f: &mut impl FnMut(I, &'f Props, bool),
) {
    for fiber in fibers {
        let placed = placed || fiber.placed;
        match &fiber.node {
            FiberNode::Host {
                instance, props, ..
            } => f(*instance, props, placed),
            FiberNode::Fragment { children } | FiberNode::Gate { children } => {
                for_each_host(children, placed, f);
            }
            FiberNode::Suspense { primary, fallback } => {
                for_each_host(primary, placed, f);
                if let Some(fallback) = fallback {
                    for_each_host(fallback, placed, f);
                }
            }
        }
    }
}

fn top_instances<I: Copy, P>(fibers: &[Fiber<I, P>]) -> Vec<I> {
    let mut out = Vec::new();
    for_each_host(fibers, false, &mut |instance, _, _| out.push(instance));
    out
}

#[derive(Clone, Copy, Debug)]
enum Parent<I, C> {
    Container(C),
    Instance(I),
}

#[derive(Debug)]
struct Deletion<I, C> {
    parent: Parent<I, C>,
    instances: Vec<I>,
}

#[derive(Debug)]
struct Mount<I> {
    instance: I,
    kind: KindName,
    props: Props,
}

#[derive(Debug)]
enum Visibility<I> {
    Hide(I),
    Unhide(I, Props),
}

enum Interrupt {
    Suspended(LoadGate),
    Failed(Error),
}

impl From<Error> for Interrupt {
    fn from(e: Error) -> Self {
        Self::Failed(e)
    }
}

/// Lengths of the effect lists at some point of the render phase.
#[derive(Clone, Copy, Default)]
struct Mark {
    deletions: usize,
    mounts: usize,
    created: usize,
    visibility: usize,
}

type FiberOf<H> = Fiber<<H as HostConfig>::Instance, <H as HostConfig>::UpdatePayload>;
type NodeOf<H> = FiberNode<<H as HostConfig>::Instance, <H as HostConfig>::UpdatePayload>;
type ParentOf<H> = Parent<<H as HostConfig>::Instance, <H as HostConfig>::Container>;

/// One render pass and the effects it collected.
struct Pass<'h, H: HostConfig> {
    host: &'h mut H,
    container: H::Container,
    max_depth: usize,
    deletions: Vec<Deletion<H::Instance, H::Container>>,
    mounts: Vec<Mount<H::Instance>>,
    created: Vec<H::Instance>,
    visibility: Vec<Visibility<H::Instance>>,
    waiting: Vec<LoadGate>,
}

fn keep_first(slot: &mut Option<Error>, result: Result<()>) {
    if let Err(e) = result {
        slot.get_or_insert(e);
    }
}

impl<H: HostConfig> Pass<'_, H> {
    fn mark(&self) -> Mark {
        Mark {
            deletions: self.deletions.len(),
            mounts: self.mounts.len(),
            created: self.created.len(),
            visibility: self.visibility.len(),
        }
    }

    /// Forgets the effects collected since `mark` and discards the instances
    /// created since then, children before parents.
    fn rollback(&mut self, mark: Mark) {
        self.deletions.truncate(mark.deletions);
        self.mounts.truncate(mark.mounts);
        self.visibility.truncate(mark.visibility);
        for instance in self.created.drain(mark.created..) {
            self.host.discard_instance(instance);
        }
    }

    fn delete(&mut self, parent: Option<ParentOf<H>>, fiber: &FiberOf<H>) {
        // Fresh subtrees have nothing to delete.
        let Some(parent) = parent else {
            return;
        };
        let instances = top_instances(core::slice::from_ref(fiber));
        if !instances.is_empty() {
            self.deletions.push(Deletion { parent, instances });
        }
    }

    /// Matches `elements` against `old` and renders each of them.
    ///
    /// `parent` is the host parent the resulting top-level instances attach
    /// to, or `None` inside a subtree that is being created.
    fn reconcile_children(
        &mut self,
        parent: Option<ParentOf<H>>,
        context: &H::HostContext,
        old: Vec<FiberOf<H>>,
        elements: &[Element],
        depth: usize,
        fresh: bool,
    ) -> Result<Vec<FiberOf<H>>, Interrupt> {
        if depth > self.max_depth {
            return Err(Error::DepthExceeded(self.max_depth).into());
        }

        let mut stale = Vec::new();
        let mut by_slot: HashMap<Slot, (usize, FiberOf<H>)> = HashMap::with_capacity(old.len());
        for (index, fiber) in old.into_iter().enumerate() {
            if let Some(duplicate) = by_slot.insert(fiber.slot.clone(), (index, fiber)) {
                stale.push(duplicate);
            }
        }

        let mut plan = Vec::with_capacity(elements.len());
        let mut last_placed = 0;
        for (index, element) in elements.iter().enumerate() {
            if matches!(element, Element::Empty) {
                continue;
            }
            let slot = element
                .key()
                .map_or(Slot::Index(index), |key| Slot::Key(key.clone()));
            match by_slot.remove(&slot) {
                Some((old_index, fiber)) if fiber.node.matches(element) => {
                    let moved = old_index < last_placed;
                    if !moved {
                        last_placed = old_index;
                    }
                    plan.push((slot, element, Some(fiber.node), moved));
                }
                Some(replaced) => {
                    stale.push(replaced);
                    plan.push((slot, element, None, true));
                }
                None => plan.push((slot, element, None, true)),
            }
        }

        stale.extend(by_slot.into_values());
        stale.sort_by_key(|(index, _)| *index);
        for (_, fiber) in &stale {
            self.delete(parent, fiber);
        }

        let mut fibers = Vec::with_capacity(plan.len());
        let mut seen = Vec::new();
        for (slot, element, old, placed) in plan {
            if let Slot::Key(key) = &slot {
                if seen.contains(key) {
                    warn!("duplicate sibling key `{}`", key);
                }
                seen.push(key.clone());
            }
            let node = self.render_element(parent, context, old, element, depth, fresh)?;
            fibers.push(Fiber {
                slot,
                node,
                placed: placed && !fresh,
            });
        }
        Ok(fibers)
    }

    fn render_element(
        &mut self,
        parent: Option<ParentOf<H>>,
        context: &H::HostContext,
        old: Option<NodeOf<H>>,
        element: &Element,
        depth: usize,
        fresh: bool,
    ) -> Result<NodeOf<H>, Interrupt> {
        match element {
            Element::Host(host) => match old {
                Some(FiberNode::Host {
                    instance,
                    props,
                    children,
                    ..
                }) => self.update_host(context, instance, props, children, host, depth),
                _ => self.create_host(context, host, depth),
            },
            Element::Text(text) => self.render_text(context, old, text),
            Element::Fragment(fragment) => {
                let old = match old {
                    Some(FiberNode::Fragment { children }) => children,
                    _ => Vec::new(),
                };
                let children = self.reconcile_children(
                    parent,
                    context,
                    old,
                    &fragment.children,
                    depth + 1,
                    fresh,
                )?;
                Ok(FiberNode::Fragment { children })
            }
            Element::Gate(gated) => {
                if !gated.gate.is_ready() {
                    return Err(Interrupt::Suspended(gated.gate.clone()));
                }
                let old = match old {
                    Some(FiberNode::Gate { children }) => children,
                    _ => Vec::new(),
                };
                let children = self.reconcile_children(
                    parent,
                    context,
                    old,
                    &gated.children,
                    depth + 1,
                    fresh,
                )?;
                Ok(FiberNode::Gate { children })
            }
            Element::Suspense(suspense) => {
                self.render_suspense(parent, context, old, suspense, depth, fresh)
            }
            Element::Empty => Ok(FiberNode::Fragment {
                children: Vec::new(),
            }),
        }
    }

    fn create_host(
        &mut self,
        context: &H::HostContext,
        element: &HostElement,
        depth: usize,
    ) -> Result<NodeOf<H>, Interrupt> {
        let child_context = self.host.get_child_host_context(context, &element.kind);
        let children = if self
            .host
            .should_set_text_content(&element.kind, &element.props)
        {
            Vec::new()
        } else {
            self.reconcile_children(
                None,
                &child_context,
                Vec::new(),
                &element.children,
                depth + 1,
                true,
            )?
        };

        let instance =
            self.host
                .create_instance(&element.kind, &element.props, self.container, context)?;
        self.created.push(instance);
        for child in top_instances(&children) {
            self.host.append_initial_child(instance, child);
        }
        if self
            .host
            .finalize_initial_children(instance, &element.kind, &element.props)?
        {
            self.mounts.push(Mount {
                instance,
                kind: element.kind.clone(),
                props: element.props.clone(),
            });
        }

        Ok(FiberNode::Host {
            kind: element.kind.clone(),
            instance,
            props: element.props.clone(),
            update: None,
            children,
        })
    }

    fn update_host(
        &mut self,
        context: &H::HostContext,
        instance: H::Instance,
        old_props: Props,
        old_children: Vec<FiberOf<H>>,
        element: &HostElement,
        depth: usize,
    ) -> Result<NodeOf<H>, Interrupt> {
        let child_context = self.host.get_child_host_context(context, &element.kind);
        let children = if self
            .host
            .should_set_text_content(&element.kind, &element.props)
        {
            for fiber in &old_children {
                self.delete(Some(Parent::Instance(instance)), fiber);
            }
            Vec::new()
        } else {
            self.reconcile_children(
                Some(Parent::Instance(instance)),
                &child_context,
                old_children,
                &element.children,
                depth + 1,
                false,
            )?
        };
        let update = self
            .host
            .prepare_update(instance, &element.kind, &old_props, &element.props)
            .map(|payload| (payload, old_props));
        Ok(FiberNode::Host {
            kind: element.kind.clone(),
            instance,
            props: element.props.clone(),
            update,
            children,
        })
    }

    fn render_text(
        &mut self,
        context: &H::HostContext,
        old: Option<NodeOf<H>>,
        text: &str,
    ) -> Result<NodeOf<H>, Interrupt> {
        let kind = KindName::new(TEXT_KIND);
        let props = Props::new().with("text", text);
        if let Some(FiberNode::Host {
            instance,
            props: old_props,
            ..
        }) = old
        {
            let update = self
                .host
                .prepare_update(instance, &kind, &old_props, &props)
                .map(|payload| (payload, old_props));
            return Ok(FiberNode::Host {
                kind,
                instance,
                props,
                update,
                children: Vec::new(),
            });
        }
        let instance = self
            .host
            .create_text_instance(text, self.container, context)?;
        self.created.push(instance);
        Ok(FiberNode::Host {
            kind,
            instance,
            props,
            update: None,
            children: Vec::new(),
        })
    }

    fn render_suspense(
        &mut self,
        parent: Option<ParentOf<H>>,
        context: &H::HostContext,
        old: Option<NodeOf<H>>,
        element: &SuspenseElement,
        depth: usize,
        fresh: bool,
    ) -> Result<NodeOf<H>, Interrupt> {
        let (old_primary, old_fallback) = match old {
            Some(FiberNode::Suspense { primary, fallback }) => (primary, fallback),
            _ => (Vec::new(), None),
        };
        let hidden = if old_fallback.is_some() {
            top_instances(&old_primary)
        } else {
            Vec::new()
        };

        let mark = self.mark();
        let attempt = self.reconcile_children(
            parent,
            context,
            old_primary.clone(),
            &element.children,
            depth + 1,
            fresh,
        );
        match attempt {
            Ok(primary) => {
                if let Some(fallback) = old_fallback {
                    for fiber in &fallback {
                        self.delete(parent, fiber);
                    }
                    let mut shown = Vec::new();
                    for_each_host(&primary, false, &mut |instance, props, _| {
                        if hidden.contains(&instance) {
                            shown.push(Visibility::Unhide(instance, props.clone()));
                        }
                    });
                    self.visibility.extend(shown);
                }
                Ok(FiberNode::Suspense {
                    primary,
                    fallback: None,
                })
            }
            Err(Interrupt::Suspended(gate)) => {
                self.rollback(mark);
                self.waiting.push(gate);
                if old_fallback.is_none() {
                    for instance in top_instances(&old_primary) {
                        self.visibility.push(Visibility::Hide(instance));
                    }
                }
                let fallback = self.reconcile_children(
                    parent,
                    context,
                    old_fallback.unwrap_or_default(),
                    core::slice::from_ref(&*element.fallback),
                    depth + 1,
                    fresh,
                )?;
                Ok(FiberNode::Suspense {
                    primary: old_primary,
                    fallback: Some(fallback),
                })
            }
            Err(failed) => Err(failed),
        }
    }

    fn commit(&mut self, fibers: &mut [FiberOf<H>]) -> (CommitSummary, Option<Error>) {
        let mut summary = CommitSummary::default();
        let mut failure = None;
        self.host.prepare_for_commit(self.container);

        for deletion in mem::take(&mut self.deletions) {
            for instance in deletion.instances {
                summary.deletions += 1;
                let result = match deletion.parent {
                    Parent::Container(container) => {
                        self.host.remove_child_from_container(container, instance)
                    }
                    Parent::Instance(parent) => self.host.remove_child(parent, instance),
                };
                keep_first(&mut failure, result);
            }
        }

        self.commit_children(
            Parent::Container(self.container),
            fibers,
            &mut summary,
            &mut failure,
        );

        for change in mem::take(&mut self.visibility) {
            match change {
                Visibility::Hide(instance) => self.host.hide_instance(instance),
                Visibility::Unhide(instance, props) => self.host.unhide_instance(instance, &props),
            }
        }

        self.host.reset_after_commit(self.container);

        for mount in mem::take(&mut self.mounts) {
            summary.mounts += 1;
            let result = self
                .host
                .commit_mount(mount.instance, &mount.kind, &mount.props);
            keep_first(&mut failure, result);
        }
        (summary, failure)
    }

    /// Attaches or moves the placed children of `parent`, then commits their
    /// updates.
    fn commit_children(
        &mut self,
        parent: ParentOf<H>,
        fibers: &mut [FiberOf<H>],
        summary: &mut CommitSummary,
        failure: &mut Option<Error>,
    ) {
        let mut flat = Vec::new();
        for_each_host(fibers, false, &mut |instance, _, placed| {
            flat.push((instance, placed));
        });
        for (at, &(instance, placed)) in flat.iter().enumerate() {
            if !placed {
                continue;
            }
            summary.placements += 1;
            let before = flat[at + 1..]
                .iter()
                .find(|(_, placed)| !placed)
                .map(|(instance, _)| *instance);
            match (parent, before) {
                (Parent::Container(container), Some(before)) => {
                    self.host
                        .insert_in_container_before(container, instance, before);
                }
                (Parent::Container(container), None) => {
                    self.host.append_child_to_container(container, instance);
                }
                (Parent::Instance(parent), Some(before)) => {
                    self.host.insert_before(parent, instance, before);
                }
                (Parent::Instance(parent), None) => self.host.append_child(parent, instance),
            }
        }
        self.commit_updates(fibers, summary, failure);
    }

    fn commit_updates(
        &mut self,
        fibers: &mut [FiberOf<H>],
        summary: &mut CommitSummary,
        failure: &mut Option<Error>,
    ) {
        for fiber in fibers {
            fiber.placed = false;
            match &mut fiber.node {
                FiberNode::Host {
                    kind,
                    instance,
                    props,
                    update,
                    children,
                } => {
                    if let Some((payload, old)) = update.take() {
                        summary.updates += 1;
                        let result = self
                            .host
                            .commit_update(*instance, payload, kind, &old, props);
                        keep_first(failure, result);
                    }
                    self.commit_children(Parent::Instance(*instance), children, summary, failure);
                }
                FiberNode::Fragment { children } | FiberNode::Gate { children } => {
                    self.commit_updates(children, summary, failure);
                }
                FiberNode::Suspense { primary, fallback } => {
                    self.commit_updates(primary, summary, failure);
                    if let Some(fallback) = fallback {
                        self.commit_updates(fallback, summary, failure);
                    }
                }
            }
        }
    }
}
