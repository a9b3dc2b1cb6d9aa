// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sessions, roots and the render-request bridge.
//!
//! A [`RendererSession`] owns a [`Stage`], the registry of roots bound to its
//! containers, and the subscribers waiting for render requests. All of it
//! lives on one thread; handles are `Rc`-based and cheap to clone.
//!
//! [`Root::render`] records the new element tree as the root's pending work,
//! replacing whatever was pending before, and flushes. A flush processes
//! queued roots in order until the queue is empty, so `render` and `unmount`
//! calls made from lifecycle hooks while a flush is running are picked up by
//! that same flush instead of re-entering the reconciler. Inside
//! [`RendererSession::batch`] nothing flushes until the outermost batch ends.
//!
//! Render requests recorded by the host during a pass are delivered to the
//! subscribers of the container once the stage is no longer borrowed.
//! [`RenderLoop`] is a ready-made subscriber that evaluates and presents the
//! scene graph only when a request arrived since its last frame.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::rc::{Rc, Weak};

use hashbrown::HashMap;
use sceneweave_core::backend::Presenter;
use sceneweave_core::node::{NodeId, TextureId};
use tracing::{debug, warn};

use crate::config::RendererConfig;
use crate::diff::ChangeSet;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::host::SceneHost;
use crate::kind::{ComponentRef, KindName};
use crate::reconciler::Reconciler;
use crate::registry::{CustomKind, KindRegistry};
use crate::source::{LoadError, LoadErrorHandler, LoadTicket, ResourceLoader};
use crate::stage::Stage;
use crate::trace::{HostEvent, NoopSink, TraceSink};

/// Callback receiving the container a render was requested on.
pub type RenderRequestFn = Rc<dyn Fn(NodeId)>;

/// Handle returned by [`RendererSession::on_render_request`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct RenderBridge {
    next: u64,
    subscribers: HashMap<NodeId, Vec<(SubscriptionId, RenderRequestFn)>>,
}

impl RenderBridge {
    fn subscribe(&mut self, container: NodeId, f: RenderRequestFn) -> SubscriptionId {
        self.next += 1;
        let id = SubscriptionId(self.next);
        self.subscribers.entry(container).or_default().push((id, f));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let mut found = false;
        self.subscribers.retain(|_, subs| {
            let before = subs.len();
            subs.retain(|(sub, _)| *sub != id);
            found |= subs.len() != before;
            !subs.is_empty()
        });
        found
    }

    fn subscribers(&self, container: NodeId) -> Vec<RenderRequestFn> {
        self.subscribers
            .get(&container)
            .map(|subs| subs.iter().map(|(_, f)| f.clone()).collect())
            .unwrap_or_default()
    }
}

/// Stage work requested while a pass holds the stage.
enum Deferred {
    Register(KindName, CustomKind),
    Load(LoadTicket, Result<TextureId, LoadError>),
    LoadErrorHandler(LoadErrorHandler),
}

struct SessionInner {
    config: RendererConfig,
    stage: RefCell<Stage>,
    deferred: RefCell<Vec<Deferred>>,
    roots: RefCell<HashMap<NodeId, Rc<RootState>>>,
    bridge: RefCell<RenderBridge>,
    sink: RefCell<Box<dyn TraceSink>>,
    batch_depth: Cell<usize>,
    flushing: Cell<bool>,
    queue: RefCell<VecDeque<Rc<RootState>>>,
}

enum Pending {
    Render(Element),
    Unmount,
}

/// Per-root state shared by [`Root`] handles and the load gates the root
/// suspended on.
pub(crate) struct RootState {
    session: Weak<SessionInner>,
    container: NodeId,
    reconciler: RefCell<Reconciler<NodeId, ChangeSet>>,
    pending: RefCell<Option<Pending>>,
    last: RefCell<Option<Element>>,
    unmounted: Cell<bool>,
}

impl RootState {
    /// Re-renders the last element tree after a load gate resolved.
    pub(crate) fn wake(self: &Rc<Self>) {
        let Some(session) = self.session.upgrade() else {
            return;
        };
        if self.unmounted.get() {
            return;
        }
        {
            let mut pending = self.pending.borrow_mut();
            if pending.is_none() {
                *pending = self.last.borrow().clone().map(Pending::Render);
            }
            if pending.is_none() {
                return;
            }
        }
        session.enqueue(self);
        if let Err(e) = session.flush() {
            warn!("re-render of {} failed: {}", self.container, e);
        }
    }
}

struct BatchGuard<'a>(&'a Cell<usize>);

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

impl SessionInner {
    fn enqueue(&self, root: &Rc<RootState>) {
        let mut queue = self.queue.borrow_mut();
        if !queue.iter().any(|queued| Rc::ptr_eq(queued, root)) {
            queue.push_back(root.clone());
        }
    }

    fn flush(&self) -> Result<()> {
        if self.flushing.get() || self.batch_depth.get() > 0 {
            return Ok(());
        }
        self.flushing.set(true);
        let mut first_error = None;
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(root) = next else {
                break;
            };
            if let Err(e) = self.process(&root) {
                first_error.get_or_insert(e);
            }
        }
        self.flushing.set(false);
        first_error.map_or(Ok(()), Err)
    }

    fn process(&self, root: &Rc<RootState>) -> Result<()> {
        let Some(pending) = root.pending.borrow_mut().take() else {
            return Ok(());
        };
        let element = match &pending {
            Pending::Render(element) => {
                *root.last.borrow_mut() = Some(element.clone());
                element.clone()
            }
            Pending::Unmount => Element::Empty,
        };

        let (result, requests) = {
            let mut stage = self.stage.borrow_mut();
            if !stage.graph().is_alive(root.container) {
                return Err(Error::UnknownContainer(root.container));
            }
            let mut sink = self.sink.borrow_mut();
            let max_depth = stage.config().max_depth;
            let mut host = SceneHost::new(&mut stage, &mut **sink);
            let result = root.reconciler.borrow_mut().render(
                &mut host,
                root.container,
                &element,
                max_depth,
            );
            let summary = result.as_ref().ok().and_then(|outcome| outcome.committed);
            let requests = host.finish(summary.map(|mut summary| {
                summary.container = Some(root.container);
                summary
            }));
            (result, requests)
        };

        if matches!(pending, Pending::Unmount) {
            let mut roots = self.roots.borrow_mut();
            if roots
                .get(&root.container)
                .is_some_and(|state| Rc::ptr_eq(state, root))
            {
                roots.remove(&root.container);
            }
            debug!("unmounted root on {}", root.container);
        }

        self.deliver(&requests);
        self.report_load_failures();
        self.run_deferred();

        let outcome = result?;
        for gate in outcome.waiting {
            if gate.is_ready() {
                RootState::wake(root);
            } else {
                gate.subscribe(root);
            }
        }
        Ok(())
    }

    /// Applies the stage work queued by hooks during the last pass.
    fn run_deferred(&self) {
        loop {
            let batch = mem::take(&mut *self.deferred.borrow_mut());
            if batch.is_empty() {
                return;
            }
            for work in batch {
                match work {
                    Deferred::Register(name, kind) => {
                        self.stage.borrow_mut().kinds_mut().insert(name, kind);
                    }
                    Deferred::Load(ticket, result) => self.complete_load(ticket, result),
                    Deferred::LoadErrorHandler(handler) => {
                        self.stage
                            .borrow_mut()
                            .set_load_error_handler(Some(handler));
                    }
                }
            }
        }
    }

    fn complete_load(&self, ticket: LoadTicket, result: Result<TextureId, LoadError>) {
        let containers = {
            let Ok(mut stage) = self.stage.try_borrow_mut() else {
                self.deferred
                    .borrow_mut()
                    .push(Deferred::Load(ticket, result));
                return;
            };
            let nodes = stage.complete_load(ticket, result);
            let mut containers = Vec::new();
            for node in nodes {
                if let Some(meta) = stage.instances().get(node) {
                    if !containers.contains(&meta.root) {
                        containers.push(meta.root);
                    }
                }
            }
            containers
        };
        if let Ok(mut sink) = self.sink.try_borrow_mut() {
            for &container in &containers {
                sink.on_event(&HostEvent::RenderRequested { container });
            }
        }
        self.deliver(&containers);
        self.report_load_failures();
    }

    fn deliver(&self, requests: &[NodeId]) {
        for &container in requests {
            let subscribers = self.bridge.borrow().subscribers(container);
            for f in subscribers {
                f(container);
            }
        }
    }

    fn report_load_failures(&self) {
        let failures = self.stage.borrow_mut().take_load_failures();
        if let Some((handler, failures)) = failures {
            for (node, error) in &failures {
                handler(*node, error);
            }
        }
    }
}

/// Owner of a stage and of every root rendering into it.
///
/// Clones share the same session.
#[derive(Clone)]
pub struct RendererSession {
    inner: Rc<SessionInner>,
}

impl RendererSession {
    /// Creates a session with an in-memory resource loader.
    #[must_use]
    pub fn new(config: RendererConfig) -> Self {
        Self::from_stage(Stage::new(config))
    }

    /// Creates a session resolving sources through `loader`.
    #[must_use]
    pub fn with_loader(config: RendererConfig, loader: Box<dyn ResourceLoader>) -> Self {
        Self::from_stage(Stage::with_loader(config, loader))
    }

    fn from_stage(stage: Stage) -> Self {
        Self {
            inner: Rc::new(SessionInner {
                config: *stage.config(),
                stage: RefCell::new(stage),
                deferred: RefCell::new(Vec::new()),
                roots: RefCell::new(HashMap::new()),
                bridge: RefCell::new(RenderBridge::default()),
                sink: RefCell::new(Box::new(NoopSink)),
                batch_depth: Cell::new(0),
                flushing: Cell::new(false),
                queue: RefCell::new(VecDeque::new()),
            }),
        }
    }

    /// Returns the configuration the stage was created with.
    #[must_use]
    pub fn config(&self) -> RendererConfig {
        self.inner.config
    }

    /// Binds a new root to `container`.
    ///
    /// May be called from lifecycle hooks. While a pass is running the
    /// container is checked when the new root first renders instead.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownContainer`] if `container` is not a live node, and
    /// [`Error::DuplicateRoot`] if a root is already bound to it.
    pub fn create_root(&self, container: NodeId) -> Result<Root> {
        if let Ok(stage) = self.inner.stage.try_borrow() {
            if !stage.graph().is_alive(container) {
                return Err(Error::UnknownContainer(container));
            }
        }
        let mut roots = self.inner.roots.borrow_mut();
        if roots.contains_key(&container) {
            return Err(Error::DuplicateRoot(container));
        }
        let state = Rc::new(RootState {
            session: Rc::downgrade(&self.inner),
            container,
            reconciler: RefCell::new(Reconciler::new()),
            pending: RefCell::new(None),
            last: RefCell::new(None),
            unmounted: Cell::new(false),
        });
        roots.insert(container, state.clone());
        debug!("created root on {}", container);
        Ok(Root {
            session: Rc::downgrade(&self.inner),
            state,
        })
    }

    /// Returns the root bound to `container`, if any.
    #[must_use]
    pub fn root(&self, container: NodeId) -> Option<Root> {
        self.inner.roots.borrow().get(&container).map(|state| Root {
            session: Rc::downgrade(&self.inner),
            state: state.clone(),
        })
    }

    /// Returns how many roots are bound.
    #[must_use]
    pub fn root_count(&self) -> usize {
        self.inner.roots.borrow().len()
    }

    /// Registers a custom kind.
    ///
    /// From a lifecycle hook the registration takes effect once the running
    /// pass ends, before any render the hook queued.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKind`] if `name` is a built-in kind.
    pub fn register_kind(&self, name: &str, kind: CustomKind) -> Result<ComponentRef> {
        match self.inner.stage.try_borrow_mut() {
            Ok(mut stage) => stage.kinds_mut().register(name, kind),
            Err(_) => {
                let name = KindRegistry::validate(name)?;
                self.inner
                    .deferred
                    .borrow_mut()
                    .push(Deferred::Register(name.clone(), kind));
                Ok(ComponentRef::new(name))
            }
        }
    }

    /// Runs `f` with flushing deferred, then flushes every root that got new
    /// work, once.
    ///
    /// Batches nest; only the outermost one flushes.
    ///
    /// # Errors
    ///
    /// The first error of the final flush.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> Result<R> {
        let depth = &self.inner.batch_depth;
        depth.set(depth.get() + 1);
        let out = {
            let _guard = BatchGuard(depth);
            f()
        };
        self.inner.flush()?;
        Ok(out)
    }

    /// Borrows the stage.
    ///
    /// # Panics
    ///
    /// When called from a lifecycle hook while a pass is running.
    #[must_use]
    pub fn stage(&self) -> Ref<'_, Stage> {
        self.inner.stage.borrow()
    }

    /// Borrows the stage mutably.
    ///
    /// # Panics
    ///
    /// When called from a lifecycle hook while a pass is running.
    pub fn stage_mut(&self) -> RefMut<'_, Stage> {
        self.inner.stage.borrow_mut()
    }

    /// Subscribes `f` to the render requests of `container`.
    pub fn on_render_request(
        &self,
        container: NodeId,
        f: impl Fn(NodeId) + 'static,
    ) -> SubscriptionId {
        self.inner
            .bridge
            .borrow_mut()
            .subscribe(container, Rc::new(f))
    }

    /// Removes a subscription. Returns whether it existed.
    pub fn off_render_request(&self, id: SubscriptionId) -> bool {
        self.inner.bridge.borrow_mut().unsubscribe(id)
    }

    /// Replaces the operation trace sink.
    pub fn set_trace_sink(&self, sink: impl TraceSink + 'static) {
        *self.inner.sink.borrow_mut() = Box::new(sink);
    }

    /// Sets the callback receiving resource load failures.
    pub fn set_load_error_handler(&self, f: impl Fn(NodeId, &LoadError) + 'static) {
        let handler: LoadErrorHandler = Rc::new(f);
        match self.inner.stage.try_borrow_mut() {
            Ok(mut stage) => stage.set_load_error_handler(Some(handler)),
            Err(_) => self
                .inner
                .deferred
                .borrow_mut()
                .push(Deferred::LoadErrorHandler(handler)),
        }
    }

    /// Delivers the result of an asynchronous load started by the resource
    /// loader.
    ///
    /// On success the texture is assigned to every live node still waiting
    /// on `ticket` and a render is requested on their roots. On failure the
    /// nodes keep their content and the load error handler is called.
    ///
    /// From a lifecycle hook the result is delivered once the running pass
    /// ends.
    pub fn complete_load(&self, ticket: LoadTicket, result: Result<TextureId, LoadError>) {
        self.inner.complete_load(ticket, result);
    }
}

impl Default for RendererSession {
    fn default() -> Self {
        Self::new(RendererConfig::DEFAULT)
    }
}

impl fmt::Debug for RendererSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererSession")
            .field("roots", &self.root_count())
            .field("batch_depth", &self.inner.batch_depth.get())
            .field("flushing", &self.inner.flushing.get())
            .finish_non_exhaustive()
    }
}

/// A reconciliation root bound to one container.
#[derive(Clone)]
pub struct Root {
    session: Weak<SessionInner>,
    state: Rc<RootState>,
}

impl Root {
    /// Returns the container this root renders into.
    #[must_use]
    pub fn container(&self) -> NodeId {
        self.state.container
    }

    /// Returns whether [`unmount`](Self::unmount) has been called.
    #[must_use]
    pub fn is_unmounted(&self) -> bool {
        self.state.unmounted.get()
    }

    /// Renders `element` into the container, replacing any pending render.
    ///
    /// Rendering an unmounted root does nothing.
    ///
    /// # Errors
    ///
    /// [`Error::SessionClosed`] once the session is gone; otherwise the first
    /// error of the flush this call triggered. Calls made while a flush is
    /// running or inside a batch only queue work and return `Ok`.
    pub fn render(&self, element: impl Into<Element>) -> Result<()> {
        let session = self.session.upgrade().ok_or(Error::SessionClosed)?;
        if self.state.unmounted.get() {
            warn!("render on unmounted root {} ignored", self.state.container);
            return Ok(());
        }
        *self.state.pending.borrow_mut() = Some(Pending::Render(element.into()));
        session.enqueue(&self.state);
        session.flush()
    }

    /// Tears the rendered tree down and unbinds the root from its container.
    ///
    /// Every `will_unmount` hook of the rendered tree runs. Calling it again
    /// does nothing.
    ///
    /// # Errors
    ///
    /// As for [`render`](Self::render).
    pub fn unmount(&self) -> Result<()> {
        let session = self.session.upgrade().ok_or(Error::SessionClosed)?;
        if self.state.unmounted.replace(true) {
            return Ok(());
        }
        *self.state.pending.borrow_mut() = Some(Pending::Unmount);
        session.enqueue(&self.state);
        session.flush()
    }
}

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Root")
            .field("container", &self.state.container)
            .field("unmounted", &self.state.unmounted.get())
            .finish_non_exhaustive()
    }
}

/// On-demand frame driver for one container.
///
/// Presents only when a render was requested since the last frame. The first
/// tick always presents.
pub struct RenderLoop {
    session: RendererSession,
    pending: Rc<Cell<bool>>,
    subscription: SubscriptionId,
    frames: u64,
}

impl RenderLoop {
    /// Subscribes to the render requests of `container`.
    #[must_use]
    pub fn new(session: &RendererSession, container: NodeId) -> Self {
        let pending = Rc::new(Cell::new(true));
        let flag = pending.clone();
        let subscription = session.on_render_request(container, move |_| flag.set(true));
        Self {
            session: session.clone(),
            pending,
            subscription,
            frames: 0,
        }
    }

    /// Marks a frame as needed.
    pub fn request(&self) {
        self.pending.set(true);
    }

    /// Returns whether the next tick will present.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Returns how many frames were presented.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Evaluates and presents the scene graph if a frame is needed.
    ///
    /// Returns whether a frame was presented.
    pub fn tick(&mut self, presenter: &mut dyn Presenter) -> bool {
        if !self.pending.replace(false) {
            return false;
        }
        let mut stage = self.session.stage_mut();
        let changes = stage.graph_mut().evaluate();
        presenter.present(stage.graph(), &changes);
        self.frames += 1;
        true
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.session.off_render_request(self.subscription);
    }
}

impl fmt::Debug for RenderLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderLoop")
            .field("pending", &self.pending.get())
            .field("subscription", &self.subscription)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use sceneweave_core::node::{SceneChanges, SceneGraph};

    use super::*;
    use crate::element::HostElement;
    use crate::gate::LoadGate;
    use crate::props::Props;
    use crate::registry::LifecycleHooks;
    use crate::trace::OpLog;

    fn label(s: &str) -> HostElement {
        HostElement::new("Text", Props::new().with("text", s))
    }

    fn setup() -> (RendererSession, NodeId) {
        let session = RendererSession::default();
        let container = session.stage_mut().graph_mut().create_container();
        (session, container)
    }

    #[derive(Default)]
    struct CountingPresenter(usize);

    impl Presenter for CountingPresenter {
        fn present(&mut self, _: &SceneGraph, _: &SceneChanges) {
            self.0 += 1;
        }
    }

    #[test]
    fn roots_are_unique_per_container() {
        let (session, container) = setup();
        let root = session.create_root(container).unwrap();
        assert!(matches!(
            session.create_root(container),
            Err(Error::DuplicateRoot(c)) if c == container
        ));
        root.unmount().unwrap();
        root.unmount().unwrap();
        assert_eq!(session.root_count(), 0);
        assert!(session.create_root(container).is_ok());
    }

    #[test]
    fn dead_containers_are_rejected() {
        let (session, container) = setup();
        session
            .stage_mut()
            .graph_mut()
            .destroy(container, sceneweave_core::node::DestroyOptions { children: true });
        assert!(matches!(
            session.create_root(container),
            Err(Error::UnknownContainer(_))
        ));
    }

    #[test]
    fn batched_renders_commit_once() {
        let (session, container) = setup();
        let log = OpLog::new();
        session.set_trace_sink(log.clone());
        let root = session.create_root(container).unwrap();
        session
            .batch(|| {
                root.render(label("a")).unwrap();
                root.render(label("b")).unwrap();
                assert!(session.stage().graph().children(container).next().is_none());
            })
            .unwrap();
        assert_eq!(log.commits().len(), 1);
        assert_eq!(log.count("createInstance"), 1);
        let node = session.stage().graph().children(container).next().unwrap();
        assert_eq!(session.stage().graph().text(node), Some("b"));
    }

    #[test]
    fn hooks_may_render_other_roots() {
        let (session, container) = setup();
        let other = session.stage_mut().graph_mut().create_container();
        let other_root = session.create_root(other).unwrap();
        let target = other_root.clone();
        let trigger = session
            .register_kind(
                "Trigger",
                CustomKind::new(|graph, _| Ok(graph.create_container())).with_hooks(
                    LifecycleHooks::default().did_mount(move |_, _, _| {
                        target.render(label("from hook"))?;
                        Ok(())
                    }),
                ),
            )
            .unwrap();

        let root = session.create_root(container).unwrap();
        root.render(HostElement::new(&trigger, Props::new())).unwrap();
        assert_eq!(session.stage().graph().children(other).count(), 1);
    }

    #[test]
    fn hooks_may_create_roots_and_register_kinds() {
        let (session, container) = setup();
        let other = session.stage_mut().graph_mut().create_container();
        let late = Rc::new(RefCell::new(None));
        let (hook_session, hook_late) = (session.clone(), Rc::clone(&late));
        let trigger = session
            .register_kind(
                "Trigger",
                CustomKind::new(|graph, _| Ok(graph.create_container())).with_hooks(
                    LifecycleHooks::default().did_mount(move |_, _, _| {
                        let root = hook_session.create_root(other)?;
                        root.render(label("from hook"))?;
                        let kind = hook_session.register_kind(
                            "Late",
                            CustomKind::new(|graph, _| Ok(graph.create_container())),
                        )?;
                        *hook_late.borrow_mut() = Some(kind);
                        assert!(
                            hook_session
                                .register_kind(
                                    "Sprite",
                                    CustomKind::new(|graph, _| Ok(graph.create_container())),
                                )
                                .is_err(),
                            "built-in names stay reserved during a pass"
                        );
                        Ok(())
                    }),
                ),
            )
            .unwrap();

        let root = session.create_root(container).unwrap();
        root.render(HostElement::new(&trigger, Props::new())).unwrap();
        assert_eq!(session.root_count(), 2);
        assert_eq!(session.stage().graph().children(other).count(), 1);

        let late = late.borrow_mut().take().unwrap();
        root.render(HostElement::new(&late, Props::new())).unwrap();
        assert_eq!(session.stage().graph().children(container).count(), 1);
    }

    #[test]
    fn roots_created_on_dead_containers_fail_on_render() {
        let (session, container) = setup();
        let doomed = session.stage_mut().graph_mut().create_container();
        let root = session.create_root(doomed).unwrap();
        session
            .stage_mut()
            .graph_mut()
            .destroy(doomed, sceneweave_core::node::DestroyOptions { children: true });
        assert!(matches!(
            root.render(label("x")),
            Err(Error::UnknownContainer(c)) if c == doomed
        ));
        assert!(session.create_root(container).is_ok());
    }

    #[test]
    fn resolving_a_gate_rerenders_waiting_roots() {
        let (session, container) = setup();
        let root = session.create_root(container).unwrap();
        let gate = LoadGate::new();
        root.render(Element::suspense(
            label("loading"),
            [Element::gate(&gate, [label("done")])],
        ))
        .unwrap();
        assert_eq!(gate.waiting(), 1);

        gate.resolve();
        let graph_text: Vec<_> = {
            let stage = session.stage();
            stage
                .graph()
                .children(container)
                .map(|n| stage.graph().text(n).map(String::from))
                .collect()
        };
        assert_eq!(graph_text, [Some(String::from("done"))]);
        assert_eq!(gate.waiting(), 0);
    }

    #[test]
    fn render_loop_presents_on_request_only() {
        let (session, container) = setup();
        let root = session.create_root(container).unwrap();
        let mut frames = RenderLoop::new(&session, container);
        let mut presenter = CountingPresenter::default();

        assert!(frames.tick(&mut presenter));
        assert!(!frames.tick(&mut presenter));
        root.render(label("hi")).unwrap();
        assert!(frames.is_pending());
        assert!(frames.tick(&mut presenter));
        assert_eq!(presenter.0, 2);
        assert_eq!(frames.frames(), 2);

        drop(frames);
        root.render(label("ho")).unwrap();
        assert!(session.inner.bridge.borrow().subscribers(container).is_empty());
    }

    #[test]
    fn dropped_session_closes_roots() {
        let (session, container) = setup();
        let root = session.create_root(container).unwrap();
        drop(session);
        assert!(matches!(root.render(label("x")), Err(Error::SessionClosed)));
    }
}
