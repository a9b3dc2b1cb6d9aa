// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The mutable state a renderer session drives.

use std::fmt;

use sceneweave_core::node::{NodeId, SceneGraph, TextureId};
use tracing::warn;

use crate::config::RendererConfig;
use crate::instance::{InstanceMeta, InstanceTable};
use crate::kind::{BuiltinKind, Kind};
use crate::props::Source;
use crate::registry::{KindRegistry, LifecycleHooks};
use crate::source::{
    LoadError, LoadErrorHandler, LoadTicket, MemoryLoader, Resolution, ResourceLoader, Sources,
};

/// Scene graph plus everything the renderer keeps beside it.
///
/// Owned by a [`RendererSession`](crate::RendererSession). Lifecycle hooks
/// only ever see the [`SceneGraph`]; the rest is bookkeeping.
pub struct Stage {
    graph: SceneGraph,
    kinds: KindRegistry,
    instances: InstanceTable,
    sources: Sources,
    loader: Box<dyn ResourceLoader>,
    config: RendererConfig,
    on_load_error: Option<LoadErrorHandler>,
    load_failures: Vec<(NodeId, LoadError)>,
}

impl Stage {
    /// Creates an empty stage with an in-memory loader.
    #[must_use]
    pub fn new(config: RendererConfig) -> Self {
        Self::with_loader(config, Box::new(MemoryLoader::new()))
    }

    /// Creates an empty stage using `loader` for source props.
    #[must_use]
    pub fn with_loader(config: RendererConfig, loader: Box<dyn ResourceLoader>) -> Self {
        Self {
            graph: SceneGraph::new(),
            kinds: KindRegistry::new(),
            instances: InstanceTable::new(),
            sources: Sources::default(),
            loader,
            config,
            on_load_error: None,
            load_failures: Vec::new(),
        }
    }

    /// Returns the scene graph.
    #[must_use]
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Returns the scene graph mutably.
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// Returns the custom kind registry.
    #[must_use]
    pub fn kinds(&self) -> &KindRegistry {
        &self.kinds
    }

    /// Returns the custom kind registry mutably.
    pub fn kinds_mut(&mut self) -> &mut KindRegistry {
        &mut self.kinds
    }

    /// Returns the instance side table.
    #[must_use]
    pub fn instances(&self) -> &InstanceTable {
        &self.instances
    }

    /// Returns the pending-load table.
    #[must_use]
    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    /// Returns the resource loader.
    pub fn loader_mut(&mut self) -> &mut dyn ResourceLoader {
        &mut *self.loader
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Returns the kind tag of a node created by the renderer.
    #[must_use]
    pub fn kind_of(&self, node: NodeId) -> Option<&Kind> {
        self.instances.kind(node)
    }

    /// Returns the built-in kind whose setters apply to `node`.
    ///
    /// Custom kinds use the setters of the built-in kind with the same
    /// scene-graph shape.
    #[must_use]
    pub fn setter_kind(&self, node: NodeId) -> BuiltinKind {
        self.instances
            .kind(node)
            .and_then(Kind::builtin)
            .unwrap_or_else(|| BuiltinKind::from_shape(self.graph.shape(node)))
    }

    /// Replaces the lifecycle hooks of a renderer-created node.
    ///
    /// Returns `false` if the renderer does not manage `node`.
    pub fn attach_hooks(&mut self, node: NodeId, hooks: LifecycleHooks) -> bool {
        match self.instances.get_mut(node) {
            Some(meta) => {
                meta.hooks = (!hooks.is_empty()).then_some(hooks);
                true
            }
            None => false,
        }
    }

    /// Sets the callback receiving resource load failures.
    pub fn set_load_error_handler(&mut self, handler: Option<LoadErrorHandler>) {
        self.on_load_error = handler;
    }

    pub(crate) fn track(&mut self, node: NodeId, meta: InstanceMeta) {
        self.instances.insert(node, meta);
    }

    /// Drops the bookkeeping of a node leaving the renderer's control.
    pub(crate) fn release(&mut self, node: NodeId) -> Option<InstanceMeta> {
        self.sources.forget(node);
        self.instances.remove(node)
    }

    /// Resolves `source` and shows it on `node` once available.
    pub(crate) fn assign_source(&mut self, node: NodeId, source: &Source) {
        match self.loader.resolve(source) {
            Resolution::Ready(texture) => {
                self.sources.forget(node);
                self.graph.set_texture(node, Some(texture));
            }
            Resolution::Pending(ticket) => self.sources.wait(node, ticket),
            Resolution::Failed(error) => self.report_load_failure(node, error),
        }
    }

    /// Clears the source of `node`, cancelling any pending load.
    pub(crate) fn clear_source(&mut self, node: NodeId) {
        self.sources.forget(node);
        self.graph.set_texture(node, None);
    }

    /// Resolves animation frames. Frames that are not resident are skipped.
    pub(crate) fn resolve_frames(&mut self, node: NodeId, sources: &[Source]) -> Vec<TextureId> {
        let mut frames = Vec::with_capacity(sources.len());
        for source in sources {
            match self.loader.resolve(source) {
                Resolution::Ready(texture) => frames.push(texture),
                Resolution::Pending(ticket) => {
                    self.loader.finished(ticket);
                    self.report_load_failure(
                        node,
                        LoadError {
                            resource: source.clone(),
                            reason: String::from("animation frames must be resident"),
                        },
                    );
                }
                Resolution::Failed(error) => self.report_load_failure(node, error),
            }
        }
        frames
    }

    /// Delivers the outcome of an asynchronous load.
    ///
    /// Returns the nodes whose content changed.
    pub(crate) fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<TextureId, LoadError>,
    ) -> Vec<NodeId> {
        self.loader.finished(ticket);
        let nodes: Vec<NodeId> = self
            .sources
            .take(ticket)
            .into_iter()
            .filter(|node| self.graph.is_alive(*node))
            .collect();
        match result {
            Ok(texture) => {
                for &node in &nodes {
                    self.graph.set_texture(node, Some(texture));
                }
                nodes
            }
            Err(error) => {
                for node in nodes {
                    self.report_load_failure(node, error.clone());
                }
                Vec::new()
            }
        }
    }

    fn report_load_failure(&mut self, node: NodeId, error: LoadError) {
        warn!("{} keeps its previous content: {}", node, error);
        self.load_failures.push((node, error));
    }

    /// Takes the queued load failures together with the handler that should
    /// receive them. Failures are dropped when no handler is set.
    pub(crate) fn take_load_failures(
        &mut self,
    ) -> Option<(LoadErrorHandler, Vec<(NodeId, LoadError)>)> {
        if self.load_failures.is_empty() {
            return None;
        }
        let failures = core::mem::take(&mut self.load_failures);
        self.on_load_error
            .clone()
            .map(|handler| (handler, failures))
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(RendererConfig::DEFAULT)
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("graph", &self.graph)
            .field("kinds", &self.kinds)
            .field("instances", &self.instances)
            .field("sources", &self.sources)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
