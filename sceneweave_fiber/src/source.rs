// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resource resolution.
//!
//! Source props are handed to a [`ResourceLoader`]. Resident textures and
//! atlas frames resolve on the spot; URLs return a [`LoadTicket`] and the
//! node keeps its current content until the host reports the outcome through
//! [`RendererSession::complete_load`](crate::RendererSession::complete_load).
//! [`Sources`] remembers which node waits on which ticket, so a late result
//! never overwrites a source that was replaced in the meantime.

use std::fmt;
use std::rc::Rc;

use hashbrown::HashMap;
use sceneweave_core::node::{NodeId, TextureId};

use crate::props::Source;

/// Identifies one asynchronous load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(pub u64);

/// Outcome of asking a loader for a source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The texture is available now.
    Ready(TextureId),
    /// The load is in flight.
    Pending(LoadTicket),
    /// The source cannot be resolved.
    Failed(LoadError),
}

/// A failed resource resolution.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("failed to load {resource:?}: {reason}")]
pub struct LoadError {
    /// The source that failed.
    pub resource: Source,
    /// Why it failed.
    pub reason: String,
}

/// Reports load failures; never called while a commit is running.
pub type LoadErrorHandler = Rc<dyn Fn(NodeId, &LoadError)>;

/// Resolves source props into textures.
pub trait ResourceLoader {
    /// Starts resolving `source`.
    fn resolve(&mut self, source: &Source) -> Resolution;

    /// Called when the ticket's outcome was delivered, so the loader can
    /// forget about it.
    fn finished(&mut self, _ticket: LoadTicket) {}
}

/// An in-memory loader.
///
/// Resident textures resolve to themselves, frames resolve through a name
/// table, and URLs are handed out tickets that the host completes.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    frames: HashMap<String, TextureId>,
    requested: Vec<(LoadTicket, String)>,
    next_ticket: u64,
}

impl MemoryLoader {
    /// Creates an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes an atlas frame available under `name`.
    pub fn insert_frame(&mut self, name: &str, texture: TextureId) {
        self.frames.insert(String::from(name), texture);
    }

    /// Returns the URL loads that have not finished, oldest first.
    #[must_use]
    pub fn requested(&self) -> &[(LoadTicket, String)] {
        &self.requested
    }
}

impl ResourceLoader for MemoryLoader {
    fn resolve(&mut self, source: &Source) -> Resolution {
        match source {
            Source::Texture(id) => Resolution::Ready(*id),
            Source::Frame(name) => match self.frames.get(name) {
                Some(id) => Resolution::Ready(*id),
                None => Resolution::Failed(LoadError {
                    resource: source.clone(),
                    reason: String::from("no such frame"),
                }),
            },
            Source::Url(url) => {
                let ticket = LoadTicket(self.next_ticket);
                self.next_ticket += 1;
                self.requested.push((ticket, url.clone()));
                Resolution::Pending(ticket)
            }
        }
    }

    fn finished(&mut self, ticket: LoadTicket) {
        self.requested.retain(|(t, _)| *t != ticket);
    }
}

/// Tracks which nodes wait on which loads.
#[derive(Default)]
pub struct Sources {
    waiting: HashMap<LoadTicket, Vec<NodeId>>,
    latest: HashMap<NodeId, LoadTicket>,
}

impl Sources {
    /// Records that `node` now waits on `ticket`, superseding any older
    /// request of the node.
    pub(crate) fn wait(&mut self, node: NodeId, ticket: LoadTicket) {
        self.latest.insert(node, ticket);
        self.waiting.entry(ticket).or_default().push(node);
    }

    /// Forgets any pending request of `node`.
    pub(crate) fn forget(&mut self, node: NodeId) {
        self.latest.remove(&node);
    }

    /// Removes `ticket` and returns the nodes whose latest request it is.
    pub(crate) fn take(&mut self, ticket: LoadTicket) -> Vec<NodeId> {
        let nodes = self.waiting.remove(&ticket).unwrap_or_default();
        nodes
            .into_iter()
            .filter(|node| {
                if self.latest.get(node) == Some(&ticket) {
                    self.latest.remove(node);
                    true
                } else {
                    false
                }
            })
            .collect()
    }

    /// Returns the ticket `node` currently waits on.
    #[must_use]
    pub fn pending(&self, node: NodeId) -> Option<LoadTicket> {
        self.latest.get(&node).copied()
    }
}

impl fmt::Debug for Sources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sources")
            .field("tickets", &self.waiting.len())
            .field("nodes", &self.latest.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use sceneweave_core::node::SceneGraph;

    use super::*;

    #[test]
    fn memory_loader_resolves_each_source_form() {
        let mut loader = MemoryLoader::new();
        loader.insert_frame("bunny.png", TextureId(3));

        assert_eq!(
            loader.resolve(&Source::Texture(TextureId(1))),
            Resolution::Ready(TextureId(1))
        );
        assert_eq!(
            loader.resolve(&Source::Frame(String::from("bunny.png"))),
            Resolution::Ready(TextureId(3))
        );
        assert!(matches!(
            loader.resolve(&Source::Frame(String::from("missing"))),
            Resolution::Failed(_)
        ));

        let Resolution::Pending(ticket) = loader.resolve(&Source::Url(String::from("a.png")))
        else {
            panic!("urls load asynchronously");
        };
        assert_eq!(loader.requested().len(), 1);
        loader.finished(ticket);
        assert!(loader.requested().is_empty());
    }

    #[test]
    fn newer_request_supersedes_older_ticket() {
        let mut graph = SceneGraph::new();
        let node = graph.create_sprite(None);
        let mut sources = Sources::default();

        sources.wait(node, LoadTicket(1));
        sources.wait(node, LoadTicket(2));

        assert!(sources.take(LoadTicket(1)).is_empty());
        assert_eq!(sources.take(LoadTicket(2)), [node]);
        assert_eq!(sources.pending(node), None);
    }

    #[test]
    fn forgotten_nodes_are_not_returned() {
        let mut graph = SceneGraph::new();
        let node = graph.create_sprite(None);
        let mut sources = Sources::default();

        sources.wait(node, LoadTicket(7));
        sources.forget(node);
        assert!(sources.take(LoadTicket(7)).is_empty());
    }
}
