// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property management.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Affine, Point, Vec2};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::attr::Attr;
use super::content::{Content, GraphicsContext, TextContent, TextStyle, TextureId};
use super::id::{INVALID, NodeId};
use super::traverse::Children;
use crate::dirty;

/// Which constructor produced a node.
///
/// The shape is fixed for the lifetime of the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeShape {
    /// A grouping node.
    Container,
    /// A grouping node optimized for many sprite children.
    ParticleContainer,
    /// A textured quad.
    Sprite,
    /// A texture repeated over an area.
    TilingSprite,
    /// A sprite cycling through frames.
    AnimatedSprite,
    /// A texture stretched with fixed-size corners.
    NineSlicePlane,
    /// Canvas-rendered text.
    Text,
    /// Text rendered from a bitmap font.
    BitmapText,
    /// Retained vector graphics.
    Graphics,
}

/// Options for [`SceneGraph::destroy`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DestroyOptions {
    /// Destroy the whole subtree (post-order) instead of detaching the
    /// children and leaving them alive.
    pub children: bool,
}

/// Per-node local properties.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalProps {
    /// Translation relative to the parent.
    pub position: Point,
    /// Scale factors.
    pub scale: Vec2,
    /// Origin of rotation, scale and skew, in local coordinates.
    pub pivot: Point,
    /// Normalized content origin for textured and text nodes.
    pub anchor: Point,
    /// Skew angles in radians.
    pub skew: Vec2,
    /// Rotation in radians.
    pub rotation: f64,
    /// Opacity multiplier.
    pub alpha: f64,
    /// Whether the node and its subtree are drawn.
    pub visible: bool,
}

impl LocalProps {
    /// The properties every node starts with.
    pub const DEFAULT: Self = Self {
        position: Point::ORIGIN,
        scale: Vec2::new(1.0, 1.0),
        pivot: Point::ORIGIN,
        anchor: Point::ORIGIN,
        skew: Vec2::ZERO,
        rotation: 0.0,
        alpha: 1.0,
        visible: true,
    };

    /// Returns the local transform described by these properties.
    #[must_use]
    pub fn transform(&self) -> Affine {
        Affine::translate(self.position.to_vec2())
            * Affine::rotate(self.rotation)
            * Affine::skew(self.skew.x.tan(), self.skew.y.tan())
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
            * Affine::translate(-self.pivot.to_vec2())
    }
}

impl Default for LocalProps {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Struct-of-arrays storage for all scene nodes.
///
/// Nodes are addressed by [`NodeId`] handles. Destroyed nodes are recycled
/// via a free list, and generation counters prevent stale handle access.
#[derive(Debug)]
pub struct SceneGraph {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local state (set by callers) --
    pub(crate) shape: Vec<NodeShape>,
    pub(crate) local: Vec<LocalProps>,
    pub(crate) content: Vec<Content>,
    pub(crate) attributes: Vec<BTreeMap<String, Attr>>,

    // -- Computed properties (written by evaluate) --
    pub(crate) world_transform: Vec<Affine>,
    pub(crate) effective_alpha: Vec<f64>,
    pub(crate) effective_visible: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates an empty scene graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            shape: Vec::new(),
            local: Vec::new(),
            content: Vec::new(),
            attributes: Vec::new(),
            world_transform: Vec::new(),
            effective_alpha: Vec::new(),
            effective_visible: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    // -- Constructors --

    /// Creates a detached node of the given shape with default properties.
    pub fn create(&mut self, shape: NodeShape, content: Content) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.shape[i] = shape;
            self.local[i] = LocalProps::DEFAULT;
            self.content[i] = content;
            self.attributes[i].clear();
            self.world_transform[i] = Affine::IDENTITY;
            self.effective_alpha[i] = 1.0;
            self.effective_visible[i] = true;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.shape.push(shape);
            self.local.push(LocalProps::DEFAULT);
            self.content.push(content);
            self.attributes.push(BTreeMap::new());
            self.world_transform.push(Affine::IDENTITY);
            self.effective_alpha.push(1.0);
            self.effective_visible.push(true);
            self.generation.push(0);
            idx
        };

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::APPEARANCE, &EagerPolicy);

        NodeId::new(idx, self.generation[idx as usize])
    }

    /// Creates an empty container.
    pub fn create_container(&mut self) -> NodeId {
        self.create(NodeShape::Container, Content::Empty)
    }

    /// Creates a sprite showing `texture`, or nothing if `None`.
    pub fn create_sprite(&mut self, texture: Option<TextureId>) -> NodeId {
        self.create(
            NodeShape::Sprite,
            texture.map_or(Content::Empty, Content::Texture),
        )
    }

    /// Creates a text node. Text and style are construction arguments.
    pub fn create_text(&mut self, text: &str, style: TextStyle) -> NodeId {
        self.create(
            NodeShape::Text,
            Content::Text(TextContent {
                text: String::from(text),
                style,
            }),
        )
    }

    /// Creates an empty graphics node.
    pub fn create_graphics(&mut self) -> NodeId {
        self.create(NodeShape::Graphics, Content::Graphics(Vec::new()))
    }

    /// Destroys a node and releases its content.
    ///
    /// With `options.children` the whole subtree is destroyed, deepest nodes
    /// first. Without it the children are detached and stay alive as
    /// parentless nodes; whoever still holds their handles owns them.
    ///
    /// Returns the number of destroyed nodes.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy(&mut self, id: NodeId, options: DestroyOptions) -> usize {
        self.validate(id);
        let kids: Vec<NodeId> = self.children(id).collect();
        let mut destroyed = 0;
        for kid in kids {
            if options.children {
                destroyed += self.destroy(kid, options);
            } else {
                self.remove_from_parent(kid);
            }
        }

        let idx = id.idx;
        if self.parent[idx as usize] != INVALID {
            self.detach(idx);
        }
        self.content[idx as usize] = Content::Empty;
        self.attributes[idx as usize].clear();
        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        destroyed + 1
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// If `child` is already attached (to `parent` or elsewhere) it is moved.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or if `child` is an ancestor of
    /// `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        assert!(
            !self.is_ancestor_or_self(child.idx, parent.idx),
            "cannot attach a node below itself"
        );
        if self.parent[child.idx as usize] != INVALID {
            self.detach(child.idx);
        }

        let p = parent.idx;
        let c = child.idx;
        self.parent[c as usize] = p;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        self.link_dirty(c, p);
    }

    /// Inserts `child` immediately before `sibling` in the sibling's parent.
    ///
    /// If `child` is already attached it is moved.
    ///
    /// # Panics
    ///
    /// Panics if handles are stale, `sibling` has no parent, or `child` is
    /// `sibling` or one of its ancestors.
    pub fn insert_before(&mut self, child: NodeId, sibling: NodeId) {
        self.validate(child);
        self.validate(sibling);
        assert!(child != sibling, "cannot insert a node before itself");
        let p = self.parent[sibling.idx as usize];
        assert!(p != INVALID, "sibling has no parent");
        assert!(
            !self.is_ancestor_or_self(child.idx, p),
            "cannot attach a node below itself"
        );
        if self.parent[child.idx as usize] != INVALID {
            self.detach(child.idx);
        }

        let c = child.idx;
        let s = sibling.idx;
        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = self.prev_sibling[s as usize];

        if self.prev_sibling[s as usize] != INVALID {
            self.next_sibling[self.prev_sibling[s as usize] as usize] = c;
        } else {
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[s as usize] = c;

        self.link_dirty(c, p);
    }

    /// Removes `child` from its current parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] != INVALID,
            "node has no parent"
        );
        self.detach(child.idx);
        self.mark_subtree_inherited_dirty(child.idx);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.handle(p))
    }

    /// Returns an iterator over the direct children of a node, in paint
    /// order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the number of direct children.
    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// Returns the parentless live nodes.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx))
            .map(|idx| self.handle(idx))
            .collect()
    }

    // -- Property getters --

    /// Returns the shape a node was constructed with.
    #[must_use]
    pub fn shape(&self, id: NodeId) -> NodeShape {
        self.validate(id);
        self.shape[id.idx as usize]
    }

    /// Returns the local properties of a node.
    #[must_use]
    pub fn local(&self, id: NodeId) -> &LocalProps {
        self.validate(id);
        &self.local[id.idx as usize]
    }

    /// Returns the content of a node.
    #[must_use]
    pub fn content(&self, id: NodeId) -> &Content {
        self.validate(id);
        &self.content[id.idx as usize]
    }

    /// Returns the text of a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.content(id) {
            Content::Text(t) => Some(&t.text),
            _ => None,
        }
    }

    /// Returns the texture shown by a node, if any.
    #[must_use]
    pub fn texture(&self, id: NodeId) -> Option<TextureId> {
        match self.content(id) {
            Content::Texture(t) => Some(*t),
            Content::Frames {
                frames, current, ..
            } => frames.get(*current).copied(),
            _ => None,
        }
    }

    /// Returns a generic attribute.
    #[must_use]
    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&Attr> {
        self.validate(id);
        self.attributes[id.idx as usize].get(key)
    }

    /// Returns all generic attributes of a node, ordered by key.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &BTreeMap<String, Attr> {
        self.validate(id);
        &self.attributes[id.idx as usize]
    }

    /// Returns the computed world transform of a node.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn world_transform(&self, id: NodeId) -> Affine {
        self.validate(id);
        self.world_transform[id.idx as usize]
    }

    /// Returns the computed effective alpha of a node.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn effective_alpha(&self, id: NodeId) -> f64 {
        self.validate(id);
        self.effective_alpha[id.idx as usize]
    }

    /// Returns whether the node and all its ancestors are visible.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn effective_visible(&self, id: NodeId) -> bool {
        self.validate(id);
        self.effective_visible[id.idx as usize]
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the position.
    pub fn set_position(&mut self, id: NodeId, position: Point) {
        self.update_transform(id, |l| l.position = position);
    }

    /// Sets the x coordinate of the position.
    pub fn set_x(&mut self, id: NodeId, x: f64) {
        self.update_transform(id, |l| l.position.x = x);
    }

    /// Sets the y coordinate of the position.
    pub fn set_y(&mut self, id: NodeId, y: f64) {
        self.update_transform(id, |l| l.position.y = y);
    }

    /// Sets the scale factors.
    pub fn set_scale(&mut self, id: NodeId, scale: Vec2) {
        self.update_transform(id, |l| l.scale = scale);
    }

    /// Sets the pivot.
    pub fn set_pivot(&mut self, id: NodeId, pivot: Point) {
        self.update_transform(id, |l| l.pivot = pivot);
    }

    /// Sets the skew angles.
    pub fn set_skew(&mut self, id: NodeId, skew: Vec2) {
        self.update_transform(id, |l| l.skew = skew);
    }

    /// Sets the rotation in radians.
    pub fn set_rotation(&mut self, id: NodeId, rotation: f64) {
        self.update_transform(id, |l| l.rotation = rotation);
    }

    /// Sets the content anchor.
    ///
    /// The anchor shifts content, not the node's coordinate space, so it is
    /// tracked on the content channel.
    pub fn set_anchor(&mut self, id: NodeId, anchor: Point) {
        self.validate(id);
        self.local[id.idx as usize].anchor = anchor;
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Sets the alpha.
    pub fn set_alpha(&mut self, id: NodeId, alpha: f64) {
        self.validate(id);
        self.local[id.idx as usize].alpha = alpha;
        self.dirty.mark_with(id.idx, dirty::APPEARANCE, &EagerPolicy);
    }

    /// Sets the visibility flag.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.validate(id);
        self.local[id.idx as usize].visible = visible;
        self.dirty.mark_with(id.idx, dirty::APPEARANCE, &EagerPolicy);
    }

    /// Replaces the whole content of a node.
    pub fn set_content(&mut self, id: NodeId, content: Content) {
        self.validate(id);
        self.content[id.idx as usize] = content;
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Shows `texture` on the node, or nothing if `None`.
    ///
    /// For an animated node the frame list is replaced by the single texture.
    pub fn set_texture(&mut self, id: NodeId, texture: Option<TextureId>) {
        self.set_content(id, texture.map_or(Content::Empty, Content::Texture));
    }

    /// Sets the text of a node, turning it into a text node if needed.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.validate(id);
        match &mut self.content[id.idx as usize] {
            Content::Text(t) => {
                t.text.clear();
                t.text.push_str(text);
            }
            other => {
                *other = Content::Text(TextContent {
                    text: String::from(text),
                    style: TextStyle::default(),
                });
            }
        }
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Sets the style of a text node. Ignored for other content.
    pub fn set_text_style(&mut self, id: NodeId, style: TextStyle) {
        self.validate(id);
        if let Content::Text(t) = &mut self.content[id.idx as usize] {
            t.style = style;
            self.dirty.mark(id.idx, dirty::CONTENT);
        }
    }

    /// Replaces the frames of an animated node, keeping the play state.
    pub fn set_frames(&mut self, id: NodeId, new_frames: Vec<TextureId>) {
        self.validate(id);
        let playing = matches!(
            self.content[id.idx as usize],
            Content::Frames { playing: true, .. }
        );
        self.set_content(
            id,
            Content::Frames {
                frames: new_frames,
                current: 0,
                playing,
            },
        );
    }

    /// Jumps to a frame of an animated node, wrapping around the frame count.
    pub fn set_current_frame(&mut self, id: NodeId, frame: usize) {
        self.validate(id);
        if let Content::Frames {
            frames, current, ..
        } = &mut self.content[id.idx as usize]
        {
            *current = if frames.is_empty() {
                0
            } else {
                frame % frames.len()
            };
            self.dirty.mark(id.idx, dirty::CONTENT);
        }
    }

    /// Starts or stops frame playback of an animated node.
    pub fn set_playing(&mut self, id: NodeId, play: bool) {
        self.validate(id);
        if let Content::Frames { playing, .. } = &mut self.content[id.idx as usize] {
            *playing = play;
            self.dirty.mark(id.idx, dirty::CONTENT);
        }
    }

    /// Re-records the graphics commands of a node.
    ///
    /// The callback receives a context holding the current commands; it is
    /// responsible for clearing them if it wants to start over.
    pub fn draw(&mut self, id: NodeId, f: impl FnOnce(&mut GraphicsContext)) {
        self.validate(id);
        let slot = &mut self.content[id.idx as usize];
        let commands = match core::mem::take(slot) {
            Content::Graphics(commands) => commands,
            _ => Vec::new(),
        };
        let mut ctx = GraphicsContext::from_commands(commands);
        f(&mut ctx);
        *slot = Content::Graphics(ctx.into_commands());
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Sets a generic attribute.
    pub fn set_attribute(&mut self, id: NodeId, key: &str, value: Attr) {
        self.validate(id);
        self.attributes[id.idx as usize].insert(String::from(key), value);
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Removes a generic attribute, returning its previous value.
    pub fn remove_attribute(&mut self, id: NodeId, key: &str) -> Option<Attr> {
        self.validate(id);
        let old = self.attributes[id.idx as usize].remove(key);
        if old.is_some() {
            self.dirty.mark(id.idx, dirty::CONTENT);
        }
        old
    }

    /// Invokes the handler stored under attribute `event`, if any.
    ///
    /// Returns whether a handler ran.
    pub fn dispatch(&self, id: NodeId, event: &str) -> bool {
        match self.attribute(id, event) {
            Some(Attr::Handler(handler)) => {
                handler.call(id);
                true
            }
            _ => false,
        }
    }

    // -- Raw-index accessors for presenters --
    //
    // These accept raw slot indices (as found in `SceneChanges`) rather than
    // `NodeId` handles, skipping generation validation.

    /// Returns the computed world transform at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn world_transform_at(&self, idx: u32) -> Affine {
        assert!(idx < self.len, "slot index {idx} out of range (len {})", self.len);
        self.world_transform[idx as usize]
    }

    /// Returns the computed effective alpha at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn effective_alpha_at(&self, idx: u32) -> f64 {
        assert!(idx < self.len, "slot index {idx} out of range (len {})", self.len);
        self.effective_alpha[idx as usize]
    }

    /// Returns the content at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn content_at(&self, idx: u32) -> &Content {
        assert!(idx < self.len, "slot index {idx} out of range (len {})", self.len);
        &self.content[idx as usize]
    }

    // -- Internal helpers --

    pub(crate) fn handle(&self, idx: u32) -> NodeId {
        NodeId::new(idx, self.generation[idx as usize])
    }

    /// Panics if the handle is stale.
    fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn update_transform(&mut self, id: NodeId, f: impl FnOnce(&mut LocalProps)) {
        self.validate(id);
        f(&mut self.local[id.idx as usize]);
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    fn is_ancestor_or_self(&self, ancestor: u32, mut idx: u32) -> bool {
        while idx != INVALID {
            if idx == ancestor {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        false
    }

    /// Adds inherited-channel dependency edges from `c` to `p` and marks the
    /// topology change.
    fn link_dirty(&mut self, c: u32, p: u32) {
        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);
        let _ = self.dirty.add_dependency(c, p, dirty::APPEARANCE);
        self.mark_subtree_inherited_dirty(c);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Unlinks `idx` from its parent's child list and drops the inherited
    /// dependency edges.
    fn detach(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;

        self.dirty.remove_dependency(idx, p, dirty::TRANSFORM);
        self.dirty.remove_dependency(idx, p, dirty::APPEARANCE);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    fn mark_subtree_inherited_dirty(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::APPEARANCE, &EagerPolicy);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::node::Handler;

    #[test]
    fn create_and_destroy() {
        let mut graph = SceneGraph::new();
        let id = graph.create_container();
        assert!(graph.is_alive(id));
        assert_eq!(graph.destroy(id, DestroyOptions::default()), 1);
        assert!(!graph.is_alive(id));
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut graph = SceneGraph::new();
        let id1 = graph.create_container();
        graph.destroy(id1, DestroyOptions::default());
        let id2 = graph.create_sprite(None);
        assert!(!graph.is_alive(id1));
        assert!(graph.is_alive(id2));
        assert_eq!(id1.idx, id2.idx);
        assert_ne!(id1.generation, id2.generation);
        assert_eq!(graph.shape(id2), NodeShape::Sprite);
    }

    #[test]
    fn add_child_keeps_call_order() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_container();
        let a = graph.create_container();
        let b = graph.create_container();

        graph.add_child(parent, a);
        graph.add_child(parent, b);

        assert_eq!(graph.parent(a), Some(parent));
        let kids: Vec<_> = graph.children(parent).collect();
        assert_eq!(kids, vec![a, b]);
    }

    #[test]
    fn insert_before_works() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_container();
        let a = graph.create_container();
        let b = graph.create_container();
        let c = graph.create_container();

        graph.add_child(parent, a);
        graph.add_child(parent, c);
        graph.insert_before(b, c);

        let kids: Vec<_> = graph.children(parent).collect();
        assert_eq!(kids, vec![a, b, c]);
    }

    #[test]
    fn insert_before_moves_attached_child() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_container();
        let a = graph.create_container();
        let b = graph.create_container();
        let c = graph.create_container();
        graph.add_child(parent, a);
        graph.add_child(parent, b);
        graph.add_child(parent, c);

        graph.insert_before(c, a);

        let kids: Vec<_> = graph.children(parent).collect();
        assert_eq!(kids, vec![c, a, b]);
    }

    #[test]
    fn add_child_moves_between_parents() {
        let mut graph = SceneGraph::new();
        let p1 = graph.create_container();
        let p2 = graph.create_container();
        let child = graph.create_container();

        graph.add_child(p1, child);
        graph.add_child(p2, child);
        assert_eq!(graph.parent(child), Some(p2));
        assert_eq!(graph.child_count(p1), 0);
    }

    #[test]
    fn destroy_with_children_destroys_subtree() {
        let mut graph = SceneGraph::new();
        let root = graph.create_container();
        let mid = graph.create_container();
        let leaf = graph.create_sprite(Some(TextureId(3)));
        graph.add_child(root, mid);
        graph.add_child(mid, leaf);

        let n = graph.destroy(mid, DestroyOptions { children: true });
        assert_eq!(n, 2);
        assert!(!graph.is_alive(mid));
        assert!(!graph.is_alive(leaf));
        assert_eq!(graph.child_count(root), 0);
    }

    #[test]
    fn destroy_without_children_detaches_them() {
        let mut graph = SceneGraph::new();
        let mid = graph.create_container();
        let leaf = graph.create_container();
        graph.add_child(mid, leaf);

        graph.destroy(mid, DestroyOptions { children: false });
        assert!(graph.is_alive(leaf));
        assert_eq!(graph.parent(leaf), None);
        assert!(graph.roots().contains(&leaf));
    }

    #[test]
    #[should_panic(expected = "cannot attach a node below itself")]
    fn cycles_are_rejected() {
        let mut graph = SceneGraph::new();
        let a = graph.create_container();
        let b = graph.create_container();
        graph.add_child(a, b);
        graph.add_child(b, a);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_set_position() {
        let mut graph = SceneGraph::new();
        let id = graph.create_container();
        graph.destroy(id, DestroyOptions::default());
        graph.set_position(id, Point::new(1.0, 1.0));
    }

    #[test]
    fn text_setters_keep_style() {
        let mut graph = SceneGraph::new();
        let style = TextStyle {
            font_size: 12.0,
            ..TextStyle::default()
        };
        let id = graph.create_text("a", style.clone());
        graph.set_text(id, "b");
        assert_eq!(graph.text(id), Some("b"));
        match graph.content(id) {
            Content::Text(t) => assert_eq!(t.style, style),
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn draw_records_commands() {
        let mut graph = SceneGraph::new();
        let id = graph.create_graphics();
        graph.draw(id, |g| {
            g.begin_fill(0xff_00_00, 1.0).draw_rect(0.0, 0.0, 10.0, 10.0).end_fill();
        });
        graph.draw(id, |g| {
            g.clear().draw_circle(5.0, 5.0, 2.0);
        });
        match graph.content(id) {
            Content::Graphics(cmds) => assert_eq!(cmds.len(), 1),
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn frames_wrap_current_index() {
        let mut graph = SceneGraph::new();
        let id = graph.create(NodeShape::AnimatedSprite, Content::Empty);
        graph.set_frames(id, vec![TextureId(1), TextureId(2)]);
        graph.set_current_frame(id, 3);
        assert_eq!(graph.texture(id), Some(TextureId(2)));
    }

    #[test]
    fn attributes_round_trip_and_dispatch() {
        use alloc::rc::Rc;
        use core::cell::Cell;

        let mut graph = SceneGraph::new();
        let id = graph.create_container();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        graph.set_attribute(id, "tint", Attr::Color(0xff_ff_ff));
        graph.set_attribute(id, "click", Attr::Handler(Handler::new(move |_| h.set(h.get() + 1))));

        assert_eq!(graph.attribute(id, "tint"), Some(&Attr::Color(0xff_ff_ff)));
        assert!(graph.dispatch(id, "click"));
        assert!(!graph.dispatch(id, "tap"));
        assert_eq!(hits.get(), 1);
        assert!(graph.remove_attribute(id, "tint").is_some());
        assert_eq!(graph.attribute(id, "tint"), None);
    }
}
