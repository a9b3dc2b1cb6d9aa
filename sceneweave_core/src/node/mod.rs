// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene node data model.
//!
//! A *node* is an element of the retained scene. Each node has:
//!
//! - An identity ([`NodeId`]): a generational handle that becomes stale when
//!   the node is destroyed.
//! - A [`NodeShape`] fixed at construction, naming which constructor built it.
//! - Topology: parent, first-child and sibling links. Sibling order is paint
//!   order.
//! - **Local properties** ([`LocalProps`]): position, scale, pivot, anchor,
//!   skew, rotation, alpha and visibility.
//! - [`Content`]: nothing, a texture, animation frames, text, or a list of
//!   graphics commands.
//! - A string-keyed table of generic [`Attr`]ibutes for everything else.
//! - **Computed properties** produced by [`evaluate`](SceneGraph::evaluate):
//!   world transform, effective alpha and effective visibility.

mod attr;
mod content;
mod evaluate;
mod id;
mod store;
mod traverse;

pub use attr::{Attr, Handler};
pub use content::{
    Content, GraphicsCommand, GraphicsContext, TextAlign, TextContent, TextStyle, TextureId,
};
pub use evaluate::SceneChanges;
pub use id::{INVALID, NodeId};
pub use store::{DestroyOptions, LocalProps, NodeShape, SceneGraph};
pub use traverse::Children;
