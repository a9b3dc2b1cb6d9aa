// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained 2D scene graph.
//!
//! `sceneweave_core` provides the node tree that the reconciler in
//! `sceneweave_fiber` mutates. It is `no_std` compatible (with `alloc`) and
//! uses struct-of-arrays storage with generational index handles.
//!
//! # Architecture
//!
//! ```text
//!   reconciler / animation host
//!       │  create, add_child, insert_before, set_*, destroy
//!       ▼
//!   SceneGraph ──► evaluate() ──► SceneChanges ──► Presenter::present()
//! ```
//!
//! **[`node`]**: the node tree: [`NodeId`](node::NodeId) handles, topology,
//! local properties (position, scale, pivot, anchor, skew, rotation, alpha,
//! visibility), [`Content`](node::Content) and a generic attribute table.
//!
//! **[`dirty`]**: Multi-channel dirty tracking via `understory_dirty`.
//! TRANSFORM and APPEARANCE propagate to descendants; CONTENT is
//! local-only; TOPOLOGY triggers a traversal rebuild.
//!
//! **[`backend`]**: The [`Presenter`](backend::Presenter) trait that
//! render targets implement to consume evaluated changes.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod dirty;
pub mod node;

pub use kurbo;
