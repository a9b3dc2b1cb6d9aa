// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation contract for render targets.
//!
//! The scene graph never draws. A render target implements [`Presenter`] and
//! is handed the [`SceneChanges`] produced by
//! [`SceneGraph::evaluate`](crate::node::SceneGraph::evaluate) each frame:
//!
//! ```rust,ignore
//! fn on_frame() {
//!     // Mutate: reconciler commits, animation ticks.
//!     // Evaluate: drain dirty channels, recompute world properties.
//!     let changes = graph.evaluate();
//!     // Present: apply incremental changes to the target.
//!     presenter.present(&graph, &changes);
//! }
//! ```

use crate::node::{SceneChanges, SceneGraph};

/// Applies evaluated scene changes to a presentation target.
pub trait Presenter {
    /// Applies the given [`SceneChanges`], reading current property values
    /// from `graph` as needed.
    fn present(&mut self, graph: &SceneGraph, changes: &SceneChanges);
}
