// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer configuration.

/// What happens to a node when the reconciler removes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DestroyPolicy {
    /// Release the node through the scene graph's destroy primitive.
    /// When `false` the node is only detached.
    pub destroy: bool,
    /// Destroy the node's subtree along with it. When `false` the children
    /// are detached and left alive for whoever still references them.
    pub destroy_children: bool,
}

impl DestroyPolicy {
    /// Destroy the node and its whole subtree.
    pub const DESTROY_ALL: Self = Self {
        destroy: true,
        destroy_children: true,
    };

    /// Detach only; nothing is released.
    pub const DETACH: Self = Self {
        destroy: false,
        destroy_children: false,
    };
}

impl Default for DestroyPolicy {
    fn default() -> Self {
        Self::DESTROY_ALL
    }
}

/// Configuration for a [`RendererSession`](crate::RendererSession).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RendererConfig {
    /// Destroy policy for built-in kinds and for custom kinds that do not
    /// declare their own.
    pub destroy: DestroyPolicy,
    /// Deepest element nesting the reconciler accepts.
    pub max_depth: usize,
    /// Emit a render request from `reset_after_commit` when a commit
    /// performed no visible mutation.
    pub request_render_on_noop_commit: bool,
}

impl RendererConfig {
    /// The default configuration.
    pub const DEFAULT: Self = Self {
        destroy: DestroyPolicy::DESTROY_ALL,
        max_depth: 256,
        request_render_on_noop_commit: true,
    };

    /// Returns a copy with a different default destroy policy.
    #[must_use]
    pub const fn with_destroy(mut self, destroy: DestroyPolicy) -> Self {
        self.destroy = destroy;
        self
    }

    /// Returns a copy with a different depth limit.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns a copy that does or does not signal no-op commits.
    #[must_use]
    pub const fn with_noop_commit_request(mut self, enabled: bool) -> Self {
        self.request_render_on_noop_commit = enabled;
        self
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
