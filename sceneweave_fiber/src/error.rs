// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use sceneweave_core::node::NodeId;

/// Error returned by lifecycle hooks of custom kinds.
pub type HookError = Box<dyn std::error::Error>;

/// Result alias used throughout this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Which lifecycle hook of a custom kind failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// The construction callback.
    Create,
    /// Runs once the node is created or attached.
    DidMount,
    /// Runs before the node is detached.
    WillUnmount,
    /// Replaces the default prop applier.
    ApplyProps,
}

impl HookKind {
    /// Returns the hook name as written in registrations.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::DidMount => "didMount",
            Self::WillUnmount => "willUnmount",
            Self::ApplyProps => "applyProps",
        }
    }
}

impl core::fmt::Display for HookKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors surfaced by the renderer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An element names a kind that is neither built in nor registered.
    #[error("unknown kind `{0}`")]
    UnknownKind(String),

    /// A root already exists for this container.
    #[error("container {0} already has a root")]
    DuplicateRoot(NodeId),

    /// A custom kind registration collides with a built-in kind.
    #[error("`{0}` is a built-in kind and cannot be registered")]
    InvalidKind(String),

    /// The container handed to `create_root` is not a live scene node.
    #[error("container {0} is not a live scene node")]
    UnknownContainer(NodeId),

    /// Raw text appeared where only typed nodes are allowed.
    #[error("raw text {0:?} must be wrapped in a text kind")]
    RawText(String),

    /// The element tree nests deeper than the configured limit.
    #[error("element tree exceeds the maximum depth of {0}")]
    DepthExceeded(usize),

    /// The session that owned a root has been dropped.
    #[error("the renderer session has been dropped")]
    SessionClosed,

    /// A lifecycle hook of a custom kind failed.
    #[error("{hook} hook of `{kind}` failed")]
    Hook {
        /// Kind whose hook failed.
        kind: String,
        /// Which hook failed.
        hook: HookKind,
        /// The error returned by the hook.
        #[source]
        source: HookError,
    },
}

impl Error {
    pub(crate) fn hook(kind: &str, hook: HookKind, source: HookError) -> Self {
        Self::Hook {
            kind: String::from(kind),
            hook,
            source,
        }
    }
}
