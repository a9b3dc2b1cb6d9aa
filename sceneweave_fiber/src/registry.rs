// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Custom kind registration.
//!
//! A custom kind takes over construction of its nodes through a `create`
//! callback and may add lifecycle hooks. Hooks are plain callbacks receiving
//! the scene graph; they are stored in the instance side table, never on the
//! node itself.

use std::fmt;
use std::rc::Rc;

use hashbrown::HashMap;
use sceneweave_core::node::{NodeId, SceneGraph};
use tracing::warn;

use crate::config::DestroyPolicy;
use crate::error::{Error, HookError, Result};
use crate::kind::{BuiltinKind, ComponentRef, Kind, KindName};
use crate::props::Props;

/// Builds the node of a custom kind from its initial props.
pub type CreateFn = Rc<dyn Fn(&mut SceneGraph, &Props) -> Result<NodeId, HookError>>;

/// Called with the node and its parent (`None` when run before attachment).
pub type MountFn = Rc<dyn Fn(&mut SceneGraph, NodeId, Option<NodeId>) -> Result<(), HookError>>;

/// Called with the node and its old and new props.
pub type ApplyPropsFn = Rc<dyn Fn(&mut SceneGraph, NodeId, &Props, &Props) -> Result<(), HookError>>;

/// When `did_mount` runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MountTiming {
    /// Once the node is attached to its parent, in a separate pass after the
    /// commit. The hook receives the parent.
    #[default]
    AfterAttach,
    /// Right after the node's initial children are appended, before it is
    /// attached anywhere. The hook receives no parent.
    OnCreate,
}

/// Optional lifecycle hooks of a node.
#[derive(Clone, Default)]
pub struct LifecycleHooks {
    /// Runs once the node exists; see [`MountTiming`].
    pub did_mount: Option<MountFn>,
    /// Runs before the node is detached, with its parent.
    pub will_unmount: Option<MountFn>,
    /// Replaces the default prop applier for this node.
    pub apply_props: Option<ApplyPropsFn>,
    /// When `did_mount` runs.
    pub mount_timing: MountTiming,
}

impl LifecycleHooks {
    /// Returns whether no hook is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.did_mount.is_none() && self.will_unmount.is_none() && self.apply_props.is_none()
    }

    /// Sets the mount hook.
    #[must_use]
    pub fn did_mount(
        mut self,
        f: impl Fn(&mut SceneGraph, NodeId, Option<NodeId>) -> Result<(), HookError> + 'static,
    ) -> Self {
        self.did_mount = Some(Rc::new(f));
        self
    }

    /// Sets the unmount hook.
    #[must_use]
    pub fn will_unmount(
        mut self,
        f: impl Fn(&mut SceneGraph, NodeId, Option<NodeId>) -> Result<(), HookError> + 'static,
    ) -> Self {
        self.will_unmount = Some(Rc::new(f));
        self
    }

    /// Sets the prop hook.
    #[must_use]
    pub fn apply_props(
        mut self,
        f: impl Fn(&mut SceneGraph, NodeId, &Props, &Props) -> Result<(), HookError> + 'static,
    ) -> Self {
        self.apply_props = Some(Rc::new(f));
        self
    }

    /// Sets when `did_mount` runs.
    #[must_use]
    pub fn mount_timing(mut self, timing: MountTiming) -> Self {
        self.mount_timing = timing;
        self
    }
}

impl fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("did_mount", &self.did_mount.is_some())
            .field("will_unmount", &self.will_unmount.is_some())
            .field("apply_props", &self.apply_props.is_some())
            .field("mount_timing", &self.mount_timing)
            .finish()
    }
}

/// The registration record of a custom kind.
#[derive(Clone)]
pub struct CustomKind {
    /// Builds the node.
    pub create: CreateFn,
    /// Optional lifecycle hooks.
    pub hooks: LifecycleHooks,
    /// Destroy policy; the renderer default applies when `None`.
    pub destroy: Option<DestroyPolicy>,
}

impl CustomKind {
    /// Creates a record from a construction callback.
    pub fn new(
        create: impl Fn(&mut SceneGraph, &Props) -> Result<NodeId, HookError> + 'static,
    ) -> Self {
        Self {
            create: Rc::new(create),
            hooks: LifecycleHooks::default(),
            destroy: None,
        }
    }

    /// Sets the lifecycle hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: LifecycleHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Sets the destroy policy.
    ///
    /// The policy also applies when the node is torn down as part of an
    /// ancestor's subtree: a node that is not destroyed is detached from its
    /// parent instead and keeps its own children.
    #[must_use]
    pub fn with_destroy(mut self, destroy: DestroyPolicy) -> Self {
        self.destroy = Some(destroy);
        self
    }
}

impl fmt::Debug for CustomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomKind")
            .field("hooks", &self.hooks)
            .field("destroy", &self.destroy)
            .finish_non_exhaustive()
    }
}

/// Table of registered custom kinds.
#[derive(Debug, Default)]
pub struct KindRegistry {
    custom: HashMap<KindName, CustomKind>,
}

impl KindRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a custom kind.
    ///
    /// Fails with [`Error::InvalidKind`] when `name` is a built-in kind.
    /// Registering an existing custom name replaces the previous record.
    pub fn register(&mut self, name: &str, kind: CustomKind) -> Result<ComponentRef> {
        let name = Self::validate(name)?;
        self.insert(name.clone(), kind);
        Ok(ComponentRef::new(name))
    }

    /// Checks that `name` may be registered as a custom kind.
    pub(crate) fn validate(name: &str) -> Result<KindName> {
        if BuiltinKind::from_name(name).is_some() {
            return Err(Error::InvalidKind(String::from(name)));
        }
        Ok(KindName::new(name))
    }

    pub(crate) fn insert(&mut self, name: KindName, kind: CustomKind) {
        if self.custom.insert(name.clone(), kind).is_some() {
            warn!("custom kind `{}` registered twice; keeping the latest", name);
        }
    }

    /// Resolves a kind name.
    pub fn resolve(&self, name: &KindName) -> Result<Kind> {
        if let Some(builtin) = BuiltinKind::from_name(name.as_str()) {
            return Ok(Kind::Builtin(builtin));
        }
        if self.custom.contains_key(name) {
            return Ok(Kind::Custom(name.clone()));
        }
        Err(Error::UnknownKind(String::from(name.as_str())))
    }

    /// Returns the record of a custom kind.
    #[must_use]
    pub fn custom(&self, name: &KindName) -> Option<&CustomKind> {
        self.custom.get(name)
    }

    /// Returns whether `name` is registered as a custom kind.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.custom.contains_key(&KindName::new(name))
    }
}
