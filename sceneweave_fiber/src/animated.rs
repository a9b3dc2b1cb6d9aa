// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animated values written straight onto scene nodes.
//!
//! The reconciler is too coarse for per-frame motion. An [`AnimatedBinding`]
//! connects a set of [`AnimatedValue`]s to a node and, on every
//! [`tick`](AnimatedBinding::tick), writes their current values through the
//! default prop applier (or the node's own `apply_props` hook), bypassing
//! reconciliation. Targets without a live scene node are skipped.

use std::fmt;

use sceneweave_core::node::NodeId;

use crate::apply::apply_props;
use crate::element::HostElement;
use crate::error::{Error, HookKind, Result};
use crate::kind::BuiltinKind;
use crate::props::{PropValue, Props};
use crate::stage::Stage;

/// Something that may be backed by a scene node.
pub trait Animatable {
    /// Returns the backing node, if there is one.
    fn scene_node(&self) -> Option<NodeId>;
}

impl Animatable for NodeId {
    fn scene_node(&self) -> Option<NodeId> {
        Some(*self)
    }
}

impl Animatable for Option<NodeId> {
    fn scene_node(&self) -> Option<NodeId> {
        *self
    }
}

/// A value that changes over time.
pub trait AnimatedValue {
    /// Advances by `dt` seconds. Returns whether the value is still moving.
    fn advance(&mut self, dt: f64) -> bool;

    /// Returns the current value.
    fn snapshot(&self) -> PropValue;

    /// Points the value at a new target. Values without a target ignore it.
    fn set_target(&mut self, _target: f64) {}
}

impl AnimatedValue for f64 {
    fn advance(&mut self, _dt: f64) -> bool {
        false
    }

    fn snapshot(&self) -> PropValue {
        PropValue::Number(*self)
    }

    fn set_target(&mut self, target: f64) {
        *self = target;
    }
}

/// A damped spring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spring {
    /// Current value.
    pub value: f64,
    /// Rest position.
    pub target: f64,
    /// Current velocity, in units per second.
    pub velocity: f64,
    /// Spring constant.
    pub stiffness: f64,
    /// Damping coefficient.
    pub damping: f64,
    /// Mass of the moving end.
    pub mass: f64,
    /// Distance and speed under which the spring snaps to rest.
    pub precision: f64,
}

impl Spring {
    /// Longest step the integrator takes at once.
    const MAX_STEP: f64 = 1.0 / 120.0;

    /// Longest frame time taken into account; longer gaps are clamped.
    const MAX_FRAME: f64 = 0.25;

    /// Creates a spring resting at `value`.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self {
            value,
            target: value,
            velocity: 0.0,
            stiffness: 170.0,
            damping: 26.0,
            mass: 1.0,
            precision: 0.01,
        }
    }

    /// Returns a copy with different stiffness and damping.
    #[must_use]
    pub const fn with_config(mut self, stiffness: f64, damping: f64) -> Self {
        self.stiffness = stiffness;
        self.damping = damping;
        self
    }

    /// Returns whether the spring is at rest on its target.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < self.precision && self.velocity.abs() < self.precision
    }

    fn step(&mut self, dt: f64) {
        let force = -self.stiffness * (self.value - self.target) - self.damping * self.velocity;
        self.velocity += force / self.mass * dt;
        self.value += self.velocity * dt;
    }
}

impl AnimatedValue for Spring {
    fn advance(&mut self, dt: f64) -> bool {
        let mut left = dt.max(0.0).min(Self::MAX_FRAME);
        while left > 0.0 && !self.is_settled() {
            let step = left.min(Self::MAX_STEP);
            self.step(step);
            left -= step;
        }
        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
            return false;
        }
        true
    }

    fn snapshot(&self) -> PropValue {
        PropValue::Number(self.value)
    }

    fn set_target(&mut self, target: f64) {
        self.target = target;
    }
}

/// Animated wrappers for the built-in kinds.
#[derive(Clone, Debug)]
pub struct AnimatedHost {
    components: Vec<AnimatedComponent>,
}

impl AnimatedHost {
    /// Creates one wrapper per built-in kind.
    #[must_use]
    pub fn new() -> Self {
        Self {
            components: BuiltinKind::ALL
                .into_iter()
                .map(|kind| AnimatedComponent { kind })
                .collect(),
        }
    }

    /// Returns the wrapper for the kind named `name`.
    #[must_use]
    pub fn animated(&self, name: &str) -> Option<&AnimatedComponent> {
        self.components.iter().find(|c| c.kind.name() == name)
    }

    /// Returns every wrapper.
    pub fn components(&self) -> impl Iterator<Item = &AnimatedComponent> {
        self.components.iter()
    }
}

impl Default for AnimatedHost {
    fn default() -> Self {
        Self::new()
    }
}

/// The animated wrapper of one built-in kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimatedComponent {
    kind: BuiltinKind,
}

impl AnimatedComponent {
    /// Returns the wrapped kind.
    #[must_use]
    pub fn kind(&self) -> BuiltinKind {
        self.kind
    }

    /// Returns an element of the wrapped kind with the static `props`.
    #[must_use]
    pub fn element(&self, props: Props) -> HostElement {
        HostElement::new(self.kind, props)
    }

    /// Connects `values` to the node behind `target`.
    pub fn bind(
        &self,
        target: impl Animatable,
        values: Vec<(String, Box<dyn AnimatedValue>)>,
    ) -> AnimatedBinding {
        AnimatedBinding {
            kind: self.kind,
            node: target.scene_node(),
            values,
        }
    }
}

/// Animated values bound to a node.
pub struct AnimatedBinding {
    kind: BuiltinKind,
    node: Option<NodeId>,
    values: Vec<(String, Box<dyn AnimatedValue>)>,
}

impl AnimatedBinding {
    /// Returns the bound node.
    #[must_use]
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Points the value bound to `key` at `target`. Returns whether such a
    /// value exists.
    pub fn set_target(&mut self, key: &str, target: f64) -> bool {
        match self.values.iter_mut().find(|(k, _)| k == key) {
            Some((_, value)) => {
                value.set_target(target);
                true
            }
            None => false,
        }
    }

    /// Returns the current values as props.
    #[must_use]
    pub fn snapshot(&self) -> Props {
        let mut props = Props::new();
        for (key, value) in &self.values {
            props.insert(key, value.snapshot());
        }
        props
    }

    /// Advances every value by `dt` seconds and writes the results onto the
    /// node.
    ///
    /// Returns whether any value is still moving.
    ///
    /// # Errors
    ///
    /// A failing `apply_props` hook of a custom kind.
    pub fn tick(&mut self, stage: &mut Stage, dt: f64) -> Result<bool> {
        let mut moving = false;
        for (_, value) in &mut self.values {
            moving |= value.advance(dt);
        }
        let Some(node) = self.node.filter(|&node| stage.graph().is_alive(node)) else {
            return Ok(moving);
        };
        let snapshot = self.snapshot();
        let hook = stage
            .instances()
            .hooks(node)
            .and_then(|hooks| hooks.apply_props.clone());
        match hook {
            Some(hook) => {
                hook(stage.graph_mut(), node, &Props::new(), &snapshot).map_err(|e| {
                    let kind = stage
                        .kind_of(node)
                        .map_or_else(|| String::from(self.kind.name()), |k| String::from(k.name()));
                    Error::hook(&kind, HookKind::ApplyProps, e)
                })?;
            }
            None => {
                apply_props(stage, node, &Props::new(), &snapshot);
            }
        }
        Ok(moving)
    }
}

impl fmt::Debug for AnimatedBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.values.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("AnimatedBinding")
            .field("kind", &self.kind)
            .field("node", &self.node)
            .field("values", &keys)
            .finish()
    }
}
