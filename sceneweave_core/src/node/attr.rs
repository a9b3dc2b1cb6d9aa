// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generic node attributes.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Point;

use super::id::NodeId;

/// An event handler stored as a node attribute.
///
/// Handlers compare by identity: two handlers are equal only if they share
/// the same allocation.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(NodeId)>);

impl Handler {
    /// Wraps a closure.
    pub fn new(f: impl Fn(NodeId) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invokes the handler for `node`.
    pub fn call(&self, node: NodeId) {
        (self.0)(node);
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Rc::as_ptr(&self.0))
    }
}

/// A value held in a node's generic attribute table.
///
/// Attributes are everything the scene graph has no dedicated storage for:
/// tint, blend mode, interactivity, hit areas, event handlers and so on.
#[derive(Clone, Debug, PartialEq)]
pub enum Attr {
    /// A boolean flag.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    Str(String),
    /// A packed `0xRRGGBB` color.
    Color(u32),
    /// A 2D point.
    Point(Point),
    /// A list of numbers.
    Numbers(Vec<f64>),
    /// A list of strings.
    Strings(Vec<String>),
    /// An event handler.
    Handler(Handler),
}

impl Attr {
    /// Returns the number if this is [`Attr::Number`].
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean if this is [`Attr::Bool`].
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}
