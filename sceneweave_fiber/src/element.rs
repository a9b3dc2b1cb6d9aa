// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative element trees.
//!
//! An [`Element`] describes what a root should look like. Elements are plain
//! values; rendering one hands it to the [reconciler](crate::reconciler),
//! which works out the host operations that turn the current tree into it.
//!
//! ```rust,ignore
//! let tree = HostElement::new("Container", Props::new().with("x", 10.0))
//!     .child(HostElement::new("Text", Props::new().with("text", "one")).key(1))
//!     .child(HostElement::new("Text", Props::new().with("text", "two")).key(2));
//! root.render(tree)?;
//! ```

use std::fmt;
use std::rc::Rc;

use crate::gate::LoadGate;
use crate::kind::KindName;
use crate::props::Props;

/// Identifies an element among its siblings across renders.
pub type Key = Rc<str>;

/// A node of a declarative tree.
#[derive(Clone, Debug)]
pub enum Element {
    /// A scene node of some kind.
    Host(HostElement),
    /// A group of siblings without a node of its own.
    Fragment(FragmentElement),
    /// Raw text. Scene graphs have no text nodes, so rendering it fails.
    Text(String),
    /// A boundary showing a fallback while its content is loading.
    Suspense(SuspenseElement),
    /// Content that is only available once a [`LoadGate`] is ready.
    Gate(GateElement),
    /// Nothing.
    Empty,
}

impl Element {
    /// Creates a host element without children.
    pub fn host(kind: impl Into<KindName>, props: Props) -> Self {
        Self::Host(HostElement::new(kind, props))
    }

    /// Creates a fragment.
    pub fn fragment<E: Into<Self>>(children: impl IntoIterator<Item = E>) -> Self {
        Self::Fragment(FragmentElement {
            key: None,
            children: children.into_iter().map(Into::into).collect(),
        })
    }

    /// Creates a raw text element.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Creates a suspense boundary.
    pub fn suspense<E: Into<Self>>(
        fallback: impl Into<Self>,
        children: impl IntoIterator<Item = E>,
    ) -> Self {
        Self::Suspense(SuspenseElement {
            key: None,
            fallback: Box::new(fallback.into()),
            children: children.into_iter().map(Into::into).collect(),
        })
    }

    /// Creates content gated on `gate`.
    pub fn gate<E: Into<Self>>(gate: &LoadGate, children: impl IntoIterator<Item = E>) -> Self {
        Self::Gate(GateElement {
            gate: gate.clone(),
            children: children.into_iter().map(Into::into).collect(),
        })
    }

    /// Returns the explicit key, if any.
    #[must_use]
    pub fn key(&self) -> Option<&Key> {
        match self {
            Self::Host(host) => host.key.as_ref(),
            Self::Fragment(fragment) => fragment.key.as_ref(),
            Self::Suspense(suspense) => suspense.key.as_ref(),
            Self::Text(_) | Self::Gate(_) | Self::Empty => None,
        }
    }
}

/// A scene node description.
#[derive(Clone, Debug)]
pub struct HostElement {
    /// Built-in or registered kind name.
    pub kind: KindName,
    /// Optional sibling key.
    pub key: Option<Key>,
    /// Props, excluding children.
    pub props: Props,
    /// Child elements in paint order.
    pub children: Vec<Element>,
}

impl HostElement {
    /// Creates a host element without children.
    pub fn new(kind: impl Into<KindName>, props: Props) -> Self {
        Self {
            kind: kind.into(),
            key: None,
            props,
            children: Vec::new(),
        }
    }

    /// Sets the sibling key.
    #[must_use]
    pub fn key(mut self, key: impl fmt::Display) -> Self {
        self.key = Some(Rc::from(key.to_string()));
        self
    }

    /// Appends a child.
    #[must_use]
    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Appends children.
    #[must_use]
    pub fn children<E: Into<Element>>(mut self, children: impl IntoIterator<Item = E>) -> Self {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }
}

/// A keyed or unkeyed group of siblings.
#[derive(Clone, Debug, Default)]
pub struct FragmentElement {
    /// Optional sibling key.
    pub key: Option<Key>,
    /// The grouped elements.
    pub children: Vec<Element>,
}

/// A suspense boundary.
#[derive(Clone, Debug)]
pub struct SuspenseElement {
    /// Optional sibling key.
    pub key: Option<Key>,
    /// Shown while any gate below the boundary is loading.
    pub fallback: Box<Element>,
    /// The content.
    pub children: Vec<Element>,
}

/// Gated content.
#[derive(Clone, Debug)]
pub struct GateElement {
    /// The gate the content waits on.
    pub gate: LoadGate,
    /// The content.
    pub children: Vec<Element>,
}

impl From<HostElement> for Element {
    fn from(host: HostElement) -> Self {
        Self::Host(host)
    }
}

impl From<FragmentElement> for Element {
    fn from(fragment: FragmentElement) -> Self {
        Self::Fragment(fragment)
    }
}

impl From<SuspenseElement> for Element {
    fn from(suspense: SuspenseElement) -> Self {
        Self::Suspense(suspense)
    }
}

impl From<GateElement> for Element {
    fn from(gate: GateElement) -> Self {
        Self::Gate(gate)
    }
}
