// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node kinds.
//!
//! Elements name their kind with a [`KindName`]. When an instance is created
//! the name is resolved once into a [`Kind`]: either one of the closed set of
//! [`BuiltinKind`]s or a custom kind registered on the
//! [`KindRegistry`](crate::KindRegistry). The resolved tag is stored next to
//! the node and drives every later dispatch.

use std::fmt;
use std::rc::Rc;

use sceneweave_core::node::NodeShape;

/// The built-in kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    /// A grouping node.
    Container,
    /// A grouping node tuned for many sprite children.
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
    /// Bitmap-font text.
    BitmapText,
    /// Retained vector graphics.
    Graphics,
}

impl BuiltinKind {
    /// Every built-in kind.
    pub const ALL: [Self; 9] = [
        Self::Container,
        Self::ParticleContainer,
        Self::Sprite,
        Self::TilingSprite,
        Self::AnimatedSprite,
        Self::NineSlicePlane,
        Self::Text,
        Self::BitmapText,
        Self::Graphics,
    ];

    /// Returns the name elements use for this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Container => "Container",
            Self::ParticleContainer => "ParticleContainer",
            Self::Sprite => "Sprite",
            Self::TilingSprite => "TilingSprite",
            Self::AnimatedSprite => "AnimatedSprite",
            Self::NineSlicePlane => "NineSlicePlane",
            Self::Text => "Text",
            Self::BitmapText => "BitmapText",
            Self::Graphics => "Graphics",
        }
    }

    /// Looks a built-in kind up by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Returns the scene-graph constructor used for this kind.
    #[must_use]
    pub const fn shape(self) -> NodeShape {
        match self {
            Self::Container => NodeShape::Container,
            Self::ParticleContainer => NodeShape::ParticleContainer,
            Self::Sprite => NodeShape::Sprite,
            Self::TilingSprite => NodeShape::TilingSprite,
            Self::AnimatedSprite => NodeShape::AnimatedSprite,
            Self::NineSlicePlane => NodeShape::NineSlicePlane,
            Self::Text => NodeShape::Text,
            Self::BitmapText => NodeShape::BitmapText,
            Self::Graphics => NodeShape::Graphics,
        }
    }

    /// Returns the built-in kind built by a scene-graph constructor.
    #[must_use]
    pub const fn from_shape(shape: NodeShape) -> Self {
        match shape {
            NodeShape::Container => Self::Container,
            NodeShape::ParticleContainer => Self::ParticleContainer,
            NodeShape::Sprite => Self::Sprite,
            NodeShape::TilingSprite => Self::TilingSprite,
            NodeShape::AnimatedSprite => Self::AnimatedSprite,
            NodeShape::NineSlicePlane => Self::NineSlicePlane,
            NodeShape::Text => Self::Text,
            NodeShape::BitmapText => Self::BitmapText,
            NodeShape::Graphics => Self::Graphics,
        }
    }

    /// Returns whether nodes of this kind show text.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Text | Self::BitmapText)
    }

    /// Props consumed when the node is constructed rather than through the
    /// prop applier.
    #[must_use]
    pub const fn construction_keys(self) -> &'static [&'static str] {
        match self {
            Self::Text | Self::BitmapText => &["text", "style"],
            Self::ParticleContainer => &["maxSize", "batchSize", "autoResize"],
            Self::NineSlicePlane => &["leftWidth", "topHeight", "rightWidth", "bottomHeight"],
            Self::AnimatedSprite => &["textures", "images", "initialFrame", "isPlaying"],
            Self::Container
            | Self::Sprite
            | Self::TilingSprite
            | Self::Graphics => &[],
        }
    }
}

impl fmt::Display for BuiltinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The kind name carried by an element.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct KindName(Rc<str>);

impl KindName {
    /// Creates a kind name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(Rc::from(name))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for KindName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for KindName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KindName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<BuiltinKind> for KindName {
    fn from(kind: BuiltinKind) -> Self {
        Self::new(kind.name())
    }
}

impl From<&ComponentRef> for KindName {
    fn from(component: &ComponentRef) -> Self {
        component.name.clone()
    }
}

impl From<ComponentRef> for KindName {
    fn from(component: ComponentRef) -> Self {
        component.name
    }
}

/// A resolved kind tag, stored alongside every instance.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// One of the built-in kinds.
    Builtin(BuiltinKind),
    /// A registered custom kind.
    Custom(KindName),
}

impl Kind {
    /// Returns the kind's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(kind) => kind.name(),
            Self::Custom(name) => name.as_str(),
        }
    }

    /// Returns the built-in kind, if this is one.
    #[must_use]
    pub fn builtin(&self) -> Option<BuiltinKind> {
        match self {
            Self::Builtin(kind) => Some(*kind),
            Self::Custom(_) => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle returned by custom-kind registration, used to build elements.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentRef {
    name: KindName,
}

impl ComponentRef {
    pub(crate) fn new(name: KindName) -> Self {
        Self { name }
    }

    /// Returns the registered kind name.
    #[must_use]
    pub fn name(&self) -> &KindName {
        &self.name
    }
}
