// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative property values.
//!
//! A [`Props`] bag maps string keys to [`PropValue`]s and keeps insertion
//! order, which the diff engine relies on for reproducible change lists.
//! Bags are compared, never mutated, by the reconciler: every render hands
//! over a fresh bag.

use std::fmt;
use std::rc::Rc;

use sceneweave_core::kurbo::{Point, Vec2};
use sceneweave_core::node::{GraphicsContext, Handler, TextStyle, TextureId};

/// Anything accepted as a 2D coordinate.
///
/// Equality is structural: two point-likes are equal when they resolve to
/// the same point, whatever their spelling.
#[derive(Clone, Copy, Debug)]
pub enum PointLike {
    /// `[x, y]`.
    Pair(f64, f64),
    /// A single number used for both axes.
    Scalar(f64),
    /// An `{ x, y }` record.
    Xy {
        /// Horizontal component.
        x: f64,
        /// Vertical component.
        y: f64,
    },
    /// An already-resolved point.
    Resolved(Point),
}

impl PointLike {
    /// Resolves to a concrete point.
    #[must_use]
    pub fn resolve(self) -> Point {
        match self {
            Self::Pair(x, y) | Self::Xy { x, y } => Point::new(x, y),
            Self::Scalar(v) => Point::new(v, v),
            Self::Resolved(p) => p,
        }
    }

    /// Resolves to a vector, for scale-like properties.
    #[must_use]
    pub fn resolve_vec(self) -> Vec2 {
        self.resolve().to_vec2()
    }

    /// Parses the comma-separated string form: `"0.5"` or `"0.5,0.25"`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split(',').map(str::trim);
        let x: f64 = parts.next()?.parse().ok()?;
        match parts.next() {
            None => Some(Self::Scalar(x)),
            Some(y) => {
                let y: f64 = y.parse().ok()?;
                if parts.next().is_some() {
                    return None;
                }
                Some(Self::Pair(x, y))
            }
        }
    }
}

impl PartialEq for PointLike {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.resolve(), other.resolve());
        same_number(a.x, b.x) && same_number(a.y, b.y)
    }
}

/// Number equality under which NaN equals itself.
pub(crate) fn same_number(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

impl From<Point> for PointLike {
    fn from(p: Point) -> Self {
        Self::Resolved(p)
    }
}

impl From<[f64; 2]> for PointLike {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::Pair(x, y)
    }
}

impl From<(f64, f64)> for PointLike {
    fn from((x, y): (f64, f64)) -> Self {
        Self::Pair(x, y)
    }
}

/// Where a visual resource comes from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    /// A texture that is already resident.
    Texture(TextureId),
    /// A URL that has to be fetched and decoded.
    Url(String),
    /// A named frame of an already loaded atlas.
    Frame(String),
}

impl From<TextureId> for Source {
    fn from(id: TextureId) -> Self {
        Self::Texture(id)
    }
}

/// A graphics draw callback.
///
/// Compared by pointer identity, like every callback prop.
#[derive(Clone)]
pub struct DrawFn(Rc<dyn Fn(&mut GraphicsContext)>);

impl DrawFn {
    /// Wraps a draw callback.
    pub fn new(f: impl Fn(&mut GraphicsContext) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Runs the callback against `ctx`.
    pub fn call(&self, ctx: &mut GraphicsContext) {
        (self.0)(ctx);
    }
}

impl PartialEq for DrawFn {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for DrawFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DrawFn({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

/// A single declarative property value.
///
/// Numbers compare equal when both are NaN, so a bag always equals itself.
#[derive(Clone, Debug)]
pub enum PropValue {
    /// A flag.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    Str(String),
    /// A packed `0xRRGGBB` color.
    Color(u32),
    /// A point-like value.
    Point(PointLike),
    /// A list of numbers.
    Numbers(Vec<f64>),
    /// A list of strings.
    Strings(Vec<String>),
    /// A visual resource.
    Source(Source),
    /// A text style.
    Style(TextStyle),
    /// A graphics draw callback.
    Draw(DrawFn),
    /// An event handler.
    Handler(Handler),
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => same_number(*a, *b),
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Color(a), Self::Color(b)) => a == b,
            (Self::Point(a), Self::Point(b)) => a == b,
            (Self::Numbers(a), Self::Numbers(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| same_number(*a, *b))
            }
            (Self::Strings(a), Self::Strings(b)) => a == b,
            (Self::Source(a), Self::Source(b)) => a == b,
            (Self::Style(a), Self::Style(b)) => a == b,
            (Self::Draw(a), Self::Draw(b)) => a == b,
            (Self::Handler(a), Self::Handler(b)) => a == b,
            _ => false,
        }
    }
}

impl PropValue {
    /// Compares two values the way the diff engine does.
    ///
    /// When either side is a point-like, both are resolved to points first,
    /// so `2`, `[2, 2]`, `"2,2"` and `{ x: 2, y: 2 }` are the same value.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        if matches!(self, Self::Point(_)) || matches!(other, Self::Point(_)) {
            return match (self.as_point(), other.as_point()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            };
        }
        self == other
    }

    /// Returns the value as a number, if it is one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a flag, if it is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as a string slice, if it is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Interprets the value as a point-like.
    ///
    /// Accepts point-likes, single numbers and the comma-separated string
    /// form.
    #[must_use]
    pub fn as_point(&self) -> Option<PointLike> {
        match self {
            Self::Point(p) => Some(*p),
            Self::Number(n) => Some(PointLike::Scalar(*n)),
            Self::Numbers(v) if v.len() == 2 => Some(PointLike::Pair(v[0], v[1])),
            Self::Str(s) => PointLike::parse(s),
            _ => None,
        }
    }

    /// Interprets the value as a resource source.
    ///
    /// Strings are taken as URLs.
    #[must_use]
    pub fn as_source(&self) -> Option<Source> {
        match self {
            Self::Source(s) => Some(s.clone()),
            Self::Str(url) => Some(Source::Url(url.clone())),
            _ => None,
        }
    }

    /// Renders the value as display text, for text content.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Number(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for PropValue {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        Self::Str(String::from(v))
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<PointLike> for PropValue {
    fn from(v: PointLike) -> Self {
        Self::Point(v)
    }
}

impl From<Point> for PropValue {
    fn from(v: Point) -> Self {
        Self::Point(PointLike::Resolved(v))
    }
}

impl From<[f64; 2]> for PropValue {
    fn from(v: [f64; 2]) -> Self {
        Self::Point(v.into())
    }
}

impl From<Vec<f64>> for PropValue {
    fn from(v: Vec<f64>) -> Self {
        Self::Numbers(v)
    }
}

impl From<Vec<String>> for PropValue {
    fn from(v: Vec<String>) -> Self {
        Self::Strings(v)
    }
}

impl From<Source> for PropValue {
    fn from(v: Source) -> Self {
        Self::Source(v)
    }
}

impl From<TextureId> for PropValue {
    fn from(v: TextureId) -> Self {
        Self::Source(Source::Texture(v))
    }
}

impl From<TextStyle> for PropValue {
    fn from(v: TextStyle) -> Self {
        Self::Style(v)
    }
}

impl From<DrawFn> for PropValue {
    fn from(v: DrawFn) -> Self {
        Self::Draw(v)
    }
}

impl From<Handler> for PropValue {
    fn from(v: Handler) -> Self {
        Self::Handler(v)
    }
}

/// An insertion-ordered property bag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    entries: Vec<(String, PropValue)>,
}

impl Props {
    /// Creates an empty bag.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the bag with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key`, keeping its original position if already present.
    pub fn insert(&mut self, key: &str, value: impl Into<PropValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((String::from(key), value)),
        }
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Returns whether `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a copy without the given keys.
    #[must_use]
    pub fn without(&self, keys: &[&str]) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(k, _)| !keys.contains(&k.as_str()))
                .cloned()
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut props = Self::new();
        for (k, v) in iter {
            let key: String = k.into();
            props.insert(&key, v);
        }
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_like_equality_is_structural() {
        assert_eq!(PointLike::Pair(1.0, 1.0), PointLike::Scalar(1.0));
        assert_eq!(
            PointLike::Xy { x: 0.5, y: 2.0 },
            PointLike::Resolved(Point::new(0.5, 2.0))
        );
        assert_ne!(PointLike::Pair(0.0, 1.0), PointLike::Pair(1.0, 0.0));
    }

    #[test]
    fn point_like_parses_string_form() {
        assert_eq!(PointLike::parse("0.5,0.5"), Some(PointLike::Pair(0.5, 0.5)));
        assert_eq!(PointLike::parse(" 2 "), Some(PointLike::Scalar(2.0)));
        assert_eq!(PointLike::parse("1,2,3"), None);
        assert_eq!(PointLike::parse("a,b"), None);
    }

    #[test]
    fn insert_keeps_original_position() {
        let mut props = Props::new().with("x", 1.0).with("y", 2.0);
        props.insert("x", 5.0);
        assert_eq!(props.keys().collect::<Vec<_>>(), ["x", "y"]);
        assert_eq!(props.get("x"), Some(&PropValue::Number(5.0)));
    }

    #[test]
    fn draw_callbacks_compare_by_identity() {
        let a = DrawFn::new(|_| {});
        let b = DrawFn::new(|_| {});
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn as_point_accepts_several_spellings() {
        let expected = Some(PointLike::Pair(0.5, 0.5));
        assert_eq!(PropValue::from("0.5,0.5").as_point(), expected);
        assert_eq!(PropValue::from(0.5).as_point(), expected);
        assert_eq!(PropValue::from([0.5, 0.5]).as_point(), expected);
        assert_eq!(PropValue::Bool(true).as_point(), None);
    }
}
