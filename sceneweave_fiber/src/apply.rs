// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The default prop applier.
//!
//! Each change record is routed to a setter chosen by the node's kind and
//! the key:
//!
//! | Keys | Setter |
//! |------|--------|
//! | `x`, `y`, `position`, `scale`, `pivot`, `anchor`, `skew`, `rotation`, `angle` | geometry |
//! | `alpha`, `visible` | appearance |
//! | `image`, `video`, `source`, `texture` on textured kinds | resolved through the loader |
//! | `text`, `style` on text kinds | text content |
//! | `draw` on `Graphics` | clears and re-runs the callback |
//! | `tilePosition`, `tileScale` on `TilingSprite` | point attributes |
//! | `textures`, `images`, `isPlaying`, `initialFrame` on `AnimatedSprite` | frames |
//! | anything else | generic attribute |
//!
//! A removal resets the key to the kind's default (see [`default_value`])
//! instead of leaving it unset.

use sceneweave_core::kurbo::{Point, Vec2};
use sceneweave_core::node::{Attr, NodeId, TextStyle};
use tracing::{trace, warn};

use crate::diff::{Change, ChangeSet, diff};
use crate::kind::BuiltinKind;
use crate::props::{PointLike, PropValue, Props, Source};
use crate::stage::Stage;

const SOURCE_KEYS: [&str; 4] = ["image", "video", "source", "texture"];

/// Diffs `old` against `new` and applies the result to `node`.
///
/// Returns the applied changes. Applying the same pair twice leaves the node
/// as the first call did.
pub fn apply_props(stage: &mut Stage, node: NodeId, old: &Props, new: &Props) -> ChangeSet {
    let changes = diff(old, new);
    apply_changes(stage, node, &changes);
    changes
}

/// Applies an already computed change set to `node`.
pub fn apply_changes(stage: &mut Stage, node: NodeId, changes: &ChangeSet) {
    let kind = stage.setter_kind(node);
    for record in changes {
        trace!("{} {}: {:?}", node, record.key, record.change);
        match &record.change {
            Change::Set(value) => set(stage, node, kind, &record.key, value),
            Change::Removed => reset(stage, node, kind, &record.key),
        }
    }
}

/// Returns the value a removed key resets to on nodes of `kind`.
///
/// `None` means the key has no setter default and is simply removed from the
/// node's attributes.
#[must_use]
pub fn default_value(kind: BuiltinKind, key: &str) -> Option<PropValue> {
    let value = match key {
        "x" | "y" | "rotation" | "angle" => PropValue::Number(0.0),
        "position" | "pivot" | "skew" => PropValue::Point(PointLike::Scalar(0.0)),
        "anchor" if has_anchor(kind) => PropValue::Point(PointLike::Scalar(0.0)),
        "scale" => PropValue::Point(PointLike::Scalar(1.0)),
        "alpha" => PropValue::Number(1.0),
        "visible" => PropValue::Bool(true),
        "text" if kind.is_text() => PropValue::Str(String::new()),
        "style" if kind.is_text() => PropValue::Style(TextStyle::default()),
        "tilePosition" if kind == BuiltinKind::TilingSprite => {
            PropValue::Point(PointLike::Scalar(0.0))
        }
        "tileScale" if kind == BuiltinKind::TilingSprite => {
            PropValue::Point(PointLike::Scalar(1.0))
        }
        "isPlaying" if kind == BuiltinKind::AnimatedSprite => PropValue::Bool(true),
        "initialFrame" if kind == BuiltinKind::AnimatedSprite => PropValue::Number(0.0),
        _ => return None,
    };
    Some(value)
}

fn has_anchor(kind: BuiltinKind) -> bool {
    matches!(
        kind,
        BuiltinKind::Sprite
            | BuiltinKind::TilingSprite
            | BuiltinKind::AnimatedSprite
            | BuiltinKind::Text
            | BuiltinKind::BitmapText
    )
}

fn has_texture(kind: BuiltinKind) -> bool {
    matches!(
        kind,
        BuiltinKind::Sprite | BuiltinKind::TilingSprite | BuiltinKind::NineSlicePlane
    )
}

fn set(stage: &mut Stage, node: NodeId, kind: BuiltinKind, key: &str, value: &PropValue) {
    match key {
        "x" | "y" | "rotation" | "angle" | "alpha" => {
            let Some(n) = value.as_number() else {
                return mismatch(node, key, value);
            };
            let graph = stage.graph_mut();
            match key {
                "x" => graph.set_x(node, n),
                "y" => graph.set_y(node, n),
                "rotation" => graph.set_rotation(node, n),
                "angle" => graph.set_rotation(node, n.to_radians()),
                _ => graph.set_alpha(node, n),
            }
        }
        "visible" => match value.as_bool() {
            Some(v) => stage.graph_mut().set_visible(node, v),
            None => mismatch(node, key, value),
        },
        "position" | "scale" | "pivot" | "anchor" | "skew" => {
            let Some(p) = value.as_point() else {
                return mismatch(node, key, value);
            };
            set_point(stage, node, key, p);
        }
        _ if SOURCE_KEYS.contains(&key) && has_texture(kind) => {
            match value.as_source() {
                Some(source) => stage.assign_source(node, &source),
                None => mismatch(node, key, value),
            }
        }
        "text" if kind.is_text() => match value.to_text() {
            Some(text) => stage.graph_mut().set_text(node, &text),
            None => mismatch(node, key, value),
        },
        "style" if kind.is_text() => match value {
            PropValue::Style(style) => stage.graph_mut().set_text_style(node, style.clone()),
            _ => mismatch(node, key, value),
        },
        "draw" if kind == BuiltinKind::Graphics => match value {
            PropValue::Draw(f) => stage.graph_mut().draw(node, |ctx| {
                ctx.clear();
                f.call(ctx);
            }),
            _ => mismatch(node, key, value),
        },
        "tilePosition" | "tileScale" if kind == BuiltinKind::TilingSprite => {
            match value.as_point() {
                Some(p) => stage
                    .graph_mut()
                    .set_attribute(node, key, Attr::Point(p.resolve())),
                None => mismatch(node, key, value),
            }
        }
        "textures" | "images" if kind == BuiltinKind::AnimatedSprite => {
            let sources = frame_sources(value);
            let frames = stage.resolve_frames(node, &sources);
            stage.graph_mut().set_frames(node, frames);
        }
        "isPlaying" if kind == BuiltinKind::AnimatedSprite => match value.as_bool() {
            Some(play) => stage.graph_mut().set_playing(node, play),
            None => mismatch(node, key, value),
        },
        "initialFrame" if kind == BuiltinKind::AnimatedSprite => match value.as_number() {
            Some(frame) => stage
                .graph_mut()
                .set_current_frame(node, frame_index(frame)),
            None => mismatch(node, key, value),
        },
        _ => match to_attr(value) {
            Some(attr) => stage.graph_mut().set_attribute(node, key, attr),
            None => mismatch(node, key, value),
        },
    }
}

fn reset(stage: &mut Stage, node: NodeId, kind: BuiltinKind, key: &str) {
    if SOURCE_KEYS.contains(&key) && has_texture(kind) {
        stage.clear_source(node);
        return;
    }
    match key {
        "draw" if kind == BuiltinKind::Graphics => stage.graph_mut().draw(node, |ctx| {
            ctx.clear();
        }),
        "textures" | "images" if kind == BuiltinKind::AnimatedSprite => {
            stage.graph_mut().set_frames(node, Vec::new());
        }
        _ => match default_value(kind, key) {
            Some(value) => set(stage, node, kind, key, &value),
            None => {
                stage.graph_mut().remove_attribute(node, key);
            }
        },
    }
}

fn set_point(stage: &mut Stage, node: NodeId, key: &str, p: PointLike) {
    let graph = stage.graph_mut();
    match key {
        "position" => graph.set_position(node, p.resolve()),
        "scale" => graph.set_scale(node, p.resolve_vec()),
        "pivot" => graph.set_pivot(node, p.resolve()),
        "anchor" => graph.set_anchor(node, p.resolve()),
        _ => graph.set_skew(node, p.resolve_vec()),
    }
}

pub(crate) fn frame_sources(value: &PropValue) -> Vec<Source> {
    match value {
        PropValue::Strings(names) => names.iter().cloned().map(Source::Frame).collect(),
        PropValue::Source(source) => vec![source.clone()],
        PropValue::Str(name) => vec![Source::Frame(name.clone())],
        _ => Vec::new(),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "frame indices are small non-negative integers"
)]
pub(crate) fn frame_index(n: f64) -> usize {
    n.max(0.0) as usize
}

fn to_attr(value: &PropValue) -> Option<Attr> {
    Some(match value {
        PropValue::Bool(b) => Attr::Bool(*b),
        PropValue::Number(n) => Attr::Number(*n),
        PropValue::Str(s) => Attr::Str(s.clone()),
        PropValue::Color(c) => Attr::Color(*c),
        PropValue::Point(p) => Attr::Point(p.resolve()),
        PropValue::Numbers(v) => Attr::Numbers(v.clone()),
        PropValue::Strings(v) => Attr::Strings(v.clone()),
        PropValue::Handler(h) => Attr::Handler(h.clone()),
        PropValue::Source(_) | PropValue::Style(_) | PropValue::Draw(_) => return None,
    })
}

fn mismatch(node: NodeId, key: &str, value: &PropValue) {
    warn!("{}: ignoring `{}` with unsupported value {:?}", node, key, value);
}

/// Returns the point value of a geometry key, for inspection.
#[must_use]
pub fn geometry(stage: &Stage, node: NodeId, key: &str) -> Option<Point> {
    let local = stage.graph().local(node);
    let to_point = |v: Vec2| Point::new(v.x, v.y);
    match key {
        "position" => Some(local.position),
        "scale" => Some(to_point(local.scale)),
        "pivot" => Some(local.pivot),
        "anchor" => Some(local.anchor),
        "skew" => Some(to_point(local.skew)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use sceneweave_core::node::{Content, GraphicsCommand, Handler, TextureId};

    use super::*;
    use crate::config::RendererConfig;
    use crate::factory::create_instance;
    use crate::kind::KindName;
    use crate::props::DrawFn;

    fn node_of(stage: &mut Stage, kind: BuiltinKind, props: &Props) -> NodeId {
        let root = stage.graph_mut().create_container();
        create_instance(stage, &KindName::from(kind), props, root).unwrap()
    }

    #[test]
    fn point_change_sets_both_components() {
        let mut stage = Stage::new(RendererConfig::DEFAULT);
        let old = Props::new().with("position", [0.0, 0.0]);
        let node = node_of(&mut stage, BuiltinKind::Container, &old);

        let new = Props::new().with("position", [0.5, 0.5]);
        let changes = apply_props(&mut stage, node, &old, &new);

        assert_eq!(changes.len(), 1);
        assert_eq!(geometry(&stage, node, "position"), Some(Point::new(0.5, 0.5)));
    }

    #[test]
    fn string_point_form_is_accepted() {
        let mut stage = Stage::new(RendererConfig::DEFAULT);
        let props = Props::new().with("pivot", "0.5,0.5");
        let node = node_of(&mut stage, BuiltinKind::Container, &props);
        assert_eq!(geometry(&stage, node, "pivot"), Some(Point::new(0.5, 0.5)));
    }

    #[test]
    fn applying_twice_matches_applying_once() {
        let mut stage = Stage::new(RendererConfig::DEFAULT);
        let node = node_of(&mut stage, BuiltinKind::Sprite, &Props::new());
        let old = Props::new().with("x", 5.0).with("tint", PropValue::Color(0xff_00_00));
        let new = Props::new()
            .with("x", 10.0)
            .with("scale", 2.0)
            .with("texture", TextureId(4));

        apply_props(&mut stage, node, &old, &new);
        let once = (
            *stage.graph().local(node),
            stage.graph().content(node).clone(),
            stage.graph().attributes(node).clone(),
        );
        apply_props(&mut stage, node, &old, &new);
        let twice = (
            *stage.graph().local(node),
            stage.graph().content(node).clone(),
            stage.graph().attributes(node).clone(),
        );

        assert_eq!(once, twice);
        assert!(apply_props(&mut stage, node, &new, &new).is_empty());
    }

    #[test]
    fn removal_resets_to_defaults() {
        let mut stage = Stage::new(RendererConfig::DEFAULT);
        let old = Props::new()
            .with("x", 100.0)
            .with("alpha", 0.25)
            .with("scale", 3.0)
            .with("interactive", true);
        let node = node_of(&mut stage, BuiltinKind::Sprite, &old);

        apply_props(&mut stage, node, &old, &Props::new());

        let local = stage.graph().local(node);
        assert_eq!(local.position.x, 0.0);
        assert_eq!(local.alpha, 1.0);
        assert_eq!(local.scale, Vec2::new(1.0, 1.0));
        assert_eq!(stage.graph().attribute(node, "interactive"), None);
    }

    #[test]
    fn text_kinds_route_text_and_style() {
        let mut stage = Stage::new(RendererConfig::DEFAULT);
        let node = node_of(&mut stage, BuiltinKind::Text, &Props::new().with("text", "a"));
        let style = TextStyle {
            font_size: 12.0,
            ..TextStyle::default()
        };
        apply_props(
            &mut stage,
            node,
            &Props::new().with("text", "a"),
            &Props::new().with("text", "b").with("style", style.clone()),
        );
        assert_eq!(stage.graph().text(node), Some("b"));
        let Content::Text(content) = stage.graph().content(node) else {
            panic!("text node lost its text content");
        };
        assert_eq!(content.style, style);
    }

    #[test]
    fn graphics_draw_replaces_commands() {
        let mut stage = Stage::new(RendererConfig::DEFAULT);
        let first = DrawFn::new(|g| {
            g.begin_fill(0xff_00_00, 1.0).draw_rect(0.0, 0.0, 10.0, 10.0);
        });
        let second = DrawFn::new(|g| {
            g.draw_circle(0.0, 0.0, 4.0);
        });
        let old = Props::new().with("draw", first);
        let node = node_of(&mut stage, BuiltinKind::Graphics, &old);
        assert_eq!(
            stage.graph().content(node),
            &Content::Graphics(vec![
                GraphicsCommand::BeginFill {
                    color: 0xff_00_00,
                    alpha: 1.0
                },
                GraphicsCommand::Rect(sceneweave_core::kurbo::Rect::new(0.0, 0.0, 10.0, 10.0)),
            ])
        );

        let new = Props::new().with("draw", second);
        apply_props(&mut stage, node, &old, &new);
        let Content::Graphics(commands) = stage.graph().content(node) else {
            panic!("graphics node lost its commands");
        };
        assert_eq!(commands.len(), 1);

        apply_props(&mut stage, node, &new, &Props::new());
        assert_eq!(stage.graph().content(node), &Content::Graphics(Vec::new()));
    }

    #[test]
    fn handlers_become_dispatchable_attributes() {
        let mut stage = Stage::new(RendererConfig::DEFAULT);
        let clicks = Rc::new(Cell::new(0));
        let counter = clicks.clone();
        let props = Props::new().with("pointerdown", Handler::new(move |_| counter.set(counter.get() + 1)));
        let node = node_of(&mut stage, BuiltinKind::Sprite, &props);

        assert!(stage.graph().dispatch(node, "pointerdown"));
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn url_sources_load_in_place() {
        let mut stage = Stage::new(RendererConfig::DEFAULT);
        let props = Props::new().with("image", "bunny.png");
        let node = node_of(&mut stage, BuiltinKind::Sprite, &props);

        let ticket = stage.sources().pending(node).expect("url loads are asynchronous");
        assert_eq!(stage.graph().texture(node), None);

        let updated = stage.complete_load(ticket, Ok(TextureId(9)));
        assert_eq!(updated, [node]);
        assert_eq!(stage.graph().texture(node), Some(TextureId(9)));
    }

    #[test]
    fn tiling_and_animated_setters() {
        let mut stage = Stage::new(RendererConfig::DEFAULT);
        let tiling = node_of(
            &mut stage,
            BuiltinKind::TilingSprite,
            &Props::new().with("tilePosition", [3.0, 4.0]),
        );
        assert_eq!(
            stage.graph().attribute(tiling, "tilePosition"),
            Some(&Attr::Point(Point::new(3.0, 4.0)))
        );

        let animated = node_of(&mut stage, BuiltinKind::AnimatedSprite, &Props::new());
        stage
            .graph_mut()
            .set_frames(animated, vec![TextureId(1), TextureId(2)]);
        apply_props(
            &mut stage,
            animated,
            &Props::new(),
            &Props::new().with("isPlaying", true).with("initialFrame", 1.0),
        );
        assert_eq!(
            stage.graph().content(animated),
            &Content::Frames {
                frames: vec![TextureId(1), TextureId(2)],
                current: 1,
                playing: true,
            }
        );
    }
}
