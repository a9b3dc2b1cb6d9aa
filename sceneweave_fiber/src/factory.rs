// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The node factory.
//!
//! [`create_instance`] turns a kind name and its initial props into a
//! detached scene node. Built-in kinds take their construction arguments
//! from the props and get the rest through the default prop applier; custom
//! kinds delegate construction to their registered `create` callback. Both
//! paths end the same way: the node is tagged in the instance side table with
//! its kind, hooks, destroy policy and root, then receives its initial props.

use sceneweave_core::node::{
    Attr, Content, DestroyOptions, NodeId, NodeShape, TextContent, TextStyle,
};
use tracing::trace;

use crate::apply::{apply_props, frame_index, frame_sources};
use crate::error::{Error, HookKind, Result};
use crate::instance::InstanceMeta;
use crate::kind::{BuiltinKind, Kind, KindName};
use crate::props::{PropValue, Props};
use crate::stage::Stage;

/// Default `maxSize` of a particle container.
pub const PARTICLE_MAX_SIZE: f64 = 1500.0;
/// Default `batchSize` of a particle container.
pub const PARTICLE_BATCH_SIZE: f64 = 16384.0;
/// Default border width of a nine-slice plane.
pub const NINE_SLICE_BORDER: f64 = 10.0;

/// Creates a detached node for `name` rendering into `root`.
///
/// Fails with [`Error::UnknownKind`] when the name is neither built in nor
/// registered, and with [`Error::Hook`] when a custom kind's `create` or
/// `applyProps` callback fails. A failed call leaves no node behind.
pub fn create_instance(
    stage: &mut Stage,
    name: &KindName,
    props: &Props,
    root: NodeId,
) -> Result<NodeId> {
    let kind = stage.kinds().resolve(name)?;
    let node = match &kind {
        Kind::Builtin(builtin) => {
            let node = construct(stage, *builtin, props);
            stage.track(
                node,
                InstanceMeta {
                    kind: kind.clone(),
                    hooks: None,
                    destroy: stage.config().destroy,
                    root,
                },
            );
            apply_props(
                stage,
                node,
                &Props::new(),
                &props.without(builtin.construction_keys()),
            );
            node
        }
        Kind::Custom(custom) => {
            let Some(record) = stage.kinds().custom(custom).cloned() else {
                return Err(Error::UnknownKind(String::from(custom.as_str())));
            };
            let node = (record.create)(stage.graph_mut(), props)
                .map_err(|e| Error::hook(custom.as_str(), HookKind::Create, e))?;
            let apply_hook = record.hooks.apply_props.clone();
            stage.track(
                node,
                InstanceMeta {
                    kind: kind.clone(),
                    hooks: (!record.hooks.is_empty()).then_some(record.hooks),
                    destroy: record.destroy.unwrap_or(stage.config().destroy),
                    root,
                },
            );
            match apply_hook {
                Some(hook) => {
                    if let Err(e) = hook(stage.graph_mut(), node, &Props::new(), props) {
                        stage.release(node);
                        if stage.graph().is_alive(node) {
                            stage
                                .graph_mut()
                                .destroy(node, DestroyOptions { children: true });
                        }
                        return Err(Error::hook(custom.as_str(), HookKind::ApplyProps, e));
                    }
                }
                None => {
                    apply_props(stage, node, &Props::new(), props);
                }
            }
            node
        }
    };
    trace!("created {} as {}", kind, node);
    Ok(node)
}

fn construct(stage: &mut Stage, kind: BuiltinKind, props: &Props) -> NodeId {
    let graph = stage.graph_mut();
    match kind {
        BuiltinKind::Container => graph.create_container(),
        BuiltinKind::Sprite => graph.create_sprite(None),
        BuiltinKind::TilingSprite | BuiltinKind::Graphics => {
            let content = if kind == BuiltinKind::Graphics {
                Content::Graphics(Vec::new())
            } else {
                Content::Empty
            };
            graph.create(kind.shape(), content)
        }
        BuiltinKind::Text | BuiltinKind::BitmapText => {
            let text = props
                .get("text")
                .and_then(PropValue::to_text)
                .unwrap_or_default();
            let style = match props.get("style") {
                Some(PropValue::Style(style)) => style.clone(),
                _ => TextStyle::default(),
            };
            graph.create(kind.shape(), Content::Text(TextContent { text, style }))
        }
        BuiltinKind::ParticleContainer => {
            let node = graph.create(NodeShape::ParticleContainer, Content::Empty);
            let max_size = number_or(props, "maxSize", PARTICLE_MAX_SIZE);
            let batch_size = number_or(props, "batchSize", PARTICLE_BATCH_SIZE);
            let auto_resize = props
                .get("autoResize")
                .and_then(PropValue::as_bool)
                .unwrap_or(false);
            graph.set_attribute(node, "maxSize", Attr::Number(max_size));
            graph.set_attribute(node, "batchSize", Attr::Number(batch_size));
            graph.set_attribute(node, "autoResize", Attr::Bool(auto_resize));
            node
        }
        BuiltinKind::NineSlicePlane => {
            let node = graph.create(NodeShape::NineSlicePlane, Content::Empty);
            for key in BuiltinKind::NineSlicePlane.construction_keys() {
                let width = number_or(props, key, NINE_SLICE_BORDER);
                graph.set_attribute(node, key, Attr::Number(width));
            }
            node
        }
        BuiltinKind::AnimatedSprite => {
            let playing = props
                .get("isPlaying")
                .and_then(PropValue::as_bool)
                .unwrap_or(true);
            let node = graph.create(
                NodeShape::AnimatedSprite,
                Content::Frames {
                    frames: Vec::new(),
                    current: 0,
                    playing,
                },
            );
            let sources = props
                .get("textures")
                .or_else(|| props.get("images"))
                .map(frame_sources)
                .unwrap_or_default();
            let frames = stage.resolve_frames(node, &sources);
            let graph = stage.graph_mut();
            graph.set_frames(node, frames);
            let initial = number_or(props, "initialFrame", 0.0);
            graph.set_current_frame(node, frame_index(initial));
            node
        }
    }
}

fn number_or(props: &Props, key: &str, default: f64) -> f64 {
    props
        .get(key)
        .and_then(PropValue::as_number)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use sceneweave_core::node::TextureId;

    use super::*;
    use crate::config::{DestroyPolicy, RendererConfig};
    use crate::registry::{CustomKind, LifecycleHooks};
    use crate::source::MemoryLoader;

    fn stage_with_root() -> (Stage, NodeId) {
        let mut stage = Stage::new(RendererConfig::DEFAULT);
        let root = stage.graph_mut().create_container();
        (stage, root)
    }

    #[test]
    fn text_takes_content_and_style_at_construction() {
        let (mut stage, root) = stage_with_root();
        let props = Props::new().with("text", "foo").with("x", 3.0);
        let node = create_instance(&mut stage, &KindName::from("Text"), &props, root).unwrap();

        assert_eq!(stage.graph().text(node), Some("foo"));
        assert_eq!(stage.graph().local(node).position.x, 3.0);
        assert_eq!(stage.kind_of(node), Some(&Kind::Builtin(BuiltinKind::Text)));
        assert_eq!(stage.instances().get(node).map(|m| m.root), Some(root));
        assert_eq!(stage.graph().parent(node), None);
    }

    #[test]
    fn bitmap_text_keeps_its_shape() {
        let (mut stage, root) = stage_with_root();
        let props = Props::new().with("text", 42.0);
        let node =
            create_instance(&mut stage, &KindName::from("BitmapText"), &props, root).unwrap();
        assert_eq!(stage.graph().shape(node), NodeShape::BitmapText);
        assert_eq!(stage.graph().text(node), Some("42"));
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let (mut stage, root) = stage_with_root();
        let live = stage.graph().live_count();
        let err = create_instance(&mut stage, &KindName::from("Bunny"), &Props::new(), root)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownKind(name) if name == "Bunny"));
        assert_eq!(stage.graph().live_count(), live);
    }

    #[test]
    fn construction_arguments_have_defaults() {
        let (mut stage, root) = stage_with_root();
        let particles = create_instance(
            &mut stage,
            &KindName::from("ParticleContainer"),
            &Props::new().with("maxSize", 20.0),
            root,
        )
        .unwrap();
        assert_eq!(
            stage.graph().attribute(particles, "maxSize"),
            Some(&Attr::Number(20.0))
        );
        assert_eq!(
            stage.graph().attribute(particles, "batchSize"),
            Some(&Attr::Number(PARTICLE_BATCH_SIZE))
        );

        let plane = create_instance(
            &mut stage,
            &KindName::from("NineSlicePlane"),
            &Props::new().with("leftWidth", 4.0),
            root,
        )
        .unwrap();
        assert_eq!(
            stage.graph().attribute(plane, "leftWidth"),
            Some(&Attr::Number(4.0))
        );
        assert_eq!(
            stage.graph().attribute(plane, "bottomHeight"),
            Some(&Attr::Number(NINE_SLICE_BORDER))
        );
    }

    #[test]
    fn animated_sprite_resolves_frames() {
        let mut loader = MemoryLoader::new();
        loader.insert_frame("a", TextureId(1));
        loader.insert_frame("b", TextureId(2));
        let mut stage = Stage::with_loader(RendererConfig::DEFAULT, Box::new(loader));
        let root = stage.graph_mut().create_container();
        let props = Props::new()
            .with("images", vec![String::from("a"), String::from("b")])
            .with("initialFrame", 1.0)
            .with("isPlaying", false);
        let node =
            create_instance(&mut stage, &KindName::from("AnimatedSprite"), &props, root).unwrap();
        assert_eq!(
            stage.graph().content(node),
            &Content::Frames {
                frames: vec![TextureId(1), TextureId(2)],
                current: 1,
                playing: false,
            }
        );
    }

    #[test]
    fn custom_kinds_are_tagged_uniformly() {
        let (mut stage, root) = stage_with_root();
        let applied = Rc::new(Cell::new(0));
        let counter = applied.clone();
        let bunny = stage
            .kinds_mut()
            .register(
                "Bunny",
                CustomKind::new(|graph, _| Ok(graph.create_sprite(Some(TextureId(7)))))
                    .with_hooks(LifecycleHooks::default().apply_props(move |_, _, old, new| {
                        assert!(old.is_empty());
                        assert!(new.contains("x"));
                        counter.set(counter.get() + 1);
                        Ok(())
                    }))
                    .with_destroy(DestroyPolicy::DETACH),
            )
            .unwrap();

        let props = Props::new().with("x", 1.0);
        let node = create_instance(&mut stage, &KindName::from(&bunny), &props, root).unwrap();

        let meta = stage.instances().get(node).unwrap();
        assert_eq!(meta.kind, Kind::Custom(KindName::from("Bunny")));
        assert_eq!(meta.destroy, DestroyPolicy::DETACH);
        assert!(meta.hooks.is_some());
        assert_eq!(applied.get(), 1);
        assert_eq!(stage.graph().local(node).position.x, 0.0);
    }

    #[test]
    fn failing_create_hook_surfaces_as_hook_error() {
        let (mut stage, root) = stage_with_root();
        stage
            .kinds_mut()
            .register("Broken", CustomKind::new(|_, _| Err("no texture".into())))
            .unwrap();
        let err = create_instance(&mut stage, &KindName::from("Broken"), &Props::new(), root)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Hook {
                hook: HookKind::Create,
                ..
            }
        ));
        assert!(stage.instances().is_empty());
    }
}
