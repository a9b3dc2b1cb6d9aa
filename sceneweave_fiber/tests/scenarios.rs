// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end rendering scenarios against a live session.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use sceneweave_core::node::{NodeId, TextureId};
use sceneweave_fiber::diff::{Change, diff};
use sceneweave_fiber::source::LoadError;
use sceneweave_fiber::trace::{HostEvent, OpLog};
use sceneweave_fiber::{
    CustomKind, DestroyPolicy, Element, Error, HostElement, LifecycleHooks, LoadGate, Props,
    RendererConfig, RendererSession, Root,
};

struct Fixture {
    session: RendererSession,
    container: NodeId,
    root: Root,
    log: OpLog,
}

fn fixture(config: RendererConfig) -> Fixture {
    let session = RendererSession::new(config);
    let container = session.stage_mut().graph_mut().create_container();
    let root = session.create_root(container).unwrap();
    let log = OpLog::new();
    session.set_trace_sink(log.clone());
    Fixture {
        session,
        container,
        root,
        log,
    }
}

fn label(text: &str) -> HostElement {
    HostElement::new("Text", Props::new().with("text", text))
}

fn children(f: &Fixture, parent: NodeId) -> Vec<NodeId> {
    f.session.stage().graph().children(parent).collect()
}

fn texts(f: &Fixture, parent: NodeId) -> Vec<String> {
    let stage = f.session.stage();
    stage
        .graph()
        .children(parent)
        .map(|n| String::from(stage.graph().text(n).unwrap_or_default()))
        .collect()
}

#[test]
fn children_are_created_before_their_parent() {
    let f = fixture(RendererConfig::DEFAULT);
    f.root
        .render(HostElement::new("Container", Props::new()).child(label("foo")))
        .unwrap();

    let kinds: Vec<String> = f
        .log
        .named("createInstance")
        .into_iter()
        .map(|e| match e {
            HostEvent::CreateInstance { kind, .. } => String::from(kind.name()),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(kinds, ["Text", "Container"]);

    let top = children(&f, f.container);
    assert_eq!(top.len(), 1);
    assert_eq!(texts(&f, top[0]), ["foo"]);
}

#[test]
fn dropped_children_are_removed_in_order() {
    let f = fixture(RendererConfig::DEFAULT);
    let tree = |labels: &[&str]| {
        HostElement::new("Container", Props::new()).children(labels.iter().map(|l| label(l)))
    };
    f.root.render(tree(&["one", "two", "three"])).unwrap();
    let parent = children(&f, f.container)[0];
    let before = children(&f, parent);
    f.log.clear();

    f.root.render(tree(&["one"])).unwrap();

    let removed: Vec<NodeId> = f
        .log
        .named("removeChild")
        .into_iter()
        .map(|e| match e {
            HostEvent::RemoveChild { child, .. } => child,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(removed, [before[1], before[2]]);
    assert_eq!(f.log.count("createInstance"), 0);
    assert_eq!(texts(&f, parent), ["one"]);
    assert!(!f.session.stage().graph().is_alive(before[2]));
}

#[test]
fn keyed_insert_lands_before_its_next_sibling() {
    let f = fixture(RendererConfig::DEFAULT);
    let tree = |labels: &[&str]| {
        HostElement::new("Container", Props::new())
            .children(labels.iter().map(|l| label(l).key(l)))
    };
    f.root.render(tree(&["one", "three"])).unwrap();
    let parent = children(&f, f.container)[0];
    let three = children(&f, parent)[1];
    f.log.clear();

    f.root.render(tree(&["one", "two", "three"])).unwrap();

    let inserts = f.log.named("insertBefore");
    assert_eq!(inserts.len(), 1);
    assert!(matches!(inserts[0], HostEvent::InsertBefore { before, .. } if before == three));
    assert_eq!(texts(&f, parent), ["one", "two", "three"]);
}

#[test]
fn updates_carry_old_and_new_props() {
    let f = fixture(RendererConfig::DEFAULT);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let record = seen.clone();
    let probe = f
        .session
        .register_kind(
            "Probe",
            CustomKind::new(|graph, _| Ok(graph.create_container())).with_hooks(
                LifecycleHooks::default().apply_props(move |_, _, old, new| {
                    let x = |p: &Props| p.get("x").and_then(|v| v.as_number());
                    record.borrow_mut().push((x(old), x(new)));
                    Ok(())
                }),
            ),
        )
        .unwrap();

    f.root
        .render(HostElement::new(&probe, Props::new().with("x", 1.0)))
        .unwrap();
    f.root
        .render(HostElement::new(&probe, Props::new().with("x", 2.0)))
        .unwrap();

    assert_eq!(f.log.count("commitUpdate"), 1);
    assert_eq!(*seen.borrow(), [(None, Some(1.0)), (Some(1.0), Some(2.0))]);
}

#[test]
fn omitted_prop_resets_to_its_default() {
    let f = fixture(RendererConfig::DEFAULT);
    let with_x = Props::new().with("text", "a").with("x", 100.0);
    let without_x = Props::new().with("text", "a");
    assert_eq!(diff(&with_x, &without_x).get("x"), Some(&Change::Removed));

    f.root.render(HostElement::new("Text", with_x)).unwrap();
    let node = children(&f, f.container)[0];
    assert_eq!(f.session.stage().graph().local(node).position.x, 100.0);
    f.log.clear();

    f.root.render(HostElement::new("Text", without_x)).unwrap();

    let updates = f.log.named("commitUpdate");
    assert_eq!(updates.len(), 1);
    assert!(matches!(&updates[0], HostEvent::CommitUpdate { keys, .. } if keys == &["x"]));
    assert_eq!(f.session.stage().graph().local(node).position.x, 0.0);
}

type HookLog = Rc<RefCell<Vec<(&'static str, NodeId, Option<NodeId>)>>>;

fn watched(name: &'static str, mounts: &HookLog, unmounts: &HookLog) -> CustomKind {
    let mounts = mounts.clone();
    let unmounts = unmounts.clone();
    CustomKind::new(|graph, _| Ok(graph.create_container())).with_hooks(
        LifecycleHooks::default()
            .did_mount(move |_, node, parent| {
                mounts.borrow_mut().push((name, node, parent));
                Ok(())
            })
            .will_unmount(move |_, node, parent| {
                unmounts.borrow_mut().push((name, node, parent));
                Ok(())
            }),
    )
}

#[test]
fn lifecycle_hooks_run_children_first_with_their_parent() {
    let f = fixture(RendererConfig::DEFAULT);
    let mounts = HookLog::default();
    let unmounts = HookLog::default();
    let outer = f
        .session
        .register_kind("Outer", watched("outer", &mounts, &unmounts))
        .unwrap();
    let inner = f
        .session
        .register_kind("Inner", watched("inner", &mounts, &unmounts))
        .unwrap();

    f.root
        .render(HostElement::new(&outer, Props::new()).child(HostElement::new(&inner, Props::new())))
        .unwrap();
    let outer_node = children(&f, f.container)[0];
    let inner_node = children(&f, outer_node)[0];
    let expected = [
        ("inner", inner_node, Some(outer_node)),
        ("outer", outer_node, Some(f.container)),
    ];
    assert_eq!(*mounts.borrow(), expected);

    f.root.unmount().unwrap();
    assert_eq!(*unmounts.borrow(), expected);
    assert!(!f.session.stage().graph().is_alive(outer_node));
}

#[test]
fn destroy_policy_decides_what_survives_removal() {
    let f = fixture(RendererConfig::DEFAULT);
    let shallow = f
        .session
        .register_kind(
            "Shallow",
            CustomKind::new(|graph, _| Ok(graph.create_container())).with_destroy(DestroyPolicy {
                destroy: true,
                destroy_children: false,
            }),
        )
        .unwrap();
    f.root
        .render(HostElement::new(&shallow, Props::new()).child(HostElement::new("Sprite", Props::new())))
        .unwrap();
    let node = children(&f, f.container)[0];
    let sprite = children(&f, node)[0];

    f.root.render(Element::Empty).unwrap();
    let stage = f.session.stage();
    assert!(!stage.graph().is_alive(node));
    assert!(stage.graph().is_alive(sprite));
    assert_eq!(stage.graph().parent(sprite), None);
    assert_eq!(f.log.count("destroy"), 1);
}

#[test]
fn detach_config_keeps_removed_nodes() {
    let f = fixture(RendererConfig::DEFAULT.with_destroy(DestroyPolicy::DETACH));
    f.root.render(label("kept")).unwrap();
    let node = children(&f, f.container)[0];
    f.root.render(Element::Empty).unwrap();
    assert!(f.session.stage().graph().is_alive(node));
    assert!(children(&f, f.container).is_empty());
    assert_eq!(f.log.count("destroy"), 0);
}

#[test]
fn suspense_creates_fallback_then_content() {
    let f = fixture(RendererConfig::DEFAULT);
    let created = Rc::new(RefCell::new(Vec::new()));
    let record = created.clone();
    let named = f
        .session
        .register_kind(
            "Named",
            CustomKind::new(move |graph, props| {
                let name = props.get("name").and_then(|v| v.as_str()).unwrap_or_default();
                record.borrow_mut().push(String::from(name));
                Ok(graph.create_container())
            }),
        )
        .unwrap();
    let node = |name: &str| HostElement::new(&named, Props::new().with("name", name));

    let gate = LoadGate::new();
    f.root
        .render(Element::suspense(
            node("loading"),
            [Element::from(node("A")), Element::gate(&gate, [node("content")])],
        ))
        .unwrap();
    assert_eq!(*created.borrow(), ["A", "loading"]);
    assert_eq!(children(&f, f.container).len(), 1);
    assert_eq!(f.log.count("discardInstance"), 1);

    gate.resolve();
    assert_eq!(*created.borrow(), ["A", "loading", "A", "content"]);
    assert_eq!(children(&f, f.container).len(), 2);
}

#[test]
fn every_commit_requests_a_render() {
    let session = RendererSession::default();
    let counters: Vec<(Root, Rc<Cell<usize>>)> = (0..2)
        .map(|_| {
            let container = session.stage_mut().graph_mut().create_container();
            let count = Rc::new(Cell::new(0));
            let c = count.clone();
            session.on_render_request(container, move |_| c.set(c.get() + 1));
            (session.create_root(container).unwrap(), count)
        })
        .collect();
    let tree = |x: f64| {
        HostElement::new("Container", Props::new())
            .child(HostElement::new("Sprite", Props::new().with("x", x)))
    };

    let (first, first_count) = &counters[0];
    first.render(tree(0.0)).unwrap();
    assert_eq!(first_count.get(), 2);

    let (second, second_count) = &counters[1];
    second.render(tree(0.0)).unwrap();
    second.render(tree(5.0)).unwrap();
    assert_eq!(second_count.get(), 3);

    second.render(tree(5.0)).unwrap();
    assert_eq!(second_count.get(), 4);
    assert_eq!(first_count.get(), 2);
}

#[test]
fn roots_come_and_go() {
    let session = RendererSession::default();
    let container = session.stage_mut().graph_mut().create_container();
    assert_eq!(session.root_count(), 0);
    let root = session.create_root(container).unwrap();
    assert_eq!(session.root_count(), 1);
    root.render(label("x")).unwrap();
    assert_eq!(session.root_count(), 1);
    root.unmount().unwrap();
    assert_eq!(session.root_count(), 0);
    root.unmount().unwrap();
    root.render(label("ignored")).unwrap();
    assert!(session.stage().graph().children(container).next().is_none());
}

#[test]
fn render_errors_leave_the_tree_alone() {
    let f = fixture(RendererConfig::DEFAULT.with_max_depth(2));
    f.root.render(label("stable")).unwrap();
    let stable = children(&f, f.container);

    let err = f
        .root
        .render(HostElement::new("Bunny", Props::new()))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownKind(name) if name == "Bunny"));

    let mut deep = HostElement::new("Container", Props::new());
    for _ in 0..3 {
        deep = HostElement::new("Container", Props::new()).child(deep);
    }
    assert!(matches!(f.root.render(deep), Err(Error::DepthExceeded(2))));
    assert!(matches!(f.root.render(Element::text("raw")), Err(Error::RawText(_))));

    assert_eq!(children(&f, f.container), stable);
    assert_eq!(f.session.stage().graph().live_count(), 2);
}

#[test]
fn failing_unmount_hook_still_removes_the_node() {
    let f = fixture(RendererConfig::DEFAULT);
    let fragile = f
        .session
        .register_kind(
            "Fragile",
            CustomKind::new(|graph, _| Ok(graph.create_container())).with_hooks(
                LifecycleHooks::default().will_unmount(|_, _, _| Err("refused".into())),
            ),
        )
        .unwrap();
    f.root.render(HostElement::new(&fragile, Props::new())).unwrap();
    let node = children(&f, f.container)[0];

    let err = f.root.render(Element::Empty).unwrap_err();
    assert!(matches!(err, Error::Hook { ref kind, .. } if kind == "Fragile"));
    assert!(!f.session.stage().graph().is_alive(node));
}

#[test]
fn hooks_may_rerender_their_own_root() {
    let f = fixture(RendererConfig::DEFAULT);
    let root = f.root.clone();
    let mounted = Rc::new(Cell::new(0));
    let count = mounted.clone();
    let once = f
        .session
        .register_kind(
            "Once",
            CustomKind::new(|graph, _| Ok(graph.create_container())).with_hooks(
                LifecycleHooks::default().did_mount(move |_, _, _| {
                    count.set(count.get() + 1);
                    root.render(Element::Empty)?;
                    Ok(())
                }),
            ),
        )
        .unwrap();

    f.root.render(HostElement::new(&once, Props::new())).unwrap();
    assert_eq!(mounted.get(), 1);
    assert!(children(&f, f.container).is_empty());
}

#[test]
fn late_loads_update_nodes_in_place() {
    let f = fixture(RendererConfig::DEFAULT);
    let requests = Rc::new(Cell::new(0));
    let r = requests.clone();
    f.session
        .on_render_request(f.container, move |_| r.set(r.get() + 1));
    let failures = Rc::new(RefCell::new(Vec::new()));
    let record = failures.clone();
    f.session
        .set_load_error_handler(move |node, error: &LoadError| record.borrow_mut().push((node, error.reason.clone())));

    f.root
        .render(
            HostElement::new("Container", Props::new())
                .child(HostElement::new("Sprite", Props::new().with("image", "https://a.png")).key("a"))
                .child(HostElement::new("Sprite", Props::new().with("image", "https://b.png")).key("b")),
        )
        .unwrap();
    let parent = children(&f, f.container)[0];
    let sprites = children(&f, parent);
    let (ticket_a, ticket_b) = {
        let stage = f.session.stage();
        (
            stage.sources().pending(sprites[0]).unwrap(),
            stage.sources().pending(sprites[1]).unwrap(),
        )
    };
    let before = requests.get();

    f.session.complete_load(ticket_a, Ok(TextureId(7)));
    assert_eq!(f.session.stage().graph().texture(sprites[0]), Some(TextureId(7)));
    assert_eq!(requests.get(), before + 1);

    let error = LoadError {
        resource: sceneweave_fiber::props::Source::Url(String::from("https://b.png")),
        reason: String::from("404"),
    };
    f.session.complete_load(ticket_b, Err(error));
    assert_eq!(f.session.stage().graph().texture(sprites[1]), None);
    assert_eq!(*failures.borrow(), [(sprites[1], String::from("404"))]);
    assert_eq!(requests.get(), before + 1);
}
