// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of recorded host operations.
//!
//! [`export`] writes events captured by an
//! [`OpLog`](sceneweave_fiber::trace::OpLog) as a JSON array with one object
//! per operation. Node handles are written in their display form.

use std::io::{self, Write};

use serde_json::{Value, json};

use sceneweave_core::node::NodeId;
use sceneweave_fiber::trace::{CommitSummary, HostEvent};

/// Exports events as a JSON array.
pub fn export(events: &[HostEvent], writer: &mut dyn Write) -> io::Result<()> {
    let values: Vec<Value> = events.iter().map(event_value).collect();
    serde_json::to_writer_pretty(writer, &values)?;
    Ok(())
}

/// Exports commit summaries as a JSON array.
pub fn export_commits(commits: &[CommitSummary], writer: &mut dyn Write) -> io::Result<()> {
    let values: Vec<Value> = commits
        .iter()
        .map(|s| {
            json!({
                "op": "commit",
                "container": s.container.map(id),
                "deletions": s.deletions,
                "placements": s.placements,
                "updates": s.updates,
                "mounts": s.mounts,
                "render_requests": s.render_requests,
            })
        })
        .collect();
    serde_json::to_writer_pretty(writer, &values)?;
    Ok(())
}

fn id(node: NodeId) -> String {
    node.to_string()
}

fn event_value(event: &HostEvent) -> Value {
    let op = event.name();
    match event {
        HostEvent::CreateInstance { node, kind } => {
            json!({ "op": op, "node": id(*node), "kind": kind.name() })
        }
        HostEvent::AppendInitialChild { parent, child }
        | HostEvent::AppendChild { parent, child }
        | HostEvent::RemoveChild { parent, child } => {
            json!({ "op": op, "parent": id(*parent), "child": id(*child) })
        }
        HostEvent::AppendChildToContainer { container, child }
        | HostEvent::RemoveChildFromContainer { container, child } => {
            json!({ "op": op, "container": id(*container), "child": id(*child) })
        }
        HostEvent::InsertBefore {
            parent,
            child,
            before,
        } => json!({
            "op": op,
            "parent": id(*parent),
            "child": id(*child),
            "before": id(*before),
        }),
        HostEvent::InsertInContainerBefore {
            container,
            child,
            before,
        } => json!({
            "op": op,
            "container": id(*container),
            "child": id(*child),
            "before": id(*before),
        }),
        HostEvent::FinalizeInitialChildren { node, needs_mount } => {
            json!({ "op": op, "node": id(*node), "needs_mount": needs_mount })
        }
        HostEvent::PrepareUpdate { node, keys } | HostEvent::CommitUpdate { node, keys } => {
            json!({ "op": op, "node": id(*node), "keys": keys })
        }
        HostEvent::PrepareForCommit { container }
        | HostEvent::ResetAfterCommit { container }
        | HostEvent::RenderRequested { container } => {
            json!({ "op": op, "container": id(*container) })
        }
        HostEvent::CommitMount { node }
        | HostEvent::HideInstance { node }
        | HostEvent::UnhideInstance { node }
        | HostEvent::DiscardInstance { node } => json!({ "op": op, "node": id(*node) }),
        HostEvent::Hook { node, hook } => {
            json!({ "op": op, "node": id(*node), "hook": hook.name() })
        }
        HostEvent::Destroy { node, children } => {
            json!({ "op": op, "node": id(*node), "children": children })
        }
    }
}
