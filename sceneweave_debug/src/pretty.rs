// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr), plus one
//! summary line per commit.

use std::io::Write;

use sceneweave_fiber::trace::{CommitSummary, HostEvent, TraceSink};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    commits: u64,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("commits", &self.commits)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer, commits: 0 }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer, commits: 0 }
    }

    /// Consumes the sink and returns the destination.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_event(&mut self, event: &HostEvent) {
        let name = event.name();
        let _ = match event {
            HostEvent::CreateInstance { node, kind } => {
                writeln!(self.writer, "[{name}] {node} kind={kind}")
            }
            HostEvent::AppendInitialChild { parent, child }
            | HostEvent::AppendChild { parent, child }
            | HostEvent::RemoveChild { parent, child } => {
                writeln!(self.writer, "[{name}] {parent} <- {child}")
            }
            HostEvent::AppendChildToContainer { container, child }
            | HostEvent::RemoveChildFromContainer { container, child } => {
                writeln!(self.writer, "[{name}] root {container} <- {child}")
            }
            HostEvent::InsertBefore {
                parent,
                child,
                before,
            } => writeln!(self.writer, "[{name}] {parent} <- {child} before {before}"),
            HostEvent::InsertInContainerBefore {
                container,
                child,
                before,
            } => writeln!(
                self.writer,
                "[{name}] root {container} <- {child} before {before}"
            ),
            HostEvent::FinalizeInitialChildren { node, needs_mount } => {
                writeln!(self.writer, "[{name}] {node} mount={needs_mount}")
            }
            HostEvent::PrepareUpdate { node, keys } | HostEvent::CommitUpdate { node, keys } => {
                writeln!(self.writer, "[{name}] {node} keys={}", keys.join(","))
            }
            HostEvent::PrepareForCommit { container }
            | HostEvent::ResetAfterCommit { container }
            | HostEvent::RenderRequested { container } => {
                writeln!(self.writer, "[{name}] root {container}")
            }
            HostEvent::CommitMount { node }
            | HostEvent::HideInstance { node }
            | HostEvent::UnhideInstance { node }
            | HostEvent::DiscardInstance { node } => writeln!(self.writer, "[{name}] {node}"),
            HostEvent::Hook { node, hook } => writeln!(self.writer, "[{name}] {node} {hook}"),
            HostEvent::Destroy { node, children } => {
                writeln!(self.writer, "[{name}] {node} children={children}")
            }
        };
    }

    fn on_commit(&mut self, s: &CommitSummary) {
        self.commits += 1;
        let container = s
            .container
            .map_or_else(|| String::from("?"), |c| c.to_string());
        let _ = writeln!(
            self.writer,
            "[commit] #{} root {container} deletions={} placements={} updates={} \
             mounts={} requests={}",
            self.commits, s.deletions, s.placements, s.updates, s.mounts, s.render_requests,
        );
    }
}

#[cfg(test)]
mod tests {
    use sceneweave_core::node::SceneGraph;
    use sceneweave_fiber::{BuiltinKind, Kind};

    use super::*;

    #[test]
    fn pretty_print_create_and_commit() {
        let mut graph = SceneGraph::new();
        let node = graph.create_container();
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_event(&HostEvent::CreateInstance {
            node,
            kind: Kind::Builtin(BuiltinKind::Sprite),
        });
        sink.on_commit(&CommitSummary {
            container: Some(node),
            placements: 1,
            render_requests: 1,
            ..CommitSummary::default()
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("[createInstance]"), "got: {output}");
        assert!(output.contains("kind=Sprite"), "got: {output}");
        assert!(output.contains("[commit] #1"), "got: {output}");
        assert!(output.contains("placements=1"), "got: {output}");
    }
}
