// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and JSON export for sceneweave host operation traces.
//!
//! This crate provides development tooling around the
//! [`TraceSink`](sceneweave_fiber::trace::TraceSink) of `sceneweave_fiber`:
//!
//! - [`pretty::PrettyPrintSink`]: one human-readable line per host operation.
//! - [`json::export`]: writes recorded events as a JSON array, for diffing
//!   operation logs between runs.

pub mod json;
pub mod pretty;
