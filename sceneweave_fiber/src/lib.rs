// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative rendering into a `sceneweave_core` scene graph.
//!
//! Application code describes what a container should hold as an
//! [`Element`] tree and renders it through a [`Root`]. The reconciler works
//! out the minimal set of host operations and the [`SceneHost`] performs them
//! on the scene graph.
//!
//! # Architecture
//!
//! ```text
//!   Root::render(element)
//!       │
//!       ▼
//!   RendererSession ── flush ──► Reconciler ──► HostConfig (SceneHost)
//!       │                                         │  factory, apply, registry
//!       │                                         ▼
//!       │◄──── render requests ──────────────  Stage (SceneGraph + side tables)
//!       ▼
//!   RenderLoop ──► evaluate() ──► Presenter
//! ```
//!
//! **[`element`]**: element trees: host elements, fragments, suspense
//! boundaries and [`LoadGate`]-gated content.
//!
//! **[`reconciler`]**: keyed child matching, render and commit phases.
//!
//! **[`host`]**: the [`HostConfig`] contract and [`SceneHost`], its
//! implementation over a [`Stage`].
//!
//! **[`props`]**, **[`diff`]**, **[`apply`]**: prop values, the prop diff
//! engine and the default prop applier.
//!
//! **[`kind`]**, **[`registry`]**, **[`factory`]**: built-in and custom
//! kinds and node construction.
//!
//! **[`root`]**: [`RendererSession`], [`Root`], batching, the render-request
//! bridge and [`RenderLoop`].
//!
//! **[`animated`]**: animated values written straight onto nodes.
//!
//! **[`trace`]**: typed operation events for debugging sinks.
//!
//! # Example
//!
//! ```rust,ignore
//! let session = RendererSession::default();
//! let stage = session.stage_mut().graph_mut().create_container();
//! let root = session.create_root(stage)?;
//! root.render(
//!     HostElement::new("Container", Props::new())
//!         .child(HostElement::new("Text", Props::new().with("text", "hello"))),
//! )?;
//! ```

pub mod animated;
pub mod apply;
pub mod config;
pub mod diff;
pub mod element;
pub mod error;
pub mod factory;
pub mod gate;
pub mod host;
pub mod instance;
pub mod kind;
pub mod props;
pub mod reconciler;
pub mod registry;
pub mod root;
pub mod source;
pub mod stage;
pub mod trace;

pub use config::{DestroyPolicy, RendererConfig};
pub use element::{Element, HostElement};
pub use error::{Error, HookError, HookKind, Result};
pub use gate::LoadGate;
pub use host::{HostConfig, SceneHost};
pub use kind::{BuiltinKind, ComponentRef, Kind, KindName};
pub use props::{PropValue, Props};
pub use registry::{CustomKind, KindRegistry, LifecycleHooks, MountTiming};
pub use root::{RenderLoop, RendererSession, Root};
pub use stage::Stage;
