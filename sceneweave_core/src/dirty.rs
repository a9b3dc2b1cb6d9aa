// Copyright 2026 the Sceneweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Each channel represents an independent category of change:
//!
//! - **Propagating**: [`TRANSFORM`] and [`APPEARANCE`] use
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and have dependency
//!   edges from child to parent, since world transforms, effective alpha and
//!   effective visibility are inherited.
//!
//! - **Local-only**: [`CONTENT`] covers textures, text, graphics commands
//!   and generic attributes. Only the explicitly marked node is drained.
//!
//! - **Structural**: [`TOPOLOGY`] is marked on create/destroy and on every
//!   child-list mutation. It triggers a traversal-order rebuild during
//!   evaluation.

use understory_dirty::Channel;

/// Position, scale, pivot, skew or rotation changed.
pub const TRANSFORM: Channel = Channel::new(0);

/// Alpha or visibility changed.
pub const APPEARANCE: Channel = Channel::new(1);

/// Content or a generic attribute changed.
pub const CONTENT: Channel = Channel::new(2);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(3);
